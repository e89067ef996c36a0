//! Shared helpers for the HTTP integration tests.
#![allow(dead_code)]

use recipe_finder::db::{self, Storage};
use tempfile::TempDir;

/// Storage over a fresh database file.
///
/// Keep the TempDir alive for the duration of the test.
pub fn empty_storage() -> (TempDir, Storage) {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("catalog.db");
    let storage = Storage::connect(db_path.to_str().unwrap(), 2).unwrap();
    (temp_dir, storage)
}

/// Storage holding the demo catalog: Egg (1), Flour (2), Milk (3) and
/// Pancakes (1) needing all three.
pub fn seeded_storage() -> (TempDir, Storage) {
    let (temp_dir, storage) = empty_storage();
    let mut conn = storage.connection().unwrap();
    assert!(db::seed_demo_data(&mut conn).unwrap());
    (temp_dir, storage)
}

/// Breaks the schema underneath the service so every catalog read fails.
pub fn drop_tables(storage: &Storage) {
    use diesel::connection::SimpleConnection;

    let mut conn = storage.connection().unwrap();
    conn.batch_execute(
        "PRAGMA foreign_keys = OFF;
         DROP TABLE recipe_ingredients;
         DROP TABLE recipes;
         DROP TABLE ingredients;",
    )
    .unwrap();
}
