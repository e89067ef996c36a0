//! Catalog operations: each one is a read-then-decide-then-write unit of
//! work over a single connection, with integrity rules applied before any
//! mutation.
//!
//! Writes take SQLite's write lock up front (`BEGIN IMMEDIATE`). A deferred
//! transaction that reads and then tries to upgrade fails with "database is
//! locked" when another writer is active, without waiting on the busy timeout.

use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::SqliteConnection;

use crate::dto::RecipeDto;
use crate::error::AppError;
use crate::integrity;
use crate::models::{Ingredient, NewRecipe, RecipeWithIngredients};
use crate::query;

pub fn list_ingredients(conn: &mut SqliteConnection) -> Result<Vec<Ingredient>, AppError> {
    Ok(query::find_all_ingredients(conn)?)
}

pub fn get_ingredient(conn: &mut SqliteConnection, id: i32) -> Result<Ingredient, AppError> {
    query::find_ingredient(conn, id)?.ok_or_else(|| AppError::ingredient_not_found(id))
}

/// Returns the id of the new ingredient.
pub fn create_ingredient(conn: &mut SqliteConnection, name: &str) -> Result<i32, AppError> {
    conn.immediate_transaction(|conn| {
        if !integrity::name_is_unique(conn, name, None)? {
            return Err(AppError::duplicate_ingredient(name));
        }
        query::insert_ingredient(conn, name).map_err(|err| unique_backstop(err, name))
    })
}

pub fn rename_ingredient(
    conn: &mut SqliteConnection,
    id: i32,
    name: &str,
) -> Result<Ingredient, AppError> {
    conn.immediate_transaction(|conn| {
        if query::find_ingredient(conn, id)?.is_none() {
            return Err(AppError::ingredient_not_found(id));
        }
        if !integrity::name_is_unique(conn, name, Some(id))? {
            return Err(AppError::duplicate_ingredient(name));
        }
        query::rename_ingredient(conn, id, name).map_err(|err| unique_backstop(err, name))?;
        Ok(Ingredient {
            id,
            name: name.to_string(),
        })
    })
}

pub fn delete_ingredient(conn: &mut SqliteConnection, id: i32) -> Result<(), AppError> {
    conn.immediate_transaction(|conn| {
        let ingredient = query::find_ingredient(conn, id)?
            .ok_or_else(|| AppError::ingredient_not_found(id))?;
        if !integrity::can_delete(conn, id)? {
            return Err(AppError::ingredient_in_use(&ingredient.name));
        }
        query::delete_ingredient(conn, id).map_err(|err| match err {
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                AppError::ingredient_in_use(&ingredient.name)
            }
            other => other.into(),
        })?;
        Ok(())
    })
}

pub fn list_recipes(conn: &mut SqliteConnection) -> Result<Vec<RecipeWithIngredients>, AppError> {
    Ok(query::find_all_recipes(conn)?)
}

pub fn get_recipe(conn: &mut SqliteConnection, id: i32) -> Result<RecipeWithIngredients, AppError> {
    query::find_recipe(conn, id)?.ok_or_else(|| AppError::recipe_not_found(id))
}

pub fn create_recipe(
    conn: &mut SqliteConnection,
    input: &RecipeDto,
) -> Result<RecipeWithIngredients, AppError> {
    conn.immediate_transaction(|conn| {
        if !integrity::ingredients_all_exist(conn, &input.ingredient_ids)? {
            return Err(AppError::InvalidReference);
        }
        let id = query::insert_recipe(conn, &new_recipe(input))?;
        query::insert_recipe_ingredients(conn, id, &input.ingredient_ids)
            .map_err(reference_backstop)?;
        get_recipe(conn, id)
    })
}

/// Overwrites title and servings and replaces the whole ingredient set.
pub fn update_recipe(
    conn: &mut SqliteConnection,
    id: i32,
    input: &RecipeDto,
) -> Result<RecipeWithIngredients, AppError> {
    conn.immediate_transaction(|conn| {
        if !query::recipe_exists(conn, id)? {
            return Err(AppError::recipe_not_found(id));
        }
        if !integrity::ingredients_all_exist(conn, &input.ingredient_ids)? {
            return Err(AppError::InvalidReference);
        }
        query::overwrite_recipe(conn, id, &new_recipe(input))?;
        query::clear_recipe_ingredients(conn, id)?;
        query::insert_recipe_ingredients(conn, id, &input.ingredient_ids)
            .map_err(reference_backstop)?;
        get_recipe(conn, id)
    })
}

pub fn delete_recipe(conn: &mut SqliteConnection, id: i32) -> Result<(), AppError> {
    conn.immediate_transaction(|conn| match query::delete_recipe(conn, id)? {
        0 => Err(AppError::recipe_not_found(id)),
        _ => Ok(()),
    })
}

fn new_recipe(input: &RecipeDto) -> NewRecipe<'_> {
    NewRecipe {
        title: &input.title,
        servings: input.servings,
    }
}

// the store's unique index closes the gap between check and insert
fn unique_backstop(err: DieselError, name: &str) -> AppError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            AppError::duplicate_ingredient(name)
        }
        other => other.into(),
    }
}

fn reference_backstop(err: DieselError) -> AppError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            AppError::InvalidReference
        }
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{seed_demo_data, test_connection};
    use crate::schema::{recipe_ingredients, recipes};

    fn recipe_input(title: &str, ingredient_ids: &[i32]) -> RecipeDto {
        RecipeDto {
            title: title.to_string(),
            servings: 2,
            ingredient_ids: ingredient_ids.to_vec(),
        }
    }

    fn count_rows(conn: &mut SqliteConnection) -> (i64, i64) {
        let recipes: i64 = recipes::table.count().get_result(conn).unwrap();
        let links: i64 = recipe_ingredients::table.count().get_result(conn).unwrap();
        (recipes, links)
    }

    #[test]
    fn duplicate_names_conflict_regardless_of_case() {
        let mut conn = test_connection();
        create_ingredient(&mut conn, "Egg").unwrap();

        let err = create_ingredient(&mut conn, "egg").unwrap_err();
        assert_eq!(err.to_string(), "Ingredient with name 'egg' already exists");
    }

    #[test]
    fn renaming_to_own_name_in_any_case_succeeds() {
        let mut conn = test_connection();
        let id = create_ingredient(&mut conn, "Egg").unwrap();

        assert_eq!(rename_ingredient(&mut conn, id, "Egg").unwrap().name, "Egg");
        assert_eq!(rename_ingredient(&mut conn, id, "EGG").unwrap().name, "EGG");
        assert_eq!(get_ingredient(&mut conn, id).unwrap().name, "EGG");
    }

    #[test]
    fn renaming_onto_another_ingredient_conflicts() {
        let mut conn = test_connection();
        let honey = create_ingredient(&mut conn, "Honey").unwrap();
        create_ingredient(&mut conn, "Maple").unwrap();

        let err = rename_ingredient(&mut conn, honey, "Maple").unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(get_ingredient(&mut conn, honey).unwrap().name, "Honey");
    }

    #[test]
    fn renaming_missing_ingredient_is_not_found() {
        let mut conn = test_connection();
        let err = rename_ingredient(&mut conn, 99, "Oil").unwrap_err();
        assert_eq!(err.to_string(), "Ingredient with ID 99 not found");
    }

    #[test]
    fn ingredient_in_use_cannot_be_deleted() {
        let mut conn = test_connection();
        seed_demo_data(&mut conn).unwrap();

        let err = delete_ingredient(&mut conn, 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot delete ingredient 'Egg' as it is used in one or more recipes"
        );
        assert!(get_ingredient(&mut conn, 1).is_ok());
    }

    #[test]
    fn unused_ingredient_is_deleted() {
        let mut conn = test_connection();
        let id = create_ingredient(&mut conn, "Cinnamon").unwrap();

        delete_ingredient(&mut conn, id).unwrap();
        assert!(matches!(get_ingredient(&mut conn, id), Err(AppError::NotFound(_))));
        assert!(matches!(delete_ingredient(&mut conn, id), Err(AppError::NotFound(_))));
    }

    #[test]
    fn unknown_ingredient_reference_creates_nothing() {
        let mut conn = test_connection();
        let egg = create_ingredient(&mut conn, "Egg").unwrap();

        let err = create_recipe(&mut conn, &recipe_input("Mystery", &[egg, 9999])).unwrap_err();
        assert!(matches!(err, AppError::InvalidReference));
        assert_eq!(count_rows(&mut conn), (0, 0));
    }

    #[test]
    fn created_recipe_is_returned_with_ingredients() {
        let mut conn = test_connection();
        let egg = create_ingredient(&mut conn, "Egg").unwrap();
        let milk = create_ingredient(&mut conn, "Milk").unwrap();

        let created = create_recipe(&mut conn, &recipe_input("Custard", &[egg, milk, egg])).unwrap();
        assert_eq!(created.recipe.title, "Custard");
        assert_eq!(created.ingredients.len(), 2);
        assert_eq!(get_recipe(&mut conn, created.recipe.id).unwrap(), created);
    }

    #[test]
    fn update_replaces_the_ingredient_set() {
        let mut conn = test_connection();
        let egg = create_ingredient(&mut conn, "Egg").unwrap();
        let flour = create_ingredient(&mut conn, "Flour").unwrap();
        let created = create_recipe(&mut conn, &recipe_input("Bread", &[egg, flour])).unwrap();

        let mut input = recipe_input("Flatbread", &[flour]);
        input.servings = 6;
        let updated = update_recipe(&mut conn, created.recipe.id, &input).unwrap();

        assert_eq!(updated.recipe.title, "Flatbread");
        assert_eq!(updated.recipe.servings, 6);
        let names: Vec<&str> = updated.ingredients.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Flour"]);
        assert_eq!(count_rows(&mut conn), (1, 1));
    }

    #[test]
    fn failed_update_leaves_recipe_untouched() {
        let mut conn = test_connection();
        let egg = create_ingredient(&mut conn, "Egg").unwrap();
        let created = create_recipe(&mut conn, &recipe_input("Omelette", &[egg])).unwrap();

        let err = update_recipe(&mut conn, created.recipe.id, &recipe_input("Other", &[9999]))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidReference));
        assert_eq!(get_recipe(&mut conn, created.recipe.id).unwrap(), created);

        let err = update_recipe(&mut conn, 404, &recipe_input("Other", &[egg])).unwrap_err();
        assert_eq!(err.to_string(), "Recipe with ID 404 not found");
    }

    #[test]
    fn deleting_recipe_releases_its_ingredients() {
        let mut conn = test_connection();
        seed_demo_data(&mut conn).unwrap();

        delete_recipe(&mut conn, 1).unwrap();
        assert_eq!(count_rows(&mut conn), (0, 0));
        delete_ingredient(&mut conn, 1).unwrap();
        assert!(matches!(delete_recipe(&mut conn, 1), Err(AppError::NotFound(_))));
    }
}
