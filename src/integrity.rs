//! Referential and uniqueness rules guarding the recipe/ingredient relationship.

use std::collections::BTreeSet;

use diesel::dsl::{count_star, exists};
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel::sqlite::SqliteConnection;

use crate::schema::{ingredients, recipe_ingredients};

diesel::define_sql_function!(fn lower(x: Text) -> Text);

/// True when no ingredient other than `excluding` already carries `name`,
/// compared case-insensitively.
pub fn name_is_unique(
    conn: &mut SqliteConnection,
    name: &str,
    excluding: Option<i32>,
) -> QueryResult<bool> {
    let holders: Vec<i32> = ingredients::table
        .filter(lower(ingredients::name).eq(lower(name)))
        .select(ingredients::id)
        .load(conn)?;
    Ok(holders.iter().all(|&id| Some(id) == excluding))
}

/// True when every distinct id in `ids` resolves to a stored ingredient.
/// Repeating a valid id is fine; repeating an invalid one is still invalid.
pub fn ingredients_all_exist(conn: &mut SqliteConnection, ids: &[i32]) -> QueryResult<bool> {
    let requested: BTreeSet<i32> = ids.iter().copied().collect();
    if requested.is_empty() {
        return Ok(true);
    }
    let found: i64 = ingredients::table
        .filter(ingredients::id.eq_any(requested.iter().copied().collect::<Vec<_>>()))
        .select(count_star())
        .get_result(conn)?;
    Ok(found == requested.len() as i64)
}

/// True when no recipe references the ingredient.
pub fn can_delete(conn: &mut SqliteConnection, ingredient_id: i32) -> QueryResult<bool> {
    let referenced: bool = diesel::select(exists(
        recipe_ingredients::table.filter(recipe_ingredients::ingredient_id.eq(ingredient_id)),
    ))
    .get_result(conn)?;
    Ok(!referenced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_connection;
    use crate::models::NewRecipe;
    use crate::query;

    #[test]
    fn name_uniqueness_ignores_case() {
        let mut conn = test_connection();
        let egg = query::insert_ingredient(&mut conn, "Egg").unwrap();

        assert!(!name_is_unique(&mut conn, "egg", None).unwrap());
        assert!(!name_is_unique(&mut conn, "EGG", None).unwrap());
        assert!(name_is_unique(&mut conn, "Flour", None).unwrap());
        assert!(name_is_unique(&mut conn, "eGg", Some(egg)).unwrap());
    }

    #[test]
    fn excluding_one_record_still_sees_the_others() {
        let mut conn = test_connection();
        let honey = query::insert_ingredient(&mut conn, "Honey").unwrap();
        query::insert_ingredient(&mut conn, "Maple").unwrap();

        assert!(!name_is_unique(&mut conn, "maple", Some(honey)).unwrap());
    }

    #[test]
    fn existence_check_compares_distinct_ids() {
        let mut conn = test_connection();
        let egg = query::insert_ingredient(&mut conn, "Egg").unwrap();
        let flour = query::insert_ingredient(&mut conn, "Flour").unwrap();

        assert!(ingredients_all_exist(&mut conn, &[egg, flour]).unwrap());
        assert!(ingredients_all_exist(&mut conn, &[egg, egg]).unwrap());
        assert!(ingredients_all_exist(&mut conn, &[]).unwrap());
        assert!(!ingredients_all_exist(&mut conn, &[egg, 9999]).unwrap());
        assert!(!ingredients_all_exist(&mut conn, &[9999, 9999]).unwrap());
    }

    #[test]
    fn referenced_ingredients_cannot_be_deleted() {
        let mut conn = test_connection();
        let egg = query::insert_ingredient(&mut conn, "Egg").unwrap();
        let salt = query::insert_ingredient(&mut conn, "Salt").unwrap();
        let recipe = query::insert_recipe(&mut conn, &NewRecipe { title: "Omelette", servings: 1 }).unwrap();
        query::insert_recipe_ingredients(&mut conn, recipe, &[egg]).unwrap();

        assert!(!can_delete(&mut conn, egg).unwrap());
        assert!(can_delete(&mut conn, salt).unwrap());
    }
}
