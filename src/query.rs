use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::Integer;
use diesel::sqlite::SqliteConnection;

use crate::models::{
    Ingredient, NewIngredient, NewRecipe, Recipe, RecipeIngredient, RecipeWithIngredients,
};
use crate::schema::{ingredients, recipe_ingredients, recipes};

pub(crate) fn find_all_ingredients(conn: &mut SqliteConnection) -> QueryResult<Vec<Ingredient>> {
    ingredients::table
        .order(ingredients::id)
        .select(Ingredient::as_select())
        .load(conn)
}

pub(crate) fn find_ingredient(
    conn: &mut SqliteConnection,
    ingredient_id: i32,
) -> QueryResult<Option<Ingredient>> {
    ingredients::table
        .find(ingredient_id)
        .select(Ingredient::as_select())
        .first(conn)
        .optional()
}

pub(crate) fn insert_ingredient(conn: &mut SqliteConnection, name: &str) -> QueryResult<i32> {
    diesel::insert_into(ingredients::table)
        .values(&NewIngredient { name })
        .returning(ingredients::id)
        .get_result(conn)
}

pub(crate) fn rename_ingredient(
    conn: &mut SqliteConnection,
    ingredient_id: i32,
    name: &str,
) -> QueryResult<usize> {
    diesel::update(ingredients::table.find(ingredient_id))
        .set(&NewIngredient { name })
        .execute(conn)
}

pub(crate) fn delete_ingredient(conn: &mut SqliteConnection, ingredient_id: i32) -> QueryResult<usize> {
    diesel::delete(ingredients::table.find(ingredient_id)).execute(conn)
}

/// Loads every recipe in id order with its ingredients attached.
/// Two statements in total, independent of catalog size.
pub(crate) fn find_all_recipes(conn: &mut SqliteConnection) -> QueryResult<Vec<RecipeWithIngredients>> {
    let all_recipes = recipes::table
        .order(recipes::id)
        .select(Recipe::as_select())
        .load(conn)?;
    attach_ingredients(conn, all_recipes)
}

pub(crate) fn find_recipe(
    conn: &mut SqliteConnection,
    recipe_id: i32,
) -> QueryResult<Option<RecipeWithIngredients>> {
    let recipe = recipes::table
        .find(recipe_id)
        .select(Recipe::as_select())
        .first(conn)
        .optional()?;
    match recipe {
        Some(recipe) => Ok(attach_ingredients(conn, vec![recipe])?.pop()),
        None => Ok(None),
    }
}

fn attach_ingredients(
    conn: &mut SqliteConnection,
    all_recipes: Vec<Recipe>,
) -> QueryResult<Vec<RecipeWithIngredients>> {
    let links: Vec<(RecipeIngredient, Ingredient)> = RecipeIngredient::belonging_to(&all_recipes)
        .inner_join(ingredients::table)
        .select((RecipeIngredient::as_select(), Ingredient::as_select()))
        // rowid keeps each recipe's ingredients in the order they were linked
        .order(sql::<Integer>("recipe_ingredients.rowid"))
        .load(conn)?;

    Ok(links
        .grouped_by(&all_recipes)
        .into_iter()
        .zip(all_recipes)
        .map(|(links, recipe)| RecipeWithIngredients {
            recipe,
            ingredients: links.into_iter().map(|(_, ingredient)| ingredient).collect(),
        })
        .collect())
}

pub(crate) fn recipe_exists(conn: &mut SqliteConnection, recipe_id: i32) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(recipes::table.find(recipe_id))).get_result(conn)
}

pub(crate) fn insert_recipe(conn: &mut SqliteConnection, recipe: &NewRecipe<'_>) -> QueryResult<i32> {
    diesel::insert_into(recipes::table)
        .values(recipe)
        .returning(recipes::id)
        .get_result(conn)
}

pub(crate) fn overwrite_recipe(
    conn: &mut SqliteConnection,
    recipe_id: i32,
    recipe: &NewRecipe<'_>,
) -> QueryResult<usize> {
    diesel::update(recipes::table.find(recipe_id))
        .set(recipe)
        .execute(conn)
}

pub(crate) fn delete_recipe(conn: &mut SqliteConnection, recipe_id: i32) -> QueryResult<usize> {
    clear_recipe_ingredients(conn, recipe_id)?;
    diesel::delete(recipes::table.find(recipe_id)).execute(conn)
}

pub(crate) fn clear_recipe_ingredients(conn: &mut SqliteConnection, recipe_id: i32) -> QueryResult<usize> {
    diesel::delete(recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)))
        .execute(conn)
}

/// Links `ingredient_ids` to the recipe. Repeated ids collapse into one row.
pub(crate) fn insert_recipe_ingredients(
    conn: &mut SqliteConnection,
    recipe_id: i32,
    ingredient_ids: &[i32],
) -> QueryResult<usize> {
    let mut rows: Vec<RecipeIngredient> = Vec::with_capacity(ingredient_ids.len());
    for &ingredient_id in ingredient_ids {
        if !rows.iter().any(|row| row.ingredient_id == ingredient_id) {
            rows.push(RecipeIngredient {
                recipe_id,
                ingredient_id,
            });
        }
    }
    if rows.is_empty() {
        return Ok(0);
    }
    diesel::insert_into(recipe_ingredients::table)
        .values(&rows)
        .execute(conn)
}
