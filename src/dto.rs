//! Wire records and the structural checks applied to them before any
//! storage access.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{Ingredient, RecipeWithIngredients};

pub const MAX_INGREDIENT_NAME_CHARS: usize = 100;
pub const MAX_TITLE_CHARS: usize = 200;
pub const MIN_SERVINGS: i32 = 1;
pub const MAX_SERVINGS: i32 = 50;

/// An ingredient as seen by clients: referenced by name, never by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientDto {
    pub name: String,
}

impl IngredientDto {
    pub fn validate(&self) -> Result<(), AppError> {
        check_text("name", &self.name, MAX_INGREDIENT_NAME_CHARS)
    }
}

impl From<Ingredient> for IngredientDto {
    fn from(ingredient: Ingredient) -> Self {
        IngredientDto {
            name: ingredient.name,
        }
    }
}

/// Body of recipe create and update requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDto {
    pub title: String,
    pub servings: i32,
    pub ingredient_ids: Vec<i32>,
}

impl RecipeDto {
    pub fn validate(&self) -> Result<(), AppError> {
        check_text("title", &self.title, MAX_TITLE_CHARS)?;
        if !(MIN_SERVINGS..=MAX_SERVINGS).contains(&self.servings) {
            return Err(AppError::Validation(format!(
                "servings must be between {MIN_SERVINGS} and {MAX_SERVINGS}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetailDto {
    pub id: i32,
    pub title: String,
    pub servings: i32,
    pub ingredients: Vec<IngredientDto>,
}

impl From<RecipeWithIngredients> for RecipeDetailDto {
    fn from(loaded: RecipeWithIngredients) -> Self {
        RecipeDetailDto {
            id: loaded.recipe.id,
            title: loaded.recipe.title,
            servings: loaded.recipe.servings,
            ingredients: loaded.ingredients.into_iter().map(IngredientDto::from).collect(),
        }
    }
}

fn check_text(field: &str, value: &str, max_chars: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    if value.chars().count() > max_chars {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(())
}
