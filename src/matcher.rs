//! Decides which recipes can be made from a set of ingredients on hand.

use std::collections::HashSet;

use crate::error::AppError;
use crate::models::RecipeWithIngredients;

/// Comparison form of an ingredient name. Never stored or displayed.
///
/// Folds full Unicode case. Name uniqueness in the store goes through
/// SQLite `lower()` and `NOCASE`, which fold ASCII only, so "Éclair" and
/// "éclair" match here but may both exist as ingredients.
pub fn canonical(name: &str) -> String {
    name.to_lowercase()
}

/// Ingredient names the caller has, in canonical form. Never empty.
#[derive(Debug, Clone)]
pub struct OwnedIngredients(HashSet<String>);

impl OwnedIngredients {
    pub fn new<I, S>(names: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let owned: HashSet<String> = names
            .into_iter()
            .map(|name| canonical(name.as_ref()))
            .collect();
        if owned.is_empty() {
            return Err(AppError::InvalidInput);
        }
        Ok(OwnedIngredients(owned))
    }

    /// Subset test: every ingredient of the recipe must be owned. A recipe
    /// without ingredients is always covered.
    pub fn covers(&self, recipe: &RecipeWithIngredients) -> bool {
        recipe
            .ingredients
            .iter()
            .all(|ingredient| self.0.contains(&canonical(&ingredient.name)))
    }
}

/// Keeps the recipes of `catalog` that `owned` fully covers, in catalog order.
pub fn find_available<I, S>(
    owned: I,
    catalog: Vec<RecipeWithIngredients>,
) -> Result<Vec<RecipeWithIngredients>, AppError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let owned = OwnedIngredients::new(owned)?;
    Ok(filter_catalog(&owned, catalog))
}

pub fn filter_catalog(
    owned: &OwnedIngredients,
    catalog: Vec<RecipeWithIngredients>,
) -> Vec<RecipeWithIngredients> {
    catalog
        .into_iter()
        .filter(|recipe| owned.covers(recipe))
        .collect()
}
