use actix_web::http::header;
use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::catalog;
use crate::db::Storage;
use crate::dto::{RecipeDetailDto, RecipeDto};
use crate::error::AppError;
use crate::matcher::{self, OwnedIngredients};

const INGREDIENTS_PARAM: &str = "ingredients";

#[get("/recipes")]
pub async fn get_all_recipes(storage: web::Data<Storage>) -> Result<HttpResponse, AppError> {
    let recipes = storage
        .run(catalog::list_recipes)
        .await
        .map_err(|err| err.during("retrieving recipes", None))?;
    let recipes: Vec<RecipeDetailDto> = recipes.into_iter().map(RecipeDetailDto::from).collect();
    Ok(HttpResponse::Ok().json(recipes))
}

#[get("/recipes/{id}")]
pub async fn get_recipe(
    id: web::Path<i32>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let recipe = storage
        .run(move |conn| catalog::get_recipe(conn, id))
        .await
        .map_err(|err| err.during("retrieving the recipe", Some(id)))?;
    Ok(HttpResponse::Ok().json(RecipeDetailDto::from(recipe)))
}

#[post("/recipes")]
pub async fn create_recipe(
    body: web::Json<RecipeDto>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let input = body.into_inner();
    input.validate()?;

    let recipe = storage
        .run(move |conn| catalog::create_recipe(conn, &input))
        .await
        .map_err(|err| err.during("creating the recipe", None))?;
    log::debug!(
        "created recipe {} with {} ingredients",
        recipe.recipe.id,
        recipe.ingredients.len()
    );

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/recipes/{}", recipe.recipe.id)))
        .json(RecipeDetailDto::from(recipe)))
}

#[put("/recipes/{id}")]
pub async fn update_recipe(
    id: web::Path<i32>,
    body: web::Json<RecipeDto>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let input = body.into_inner();
    input.validate()?;

    let recipe = storage
        .run(move |conn| catalog::update_recipe(conn, id, &input))
        .await
        .map_err(|err| err.during("updating the recipe", Some(id)))?;
    Ok(HttpResponse::Ok().json(RecipeDetailDto::from(recipe)))
}

#[delete("/recipes/{id}")]
pub async fn delete_recipe(
    id: web::Path<i32>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    storage
        .run(move |conn| catalog::delete_recipe(conn, id))
        .await
        .map_err(|err| err.during("deleting the recipe", Some(id)))?;
    log::debug!("deleted recipe {id}");
    Ok(HttpResponse::NoContent().finish())
}

/// `GET /recipes/available?ingredients=egg&ingredients=milk`
#[get("/recipes/available")]
pub async fn get_available_recipes(
    params: web::Query<Vec<(String, String)>>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    // rejected before the catalog is loaded. Blank values are dropped, so a
    // bare `?ingredients=` counts as no ingredients at all.
    let owned = OwnedIngredients::new(
        params
            .into_inner()
            .into_iter()
            .filter(|(key, value)| key == INGREDIENTS_PARAM && !value.trim().is_empty())
            .map(|(_, value)| value),
    )?;

    let catalog = storage
        .run(catalog::list_recipes)
        .await
        .map_err(|err| err.during("getting available recipes", None))?;
    let makeable: Vec<RecipeDetailDto> = matcher::filter_catalog(&owned, catalog)
        .into_iter()
        .map(RecipeDetailDto::from)
        .collect();
    Ok(HttpResponse::Ok().json(makeable))
}
