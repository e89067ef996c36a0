use actix_web::http::header;
use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::catalog;
use crate::db::Storage;
use crate::dto::IngredientDto;
use crate::error::AppError;

#[get("/ingredients")]
pub async fn get_all_ingredients(storage: web::Data<Storage>) -> Result<HttpResponse, AppError> {
    let ingredients = storage
        .run(catalog::list_ingredients)
        .await
        .map_err(|err| err.during("retrieving ingredients", None))?;
    let ingredients: Vec<IngredientDto> = ingredients.into_iter().map(IngredientDto::from).collect();
    Ok(HttpResponse::Ok().json(ingredients))
}

#[get("/ingredients/{id}")]
pub async fn get_ingredient(
    id: web::Path<i32>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let ingredient = storage
        .run(move |conn| catalog::get_ingredient(conn, id))
        .await
        .map_err(|err| err.during("retrieving the ingredient", Some(id)))?;
    Ok(HttpResponse::Ok().json(IngredientDto::from(ingredient)))
}

#[post("/ingredients")]
pub async fn create_ingredient(
    body: web::Json<IngredientDto>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let input = body.into_inner();
    input.validate()?;

    let name = input.name.clone();
    let id = storage
        .run(move |conn| catalog::create_ingredient(conn, &name))
        .await
        .map_err(|err| err.during("creating the ingredient", None))?;
    log::debug!("created ingredient {id} ({})", input.name);

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/ingredients/{id}")))
        .json(input))
}

#[put("/ingredients/{id}")]
pub async fn update_ingredient(
    id: web::Path<i32>,
    body: web::Json<IngredientDto>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let input = body.into_inner();
    input.validate()?;

    let ingredient = storage
        .run(move |conn| catalog::rename_ingredient(conn, id, &input.name))
        .await
        .map_err(|err| err.during("updating the ingredient", Some(id)))?;
    Ok(HttpResponse::Ok().json(IngredientDto::from(ingredient)))
}

#[delete("/ingredients/{id}")]
pub async fn delete_ingredient(
    id: web::Path<i32>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    storage
        .run(move |conn| catalog::delete_ingredient(conn, id))
        .await
        .map_err(|err| err.during("deleting the ingredient", Some(id)))?;
    log::debug!("deleted ingredient {id}");
    Ok(HttpResponse::NoContent().finish())
}
