use actix_web::web;

use crate::error::AppError;

pub mod ingredients;
pub mod recipes;

/// Registers every catalog route together with the extractor settings they
/// rely on.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .service(ingredients::get_all_ingredients)
    .service(ingredients::get_ingredient)
    .service(ingredients::create_ingredient)
    .service(ingredients::update_ingredient)
    .service(ingredients::delete_ingredient)
    // must precede /recipes/{id}
    .service(recipes::get_available_recipes)
    .service(recipes::get_all_recipes)
    .service(recipes::get_recipe)
    .service(recipes::create_recipe)
    .service(recipes::update_recipe)
    .service(recipes::delete_recipe);
}
