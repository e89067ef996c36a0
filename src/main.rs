use std::io;

use actix_web::{middleware, web, App, HttpServer};

use recipe_finder::config::Config;
use recipe_finder::cors;
use recipe_finder::db::{self, Storage};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(io::Error::other)?;

    // set up database connection pool and schema
    let storage = Storage::connect(&config.database_url, config.pool_size).map_err(io::Error::other)?;

    if config.seed_demo_data {
        let mut conn = storage.connection().map_err(io::Error::other)?;
        if db::seed_demo_data(&mut conn).map_err(io::Error::other)? {
            log::info!("seeded demo catalog");
        }
    }

    log::info!(
        "starting HTTP server at http://{}:{}",
        config.bind_address,
        config.port
    );

    if config.allowed_origins.is_empty() {
        log::info!("CORS allows any origin");
    }
    let allowed_origins = config.allowed_origins.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(storage.clone()))
            .wrap(cors::cors(&allowed_origins))
            .wrap(middleware::Logger::default())
            .configure(recipe_finder::configure)
    })
    .bind((config.bind_address.as_str(), config.port))?
    .run()
    .await
}
