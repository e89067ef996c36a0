use actix_web::web;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection, PooledConnection};
use diesel::sqlite::SqliteConnection;
use failsafe::backoff::EqualJittered;
use failsafe::failure_policy::{ConsecutiveFailures, OrElse, SuccessRateOverTimeWindow};
use failsafe::{CircuitBreaker, StateMachine};

use crate::error::{AppError, StorageError};
use crate::models::NewRecipe;
use crate::query;
use crate::schema::{self, ingredients};

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

type CircuitBreakerType = StateMachine<
    OrElse<SuccessRateOverTimeWindow<EqualJittered>, ConsecutiveFailures<EqualJittered>>,
    (),
>;

const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;";

const DEMO_INGREDIENTS: [&str; 3] = ["Egg", "Flour", "Milk"];

#[derive(Debug)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute(CONNECTION_PRAGMAS)
            .map_err(r2d2::Error::QueryError)
    }
}

pub fn build_pool(database_url: &str, max_size: u32) -> Result<DbPool, StorageError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Ok(r2d2::Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)?)
}

/// Creates any missing tables.
pub fn initialize(conn: &mut SqliteConnection) -> QueryResult<()> {
    conn.batch_execute(schema::CREATE_TABLES)
}

/// Loads the demo catalog (Egg, Flour, Milk and a Pancakes recipe using all
/// three) into an empty database. Returns whether anything was inserted.
pub fn seed_demo_data(conn: &mut SqliteConnection) -> QueryResult<bool> {
    conn.immediate_transaction::<_, diesel::result::Error, _>(|conn| {
        let existing: i64 = ingredients::table.count().get_result(conn)?;
        if existing > 0 {
            return Ok(false);
        }
        let ingredient_ids = DEMO_INGREDIENTS
            .iter()
            .map(|name| query::insert_ingredient(conn, name))
            .collect::<QueryResult<Vec<i32>>>()?;
        let pancakes = query::insert_recipe(
            conn,
            &NewRecipe {
                title: "Pancakes",
                servings: 4,
            },
        )?;
        query::insert_recipe_ingredients(conn, pancakes, &ingredient_ids)?;
        Ok(true)
    })
}

/// Handle to the catalog store. Every unit of work runs on the blocking
/// pool behind a circuit breaker that trips on storage failures only.
#[derive(Clone)]
pub struct Storage {
    pool: DbPool,
    circuit_breaker: CircuitBreakerType,
}

impl Storage {
    pub fn new(pool: DbPool) -> Self {
        Storage {
            pool,
            circuit_breaker: failsafe::Config::new().build(),
        }
    }

    /// Opens the pool and makes sure the schema exists.
    pub fn connect(database_url: &str, pool_size: u32) -> Result<Self, StorageError> {
        let pool = build_pool(database_url, pool_size)?;
        let mut conn = pool.get()?;
        initialize(&mut conn)?;
        log::info!("catalog database ready at {database_url}");
        Ok(Storage::new(pool))
    }

    pub fn connection(&self) -> Result<DbConnection, StorageError> {
        Ok(self.pool.get()?)
    }

    pub async fn run<F, T>(&self, work: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        let circuit_breaker = self.circuit_breaker.clone();
        web::block(move || {
            circuit_breaker
                .call_with(AppError::is_storage_failure, || {
                    let mut conn = pool.get()?;
                    work(&mut conn)
                })
                .map_err(|err| match err {
                    failsafe::Error::Inner(err) => err,
                    failsafe::Error::Rejected => {
                        log::warn!("storage call rejected, circuit breaker is open");
                        AppError::Storage(StorageError::Rejected)
                    }
                })
        })
        .await
        .map_err(|err| AppError::Storage(StorageError::Blocking(err.to_string())))?
    }
}

#[cfg(test)]
pub(crate) fn test_connection() -> SqliteConnection {
    let mut conn = SqliteConnection::establish(":memory:").unwrap();
    conn.batch_execute(CONNECTION_PRAGMAS).unwrap();
    initialize(&mut conn).unwrap();
    conn
}
