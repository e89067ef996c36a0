use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Failures of the storage collaborator itself, as opposed to domain outcomes.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database query failed: {0}")]
    Query(#[from] diesel::result::Error),
    #[error("could not check out a database connection: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("storage calls are suspended by the circuit breaker")]
    Rejected,
    #[error("blocking task failed: {0}")]
    Blocking(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("One or more ingredients do not exist")]
    InvalidReference,
    #[error("No ingredients provided")]
    InvalidInput,
    #[error("{0}")]
    Unavailable(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AppError {
    pub fn ingredient_not_found(id: i32) -> Self {
        AppError::NotFound(format!("Ingredient with ID {id} not found"))
    }

    pub fn recipe_not_found(id: i32) -> Self {
        AppError::NotFound(format!("Recipe with ID {id} not found"))
    }

    pub fn duplicate_ingredient(name: &str) -> Self {
        AppError::Conflict(format!("Ingredient with name '{name}' already exists"))
    }

    pub fn ingredient_in_use(name: &str) -> Self {
        AppError::Conflict(format!(
            "Cannot delete ingredient '{name}' as it is used in one or more recipes"
        ))
    }

    pub fn is_storage_failure(&self) -> bool {
        matches!(self, AppError::Storage(_))
    }

    /// Translates a storage failure into the caller-facing `Unavailable`
    /// error for `action`, logging the underlying cause. Domain errors pass
    /// through unchanged.
    pub fn during(self, action: &str, id: Option<i32>) -> Self {
        match self {
            AppError::Storage(source) => {
                match id {
                    Some(id) => log::error!("error {action} (id {id}): {source}"),
                    None => log::error!("error {action}: {source}"),
                }
                AppError::Unavailable(format!("An error occurred while {action}"))
            }
            other => other,
        }
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(err: diesel::result::Error) -> Self {
        AppError::Storage(StorageError::Query(err))
    }
}

impl From<diesel::r2d2::PoolError> for AppError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        AppError::Storage(StorageError::Pool(err))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_)
            | AppError::Conflict(_)
            | AppError::InvalidReference
            | AppError::InvalidInput => StatusCode::BAD_REQUEST,
            AppError::Unavailable(_) | AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // untranslated storage errors still must not leak their detail
        let message = match self {
            AppError::Storage(_) => "An unexpected error occurred".to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code())
            .content_type(ContentType::plaintext())
            .body(message)
    }
}
