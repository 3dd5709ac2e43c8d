//! Repository Module
//!
//! Free-function CRUD over the SQLite pool. Functions that must run
//! inside a caller-owned transaction take `&mut SqliteConnection`.

pub mod counter;
pub mod customer;
pub mod invoice;
pub mod order;
pub mod product;
pub mod stage;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound(err.to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Duplicate(err.to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for shared::error::ApiError {
    fn from(err: RepoError) -> Self {
        use shared::error::ApiError;
        match err {
            RepoError::NotFound(msg) => ApiError::not_found(msg),
            RepoError::Duplicate(msg) => ApiError::conflict(msg),
            RepoError::Validation(msg) => ApiError::validation(msg),
            RepoError::Database(msg) => ApiError::database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
