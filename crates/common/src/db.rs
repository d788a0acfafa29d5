//! Storage error types shared by repository implementations
//!
//! Both the Postgres and the in-memory backends report failures through
//! [`RepositoryError`], which maps onto the HTTP-facing [`Error`].

use crate::error::Error;
use thiserror::Error;

/// Repository-level failures
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<RepositoryError> for Error {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Database(e) => Error::Database(e),
            RepositoryError::Unavailable(msg) => Error::Internal(msg),
        }
    }
}
