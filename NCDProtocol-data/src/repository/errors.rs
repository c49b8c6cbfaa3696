use std::sync::PoisonError;
use thiserror::Error;

/// Error type for repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found error
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Version conflict on update. Two writers raced on the same protocol;
    /// the caller must reload and retry.
    #[error("Version conflict: {0}")]
    Conflict(String),

    /// Lock error
    #[error("Lock error: {0}")]
    Lock(String),

    /// Date parsing error
    #[error("Date parsing error: {0}")]
    DateParse(String),
}

impl<T> From<PoisonError<T>> for RepositoryError {
    fn from(error: PoisonError<T>) -> Self {
        RepositoryError::Lock(error.to_string())
    }
}
