//! Errors surfaced by the persistence layer.

use thiserror::Error;

use crate::persistent::errors::StorageError;

/// Top-level database error.
#[derive(Debug, Error)]
pub enum DbError {
    /// The on-disk store failed.
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
}

/// Result alias for database operations.
pub type DbResult<T> = Result<T, DbError>;
