//! Errors of the gap-limit maintainer.

use satsentry_db::errors::DbError;
use satsentry_key_deriv::{DerivationError, KeyError};
use satsentry_primitives::{PathId, StateError};
use thiserror::Error;

/// Everything that can abort a maintenance operation.
///
/// Activity lookups are absent on purpose: their failures are absorbed and logged.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The extended key could not be parsed.
    #[error("key: {0}")]
    Key(#[from] KeyError),

    /// Address derivation failed.
    #[error("derivation: {0}")]
    Derivation(#[from] DerivationError),

    /// A state mutation was rejected.
    #[error("state: {0}")]
    State(#[from] StateError),

    /// Persistence failed.
    #[error("db: {0}")]
    Db(#[from] DbError),

    /// A path with this id is already tracked.
    #[error("path {0} already exists")]
    PathExists(PathId),

    /// No path with this id is tracked.
    #[error("path {0} not found")]
    PathNotFound(PathId),

    /// The path configuration is unusable.
    #[error("invalid path config: {0}")]
    InvalidConfig(String),
}
