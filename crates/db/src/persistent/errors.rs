//! Persistent database errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when interacting with the on-disk store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing a document failed.
    #[error("io on {path}: {source}")]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// A document could not be encoded or decoded.
    #[error("json in {path}: {source}")]
    Serialization {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        source: serde_json::Error,
    },
}
