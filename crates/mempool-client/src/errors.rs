//! Client errors and their mapping onto activity-check failures.

use std::time::Duration;

use satsentry_gap_limit::ActivityCheckError;
use thiserror::Error;

/// Errors returned by [`crate::MempoolClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP client could not be built.
    #[error("building http client: {0}")]
    Build(reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout {
        /// The requested URL.
        url: String,
        /// The configured timeout.
        timeout: Duration,
    },

    /// The request failed before a response arrived.
    #[error("request to {url} failed: {source}")]
    Request {
        /// The requested URL.
        url: String,
        /// The underlying error.
        source: reqwest::Error,
    },

    /// The explorer answered with a non-success status.
    #[error("{url} returned status {status}")]
    Status {
        /// The requested URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The body could not be decoded.
    #[error("decoding response from {url}: {source}")]
    Decode {
        /// The requested URL.
        url: String,
        /// The underlying error.
        source: serde_json::Error,
    },
}

impl From<ClientError> for ActivityCheckError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Timeout { timeout, .. } => ActivityCheckError::Timeout(timeout),
            ClientError::Decode { .. } => ActivityCheckError::InvalidResponse(err.to_string()),
            ClientError::Build(_) | ClientError::Request { .. } | ClientError::Status { .. } => {
                ActivityCheckError::Transport(err.to_string())
            }
        }
    }
}
