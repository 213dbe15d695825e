//! The capability the maintainer uses to learn whether an address has been used.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use satsentry_primitives::TransactionSummary;
use thiserror::Error;

/// Transient failures of an activity lookup.
///
/// The maintainer never propagates these: the address is treated as unused for the current pass and
/// checked again on the next one.
#[derive(Debug, Error)]
pub enum ActivityCheckError {
    /// The lookup did not finish in time.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The request could not be delivered or the remote end failed.
    #[error("transport: {0}")]
    Transport(String),

    /// The remote end answered with something unexpected.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Answers "has this address ever been used, and by which transaction most recently".
#[async_trait]
pub trait ActivityChecker: Send + Sync {
    /// Returns the newest transaction touching `address`, or `None` if it has none.
    async fn check_activity(
        &self,
        address: &str,
    ) -> Result<Option<TransactionSummary>, ActivityCheckError>;
}

#[async_trait]
impl<T: ActivityChecker + ?Sized> ActivityChecker for Arc<T> {
    async fn check_activity(
        &self,
        address: &str,
    ) -> Result<Option<TransactionSummary>, ActivityCheckError> {
        (**self).check_activity(address).await
    }
}
