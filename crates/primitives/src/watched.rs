//! Single addresses watched outside of any derivation path.

use serde::{Deserialize, Serialize};

use crate::activity::TransactionSummary;

/// A standalone address the user asked to monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedAddress {
    /// The encoded address.
    pub address: String,

    /// Free-form name shown in logs.
    #[serde(default)]
    pub label: String,

    /// The newest transaction seen, used to suppress duplicate notifications.
    #[serde(default)]
    pub last_transaction: Option<TransactionSummary>,
}

impl WatchedAddress {
    /// Creates a watched address with no recorded activity.
    pub fn new(address: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            label: label.into(),
            last_transaction: None,
        }
    }

    /// Records `tx` as the latest transaction and returns whether it was previously unseen.
    pub fn observe(&mut self, tx: TransactionSummary) -> bool {
        let is_new = tx.is_new_relative_to(self.last_transaction.as_ref());
        self.last_transaction = Some(tx);
        is_new
    }
}
