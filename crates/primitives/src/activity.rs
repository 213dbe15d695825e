//! Summaries of on-chain activity observed for a watched address.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a transaction paid into or spent from the watched address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// The address appears only among the outputs.
    Incoming,
    /// The address funds at least one input.
    Outgoing,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Incoming => write!(f, "incoming"),
            Direction::Outgoing => write!(f, "outgoing"),
        }
    }
}

/// The most recent transaction seen for an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    /// Transaction id as rendered by the block explorer.
    pub txid: String,

    /// Direction relative to the watched address.
    pub direction: Direction,

    /// Block time when confirmed, otherwise the time the transaction was first observed.
    pub timestamp: DateTime<Utc>,
}

impl TransactionSummary {
    /// Creates a new summary.
    pub fn new(txid: impl Into<String>, direction: Direction, timestamp: DateTime<Utc>) -> Self {
        Self {
            txid: txid.into(),
            direction,
            timestamp,
        }
    }

    /// Whether `self` describes a different transaction than `previous`.
    ///
    /// A missing previous transaction always counts as new.
    pub fn is_new_relative_to(&self, previous: Option<&TransactionSummary>) -> bool {
        match previous {
            Some(prev) => prev.txid != self.txid,
            None => true,
        }
    }
}
