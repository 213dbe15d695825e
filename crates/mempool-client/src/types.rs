//! The subset of the Esplora transaction schema the watcher reads.

use chrono::{DateTime, Utc};
use satsentry_primitives::{Direction, TransactionSummary};
use serde::Deserialize;

/// A transaction as listed by `GET /address/{address}/txs`, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EsploraTx {
    /// Transaction id.
    pub txid: String,

    /// Inputs with their resolved previous outputs.
    #[serde(default)]
    pub vin: Vec<EsploraVin>,

    /// Confirmation status.
    pub status: EsploraStatus,
}

/// A transaction input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EsploraVin {
    /// The output being spent; absent for coinbase inputs.
    #[serde(default)]
    pub prevout: Option<EsploraPrevout>,
}

/// The previous output spent by an input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EsploraPrevout {
    /// Address of the output script, if it has one.
    #[serde(default)]
    pub scriptpubkey_address: Option<String>,
}

/// Confirmation status of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EsploraStatus {
    /// Whether the transaction is in a block.
    pub confirmed: bool,

    /// Unix time of the including block.
    #[serde(default)]
    pub block_time: Option<i64>,
}

impl EsploraTx {
    /// `Outgoing` if any input spends from `address`, otherwise `Incoming`.
    pub fn direction_for(&self, address: &str) -> Direction {
        let spends = self.vin.iter().any(|vin| {
            vin.prevout
                .as_ref()
                .and_then(|prevout| prevout.scriptpubkey_address.as_deref())
                == Some(address)
        });

        if spends {
            Direction::Outgoing
        } else {
            Direction::Incoming
        }
    }

    /// Block time when confirmed, otherwise `now`.
    pub fn timestamp_or(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match (self.status.confirmed, self.status.block_time) {
            (true, Some(secs)) => DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or(now),
            _ => now,
        }
    }

    /// Summarizes the transaction from the point of view of `address`.
    pub fn summarize(&self, address: &str, now: DateTime<Utc>) -> TransactionSummary {
        TransactionSummary::new(
            self.txid.clone(),
            self.direction_for(address),
            self.timestamp_or(now),
        )
    }
}
