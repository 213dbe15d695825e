//! REST client for mempool.space compatible block explorers (Esplora API).
//!
//! [`MempoolClient`] implements [`satsentry_gap_limit::ActivityChecker`] by fetching the
//! transaction list of an address and summarizing the newest entry.

pub mod client;
pub mod config;
pub mod errors;
pub mod types;

pub use client::MempoolClient;
pub use config::{ExplorerConfig, SelfHostedNode};
pub use errors::ClientError;
