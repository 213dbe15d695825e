//! This crate contains the data model shared by the derivation, persistence and monitoring crates:
//! per-path derivation state, address records and the summaries of observed transactions.
//!
//! It lies at the bottom of the crate-hierarchy in this workspace i.e., it does not depend on any
//! other crate in this workspace.

pub mod activity;
pub mod errors;
pub mod path;
pub mod state;
pub mod watched;

pub use activity::{Direction, TransactionSummary};
pub use errors::StateError;
pub use path::PathId;
pub use state::{AddressRecord, DerivationPathState};
pub use watched::WatchedAddress;
