//! Gap-limit maintenance for derivation paths of extended public keys.
//!
//! [`GapLimitMaintainer`] keeps, for every tracked path, a trailing run of unused addresses at
//! least as long as the path's gap limit. It derives new addresses with
//! [`satsentry_key_deriv::addresses_for_range`], asks an [`ActivityChecker`] whether they have been
//! used and persists every change through a [`satsentry_db::tracker::PathStateDb`].
//!
//! Passes on the same path are serialized by a per-path lock; distinct paths run in parallel.

pub mod activity;
pub mod config;
pub mod errors;
mod locks;
pub mod maintainer;

pub use activity::{ActivityCheckError, ActivityChecker};
pub use config::{MaintainerConfig, PathConfig};
pub use errors::TrackerError;
pub use maintainer::{GapLimitMaintainer, NewActivity, RefreshOutcome};
