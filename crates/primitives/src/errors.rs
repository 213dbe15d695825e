//! Errors raised when a mutation would break the invariants of a [`crate::DerivationPathState`].

use thiserror::Error;

/// Violations of the derivation-path state invariants.
///
/// Every mutating operation validates its input first and returns one of these without touching
/// the state, so a failed call never leaves a partially applied change behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// A path must hold at least one address.
    #[error("a derivation path needs at least one address")]
    Empty,

    /// The gap limit must be a positive integer.
    #[error("gap limit must be at least 1")]
    InvalidGapLimit,

    /// An index does not directly follow its predecessor.
    #[error("expected index {expected} but found {found}")]
    NonContiguous {
        /// The index the state requires next.
        expected: u32,
        /// The index that was supplied.
        found: u32,
    },

    /// `current_index` disagrees with the stored records.
    #[error("current index {current_index} inconsistent with {records} records from {start_index}")]
    InconsistentIndex {
        /// The first index of the path.
        start_index: u32,
        /// The recorded highest index.
        current_index: u32,
        /// The number of stored records.
        records: usize,
    },

    /// No record exists at the requested index.
    #[error("no address at index {0}")]
    UnknownIndex(u32),
}
