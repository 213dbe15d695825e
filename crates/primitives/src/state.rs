//! Mutable per-path derivation state and the address records it owns.
//!
//! A [`DerivationPathState`] always satisfies:
//!
//! - it holds at least one [`AddressRecord`];
//! - record indices are contiguous, starting at `start_index`;
//! - `current_index == start_index + records - 1`;
//! - `gap_limit >= 1`.
//!
//! Every mutation validates its input before touching the state, and the serde representation is
//! re-validated on deserialization, so an inconsistent snapshot can neither be produced nor loaded.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{activity::TransactionSummary, errors::StateError};

/// A derived address and what is known about its on-chain usage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// The encoded address.
    pub address: String,

    /// Whether any transaction has ever been observed for the address.
    pub used: bool,

    /// The newest transaction observed, if any.
    pub last_transaction: Option<TransactionSummary>,
}

impl AddressRecord {
    /// Creates an unused record.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            used: false,
            last_transaction: None,
        }
    }
}

/// Derivation progress and address usage for one (extended key, path) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PathStateRepr", into = "PathStateRepr")]
pub struct DerivationPathState {
    start_index: u32,
    current_index: u32,
    gap_limit: u32,
    addresses: BTreeMap<u32, AddressRecord>,
}

impl DerivationPathState {
    /// Creates a path from its initial batch of derived `(index, address)` pairs.
    pub fn new(
        start_index: u32,
        gap_limit: u32,
        derived: Vec<(u32, String)>,
    ) -> Result<Self, StateError> {
        if gap_limit == 0 {
            return Err(StateError::InvalidGapLimit);
        }
        if derived.is_empty() {
            return Err(StateError::Empty);
        }
        let current_index = check_contiguous(start_index, &derived)?;

        let addresses = derived
            .into_iter()
            .map(|(index, address)| (index, AddressRecord::new(address)))
            .collect();

        Ok(Self {
            start_index,
            current_index,
            gap_limit,
            addresses,
        })
    }

    /// The first derived index.
    pub fn start_index(&self) -> u32 {
        self.start_index
    }

    /// The highest derived index.
    pub fn current_index(&self) -> u32 {
        self.current_index
    }

    /// The index the next derived address must have.
    pub fn next_index(&self) -> u32 {
        self.current_index.saturating_add(1)
    }

    /// The configured gap limit.
    pub fn gap_limit(&self) -> u32 {
        self.gap_limit
    }

    /// All records keyed by leaf index.
    pub fn addresses(&self) -> &BTreeMap<u32, AddressRecord> {
        &self.addresses
    }

    /// The record at `index`.
    pub fn get(&self, index: u32) -> Option<&AddressRecord> {
        self.addresses.get(&index)
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Always `false`; a path is never empty.
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Looks up the index of an address string.
    pub fn find_address(&self, address: &str) -> Option<u32> {
        self.addresses
            .iter()
            .find(|(_, record)| record.address == address)
            .map(|(index, _)| *index)
    }

    /// The highest index whose record is used.
    pub fn last_used_index(&self) -> Option<u32> {
        self.addresses
            .iter()
            .rev()
            .find(|(_, record)| record.used)
            .map(|(index, _)| *index)
    }

    /// Number of consecutive unused records ending at `current_index`.
    pub fn trailing_unused(&self) -> u32 {
        self.addresses
            .values()
            .rev()
            .take_while(|record| !record.used)
            .count() as u32
    }

    /// How many addresses must be appended to restore the gap limit.
    pub fn addresses_needed(&self) -> u32 {
        self.gap_limit.saturating_sub(self.trailing_unused())
    }

    /// Whether the trailing run of unused addresses already covers the gap limit.
    pub fn satisfies_gap_limit(&self) -> bool {
        self.addresses_needed() == 0
    }

    /// Appends a batch of freshly derived addresses as unused records.
    ///
    /// The batch must start at [`Self::next_index`] and be contiguous. `current_index` advances
    /// together with the records; nothing is applied if validation fails.
    pub fn extend(&mut self, derived: Vec<(u32, String)>) -> Result<(), StateError> {
        if derived.is_empty() {
            return Ok(());
        }
        let current_index = check_contiguous(self.next_index(), &derived)?;

        self.addresses.extend(
            derived
                .into_iter()
                .map(|(index, address)| (index, AddressRecord::new(address))),
        );
        self.current_index = current_index;

        Ok(())
    }

    /// Marks the record at `index` as used and stores `tx` as its latest transaction.
    ///
    /// Returns `true` if anything changed.
    pub fn mark_used(&mut self, index: u32, tx: TransactionSummary) -> Result<bool, StateError> {
        let record = self
            .addresses
            .get_mut(&index)
            .ok_or(StateError::UnknownIndex(index))?;

        let changed = !record.used || record.last_transaction.as_ref() != Some(&tx);
        record.used = true;
        record.last_transaction = Some(tx);

        Ok(changed)
    }

    /// Explicit correction: marks the record at `index` unused and forgets its transaction.
    ///
    /// Returns `true` if anything changed.
    pub fn mark_unused(&mut self, index: u32) -> Result<bool, StateError> {
        let record = self
            .addresses
            .get_mut(&index)
            .ok_or(StateError::UnknownIndex(index))?;

        let changed = record.used || record.last_transaction.is_some();
        record.used = false;
        record.last_transaction = None;

        Ok(changed)
    }

    /// Changes the gap limit without deriving anything.
    ///
    /// Returns `false` if the limit was already `gap_limit`.
    pub fn set_gap_limit(&mut self, gap_limit: u32) -> Result<bool, StateError> {
        if gap_limit == 0 {
            return Err(StateError::InvalidGapLimit);
        }
        if self.gap_limit == gap_limit {
            return Ok(false);
        }
        self.gap_limit = gap_limit;
        Ok(true)
    }
}

/// Checks that `derived` runs contiguously from `expected` and returns its last index.
fn check_contiguous(mut expected: u32, derived: &[(u32, String)]) -> Result<u32, StateError> {
    let mut last = expected;
    for (index, _) in derived {
        if *index != expected {
            return Err(StateError::NonContiguous {
                expected,
                found: *index,
            });
        }
        last = expected;
        expected = expected.wrapping_add(1);
    }
    Ok(last)
}

/// Wire shape of [`DerivationPathState`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PathStateRepr {
    start_index: u32,
    current_index: u32,
    gap_limit: u32,
    addresses: BTreeMap<u32, AddressRecord>,
}

impl TryFrom<PathStateRepr> for DerivationPathState {
    type Error = StateError;

    fn try_from(repr: PathStateRepr) -> Result<Self, Self::Error> {
        if repr.gap_limit == 0 {
            return Err(StateError::InvalidGapLimit);
        }
        if repr.addresses.is_empty() {
            return Err(StateError::Empty);
        }

        let mut expected = repr.start_index;
        for index in repr.addresses.keys() {
            if *index != expected {
                return Err(StateError::NonContiguous {
                    expected,
                    found: *index,
                });
            }
            expected = expected.wrapping_add(1);
        }

        let last = expected.wrapping_sub(1);
        if last != repr.current_index {
            return Err(StateError::InconsistentIndex {
                start_index: repr.start_index,
                current_index: repr.current_index,
                records: repr.addresses.len(),
            });
        }

        Ok(Self {
            start_index: repr.start_index,
            current_index: repr.current_index,
            gap_limit: repr.gap_limit,
            addresses: repr.addresses,
        })
    }
}

impl From<DerivationPathState> for PathStateRepr {
    fn from(state: DerivationPathState) -> Self {
        Self {
            start_index: state.start_index,
            current_index: state.current_index,
            gap_limit: state.gap_limit,
            addresses: state.addresses,
        }
    }
}
