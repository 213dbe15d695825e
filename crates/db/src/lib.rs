//! Persistence of derivation-path state and single watched addresses.
//!
//! The [`tracker`] traits are implemented by [`inmemory::InMemoryDb`] for tests and ephemeral runs
//! and by [`persistent::JsonFileDb`] for on-disk storage.

pub mod errors;
pub mod inmemory;
pub mod persistent;
pub mod tracker;
