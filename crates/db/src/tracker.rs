//! Storage traits for everything the watcher tracks.

use async_trait::async_trait;
use satsentry_primitives::{DerivationPathState, PathId, WatchedAddress};

use crate::errors::DbResult;

/// Storage for derivation-path state, keyed by [`PathId`].
///
/// Every `set` replaces the whole snapshot, so a reader sees either the previous or the new state.
#[async_trait]
pub trait PathStateDb {
    /// Fetches the state of a path.
    async fn get_path_state(&self, id: &PathId) -> DbResult<Option<DerivationPathState>>;

    /// Inserts or replaces the state of a path.
    async fn set_path_state(&self, id: &PathId, state: &DerivationPathState) -> DbResult<()>;

    /// Removes a path. Returns whether it existed.
    async fn delete_path_state(&self, id: &PathId) -> DbResult<bool>;

    /// All stored path ids, sorted.
    async fn list_path_ids(&self) -> DbResult<Vec<PathId>>;
}

/// Storage for standalone watched addresses, keyed by the address string.
#[async_trait]
pub trait WatchedAddressDb {
    /// Fetches a watched address.
    async fn get_watched_address(&self, address: &str) -> DbResult<Option<WatchedAddress>>;

    /// Inserts or replaces a watched address.
    async fn set_watched_address(&self, watched: &WatchedAddress) -> DbResult<()>;

    /// Removes an address. Returns whether it existed.
    async fn delete_watched_address(&self, address: &str) -> DbResult<bool>;

    /// All watched addresses, sorted by address.
    async fn list_watched_addresses(&self) -> DbResult<Vec<WatchedAddress>>;
}
