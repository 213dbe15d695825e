//! In-memory database for tracked paths and watched addresses.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use satsentry_primitives::{DerivationPathState, PathId, WatchedAddress};
use tokio::sync::RwLock;
use tracing::trace;

use crate::{
    errors::DbResult,
    tracker::{PathStateDb, WatchedAddressDb},
};

/// In-memory implementation of [`PathStateDb`] and [`WatchedAddressDb`].
///
/// Clones share the same underlying maps.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDb {
    /// path id -> state
    paths: Arc<RwLock<HashMap<PathId, DerivationPathState>>>,

    /// address -> watched address
    watched: Arc<RwLock<HashMap<String, WatchedAddress>>>,
}

impl InMemoryDb {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PathStateDb for InMemoryDb {
    async fn get_path_state(&self, id: &PathId) -> DbResult<Option<DerivationPathState>> {
        Ok(self.paths.read().await.get(id).cloned())
    }

    async fn set_path_state(&self, id: &PathId, state: &DerivationPathState) -> DbResult<()> {
        trace!(%id, current_index = state.current_index(), "storing path state");
        self.paths.write().await.insert(id.clone(), state.clone());

        Ok(())
    }

    async fn delete_path_state(&self, id: &PathId) -> DbResult<bool> {
        Ok(self.paths.write().await.remove(id).is_some())
    }

    async fn list_path_ids(&self) -> DbResult<Vec<PathId>> {
        let mut ids: Vec<PathId> = self.paths.read().await.keys().cloned().collect();
        ids.sort();

        Ok(ids)
    }
}

#[async_trait]
impl WatchedAddressDb for InMemoryDb {
    async fn get_watched_address(&self, address: &str) -> DbResult<Option<WatchedAddress>> {
        Ok(self.watched.read().await.get(address).cloned())
    }

    async fn set_watched_address(&self, watched: &WatchedAddress) -> DbResult<()> {
        self.watched
            .write()
            .await
            .insert(watched.address.clone(), watched.clone());

        Ok(())
    }

    async fn delete_watched_address(&self, address: &str) -> DbResult<bool> {
        Ok(self.watched.write().await.remove(address).is_some())
    }

    async fn list_watched_addresses(&self) -> DbResult<Vec<WatchedAddress>> {
        let mut all: Vec<WatchedAddress> = self.watched.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.address.cmp(&b.address));

        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(len: u32) -> DerivationPathState {
        let derived = (0..len).map(|i| (i, format!("addr{i}"))).collect();
        DerivationPathState::new(0, 5, derived).unwrap()
    }

    #[tokio::test]
    async fn path_state_lifecycle() {
        let db = InMemoryDb::new();
        let id = PathId::new("zpub-a", "m/84'/0'/0'");

        assert_eq!(db.get_path_state(&id).await.unwrap(), None);

        db.set_path_state(&id, &state(3)).await.unwrap();
        db.set_path_state(&id, &state(5)).await.unwrap();
        assert_eq!(db.get_path_state(&id).await.unwrap(), Some(state(5)));

        let other = PathId::new("xpub-b", "");
        db.set_path_state(&other, &state(1)).await.unwrap();
        assert_eq!(db.list_path_ids().await.unwrap(), vec![other.clone(), id.clone()]);

        assert!(db.delete_path_state(&id).await.unwrap());
        assert!(!db.delete_path_state(&id).await.unwrap());
        assert_eq!(db.list_path_ids().await.unwrap(), vec![other]);
    }

    #[tokio::test]
    async fn clones_share_storage() {
        let db = InMemoryDb::new();
        let clone = db.clone();

        clone
            .set_watched_address(&WatchedAddress::new("bc1qb", "b"))
            .await
            .unwrap();
        clone
            .set_watched_address(&WatchedAddress::new("bc1qa", "a"))
            .await
            .unwrap();

        let listed = db.list_watched_addresses().await.unwrap();
        let addresses: Vec<&str> = listed.iter().map(|w| w.address.as_str()).collect();
        assert_eq!(addresses, vec!["bc1qa", "bc1qb"]);

        assert!(db.delete_watched_address("bc1qa").await.unwrap());
        assert_eq!(db.get_watched_address("bc1qa").await.unwrap(), None);
    }
}
