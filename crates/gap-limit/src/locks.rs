//! Per-path mutual exclusion.

use std::{collections::HashMap, sync::Arc};

use satsentry_primitives::PathId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Hands out one async mutex per [`PathId`].
///
/// The registry itself is only held for the map lookup, never across an await.
#[derive(Debug, Default)]
pub(crate) struct PathLocks {
    locks: parking_lot::Mutex<HashMap<PathId, Arc<Mutex<()>>>>,
}

impl PathLocks {
    /// Waits until no other pass holds the lock of `id`.
    pub(crate) async fn acquire(&self, id: &PathId) -> OwnedMutexGuard<()> {
        let lock = self.locks.lock().entry(id.clone()).or_default().clone();
        lock.lock_owned().await
    }

    /// Drops the lock of a deleted path unless a pass still holds or waits on it.
    ///
    /// Handles are only cloned under the registry lock, so a count of one here means nobody can
    /// be holding or queued on the entry.
    pub(crate) fn forget(&self, id: &PathId) {
        let mut locks = self.locks.lock();
        if locks.get(id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(id);
        }
    }

    #[cfg(test)]
    fn contains(&self, id: &PathId) -> bool {
        self.locks.lock().contains_key(id)
    }
}
