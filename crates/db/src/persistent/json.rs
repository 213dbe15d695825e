//! JSON-file implementation of the storage traits.
//!
//! Two documents live under the data directory:
//!
//! - the paths document: `{extended_key: {label: DerivationPathState}}`
//! - the watched document: `{address: WatchedAddress}`
//!
//! Both are loaded once on open and kept in memory. Every write serializes the complete updated
//! document to a scratch file and renames it over the original; the in-memory copy is only replaced
//! once the rename succeeded.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use satsentry_primitives::{DerivationPathState, PathId, WatchedAddress};
use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs, sync::Mutex};
use tracing::{debug, info};

use super::{config::JsonDbConfig, constants::TMP_SUFFIX, errors::StorageError};
use crate::{
    errors::DbResult,
    tracker::{PathStateDb, WatchedAddressDb},
};

type PathsDocument = BTreeMap<String, BTreeMap<String, DerivationPathState>>;
type WatchedDocument = BTreeMap<String, WatchedAddress>;

/// File-backed database.
#[derive(Debug, Clone)]
pub struct JsonFileDb {
    config: JsonDbConfig,
    paths: Arc<Mutex<PathsDocument>>,
    watched: Arc<Mutex<WatchedDocument>>,
}

impl JsonFileDb {
    /// Opens the database, creating the data directory if needed.
    ///
    /// Missing documents start out empty. A document that fails to parse, including one holding a
    /// path state that violates its invariants, is an error.
    pub async fn open(config: JsonDbConfig) -> DbResult<Self> {
        fs::create_dir_all(config.datadir())
            .await
            .map_err(|source| StorageError::Io {
                path: config.datadir().to_path_buf(),
                source,
            })?;

        let paths: PathsDocument = load(&config.paths_path()).await?;
        let watched: WatchedDocument = load(&config.watched_path()).await?;

        info!(
            datadir = %config.datadir().display(),
            keys = paths.len(),
            watched = watched.len(),
            "opened json database"
        );

        Ok(Self {
            config,
            paths: Arc::new(Mutex::new(paths)),
            watched: Arc::new(Mutex::new(watched)),
        })
    }

    /// Returns the configuration the database was opened with.
    pub fn config(&self) -> &JsonDbConfig {
        &self.config
    }
}

async fn load<T>(path: &Path) -> Result<T, StorageError>
where
    T: DeserializeOwned + Default,
{
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no document yet, starting empty");
            return Ok(T::default());
        }
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_slice(&bytes).map_err(|source| StorageError::Serialization {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `document` to a scratch file next to `path`, then renames it into place.
async fn store<T: Serialize>(path: &Path, document: &T) -> Result<(), StorageError> {
    let bytes =
        serde_json::to_vec_pretty(document).map_err(|source| StorageError::Serialization {
            path: path.to_path_buf(),
            source,
        })?;

    let tmp = tmp_path(path);
    fs::write(&tmp, &bytes)
        .await
        .map_err(|source| StorageError::Io {
            path: tmp.clone(),
            source,
        })?;
    fs::rename(&tmp, path)
        .await
        .map_err(|source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(TMP_SUFFIX);
    path.with_file_name(name)
}

#[async_trait]
impl PathStateDb for JsonFileDb {
    async fn get_path_state(&self, id: &PathId) -> DbResult<Option<DerivationPathState>> {
        let paths = self.paths.lock().await;

        Ok(paths
            .get(&id.extended_key)
            .and_then(|labels| labels.get(&id.label))
            .cloned())
    }

    async fn set_path_state(&self, id: &PathId, state: &DerivationPathState) -> DbResult<()> {
        let mut paths = self.paths.lock().await;

        let mut updated = paths.clone();
        updated
            .entry(id.extended_key.clone())
            .or_default()
            .insert(id.label.clone(), state.clone());

        store(&self.config.paths_path(), &updated).await?;
        *paths = updated;

        Ok(())
    }

    async fn delete_path_state(&self, id: &PathId) -> DbResult<bool> {
        let mut paths = self.paths.lock().await;
        let exists = paths
            .get(&id.extended_key)
            .is_some_and(|labels| labels.contains_key(&id.label));
        if !exists {
            return Ok(false);
        }

        let mut updated = paths.clone();
        let labels = updated.entry(id.extended_key.clone()).or_default();
        labels.remove(&id.label);
        if labels.is_empty() {
            updated.remove(&id.extended_key);
        }

        store(&self.config.paths_path(), &updated).await?;
        *paths = updated;

        Ok(true)
    }

    async fn list_path_ids(&self) -> DbResult<Vec<PathId>> {
        let paths = self.paths.lock().await;

        Ok(paths
            .iter()
            .flat_map(|(key, labels)| {
                labels
                    .keys()
                    .map(move |label| PathId::new(key, label))
            })
            .collect())
    }
}

#[async_trait]
impl WatchedAddressDb for JsonFileDb {
    async fn get_watched_address(&self, address: &str) -> DbResult<Option<WatchedAddress>> {
        Ok(self.watched.lock().await.get(address).cloned())
    }

    async fn set_watched_address(&self, watched: &WatchedAddress) -> DbResult<()> {
        let mut document = self.watched.lock().await;

        let mut updated = document.clone();
        updated.insert(watched.address.clone(), watched.clone());

        store(&self.config.watched_path(), &updated).await?;
        *document = updated;

        Ok(())
    }

    async fn delete_watched_address(&self, address: &str) -> DbResult<bool> {
        let mut document = self.watched.lock().await;
        if !document.contains_key(address) {
            return Ok(false);
        }

        let mut updated = document.clone();
        updated.remove(address);

        store(&self.config.watched_path(), &updated).await?;
        *document = updated;

        Ok(true)
    }

    async fn list_watched_addresses(&self) -> DbResult<Vec<WatchedAddress>> {
        Ok(self.watched.lock().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use satsentry_primitives::{Direction, TransactionSummary};

    use super::*;
    use crate::errors::DbError;

    fn state(len: u32) -> DerivationPathState {
        let derived = (0..len).map(|i| (i, format!("addr{i}"))).collect();
        DerivationPathState::new(0, 5, derived).unwrap()
    }

    #[tokio::test]
    async fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = JsonDbConfig::new(dir.path());

        let id = PathId::new("zpub-a", "m/84'/0'/0'");
        let mut tracked = state(4);
        tracked
            .mark_used(
                1,
                TransactionSummary::new(
                    "ab",
                    Direction::Incoming,
                    Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
                ),
            )
            .unwrap();

        let watched = WatchedAddress::new("1LqBGSKuX5yYUonjxT5qGfpUsXKYYWeabA", "cold storage");

        {
            let db = JsonFileDb::open(config.clone()).await.unwrap();
            db.set_path_state(&id, &tracked).await.unwrap();
            db.set_path_state(&PathId::new("zpub-a", "other"), &state(2))
                .await
                .unwrap();
            db.set_watched_address(&watched).await.unwrap();
        }

        let db = JsonFileDb::open(config.clone()).await.unwrap();
        assert_eq!(db.get_path_state(&id).await.unwrap(), Some(tracked));
        assert_eq!(
            db.list_path_ids().await.unwrap(),
            vec![id.clone(), PathId::new("zpub-a", "other")]
        );
        assert_eq!(db.list_watched_addresses().await.unwrap(), vec![watched]);

        assert!(!config.paths_path().with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn delete_drops_empty_key_groups() {
        let dir = tempfile::tempdir().unwrap();
        let config = JsonDbConfig::new(dir.path());
        let db = JsonFileDb::open(config.clone()).await.unwrap();

        let id = PathId::new("xpub-a", "");
        db.set_path_state(&id, &state(1)).await.unwrap();
        assert!(db.delete_path_state(&id).await.unwrap());
        assert!(!db.delete_path_state(&id).await.unwrap());

        let raw = std::fs::read_to_string(config.paths_path()).unwrap();
        assert_eq!(raw.trim(), "{}");
    }

    #[tokio::test]
    async fn lists_every_label_of_every_key() {
        let dir = tempfile::tempdir().unwrap();
        let db = JsonFileDb::open(JsonDbConfig::new(dir.path())).await.unwrap();

        let ids = [
            PathId::new("xpub-b", "m/44'/0'/0'"),
            PathId::new("zpub-a", "m/84'/0'/1'"),
            PathId::new("zpub-a", "m/84'/0'/0'"),
        ];
        for id in &ids {
            db.set_path_state(id, &state(1)).await.unwrap();
        }

        assert_eq!(
            db.list_path_ids().await.unwrap(),
            vec![ids[0].clone(), ids[2].clone(), ids[1].clone()]
        );

        assert!(db.delete_path_state(&ids[2]).await.unwrap());
        assert_eq!(
            db.list_path_ids().await.unwrap(),
            vec![ids[0].clone(), ids[1].clone()]
        );
    }

    #[tokio::test]
    async fn missing_files_start_empty() {
        let dir = tempfile::tempdir().unwrap();
        let db = JsonFileDb::open(JsonDbConfig::new(dir.path().join("nested")))
            .await
            .unwrap();

        assert!(db.list_path_ids().await.unwrap().is_empty());
        assert!(db.list_watched_addresses().await.unwrap().is_empty());
        assert!(!db.delete_watched_address("bc1qnothing").await.unwrap());
    }

    #[tokio::test]
    async fn inconsistent_snapshot_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = JsonDbConfig::new(dir.path());

        let corrupt = r#"{
            "xpub-a": {
                "": {
                    "start_index": 0,
                    "current_index": 4,
                    "gap_limit": 5,
                    "addresses": {
                        "0": {"address": "a0", "used": false, "last_transaction": null}
                    }
                }
            }
        }"#;
        std::fs::write(config.paths_path(), corrupt).unwrap();

        let err = JsonFileDb::open(config).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Storage(StorageError::Serialization { .. })
        ));
    }

    #[test]
    fn config_file_names() {
        let config = JsonDbConfig::new("/var/lib/satsentry").with_watched_file("watch.json");

        assert_eq!(
            config.paths_path(),
            PathBuf::from("/var/lib/satsentry/extended_public_keys.json")
        );
        assert_eq!(
            config.watched_path(),
            PathBuf::from("/var/lib/satsentry/watch.json")
        );
        assert_eq!(
            tmp_path(&config.watched_path()),
            PathBuf::from("/var/lib/satsentry/watch.json.tmp")
        );
    }
}
