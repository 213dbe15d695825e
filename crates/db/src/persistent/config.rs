//! This module contains all the configuration types used in the persistence layer.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::constants::{DEFAULT_PATHS_FILE, DEFAULT_WATCHED_FILE};

/// The configuration for the JSON-file database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonDbConfig {
    datadir: PathBuf,
    paths_file: String,
    watched_file: String,
}

impl JsonDbConfig {
    /// Stores both documents under `datadir` with their default file names.
    pub fn new(datadir: impl Into<PathBuf>) -> Self {
        Self {
            datadir: datadir.into(),
            paths_file: DEFAULT_PATHS_FILE.to_string(),
            watched_file: DEFAULT_WATCHED_FILE.to_string(),
        }
    }

    /// Sets the file name of the derivation-path document.
    pub fn with_paths_file(self, name: impl Into<String>) -> Self {
        Self {
            paths_file: name.into(),
            ..self
        }
    }

    /// Sets the file name of the watched-address document.
    pub fn with_watched_file(self, name: impl Into<String>) -> Self {
        Self {
            watched_file: name.into(),
            ..self
        }
    }

    /// Returns the data directory.
    pub fn datadir(&self) -> &Path {
        &self.datadir
    }

    /// Returns the full path of the derivation-path document.
    pub fn paths_path(&self) -> PathBuf {
        self.datadir.join(&self.paths_file)
    }

    /// Returns the full path of the watched-address document.
    pub fn watched_path(&self) -> PathBuf {
        self.datadir.join(&self.watched_file)
    }
}

impl Default for JsonDbConfig {
    fn default() -> Self {
        Self::new("data")
    }
}
