//! Watcher configuration, read from a TOML file.

use std::{path::PathBuf, time::Duration};

use satsentry_gap_limit::{
    config::{DEFAULT_GAP_LIMIT, DEFAULT_INITIAL_ADDRESS_COUNT},
    PathConfig,
};
use satsentry_mempool_client::ExplorerConfig;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ACTIVITY_TIMEOUT_SECS, DEFAULT_CHECK_INTERVAL_SECS, DEFAULT_DATADIR,
    MIN_ACTIVITY_TIMEOUT, MIN_CHECK_INTERVAL, MIN_CHECK_INTERVAL_SELF_HOSTED,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Config {
    /// Directory holding the JSON documents.
    #[serde(default = "default_datadir")]
    pub datadir: PathBuf,

    /// Seconds between two monitoring passes, see [`Config::check_interval`].
    #[serde(default = "default_check_interval")]
    pub check_interval: u64,

    /// Seconds a single activity lookup may take.
    #[serde(default = "default_activity_timeout")]
    pub activity_timeout: u64,

    #[serde(default)]
    pub explorer: ExplorerConfig,

    #[serde(default)]
    pub defaults: PathDefaults,

    #[serde(default)]
    pub addresses: Vec<AddressEntry>,

    #[serde(default)]
    pub extended_keys: Vec<ExtendedKeyEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct PathDefaults {
    pub gap_limit: u32,
    pub initial_addresses: u32,
}

impl Default for PathDefaults {
    fn default() -> Self {
        Self {
            gap_limit: DEFAULT_GAP_LIMIT,
            initial_addresses: DEFAULT_INITIAL_ADDRESS_COUNT,
        }
    }
}

/// A single address to watch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct AddressEntry {
    pub address: String,

    #[serde(default)]
    pub label: String,
}

/// An extended key whose receive chain should be tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ExtendedKeyEntry {
    pub key: String,

    /// Name shown in logs.
    #[serde(default)]
    pub label: String,

    /// Identifies the path next to the key; the family's account path when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derivation_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap_limit: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_addresses: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<u32>,
}

impl ExtendedKeyEntry {
    /// Path settings for this key, falling back to `defaults`.
    pub(crate) fn path_config(&self, defaults: &PathDefaults) -> PathConfig {
        PathConfig::default()
            .with_gap_limit(self.gap_limit.unwrap_or(defaults.gap_limit))
            .with_initial_address_count(
                self.initial_addresses
                    .unwrap_or(defaults.initial_addresses),
            )
            .with_start_index(self.start_index.unwrap_or_default())
    }
}

fn default_datadir() -> PathBuf {
    PathBuf::from(DEFAULT_DATADIR)
}

fn default_check_interval() -> u64 {
    DEFAULT_CHECK_INTERVAL_SECS
}

fn default_activity_timeout() -> u64 {
    DEFAULT_ACTIVITY_TIMEOUT_SECS
}

impl Config {
    /// The effective interval between passes.
    ///
    /// Values below the minimum are raised to it. The public explorer is rate limited, so its
    /// minimum is higher than a self-hosted node's.
    pub(crate) fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval).max(self.min_check_interval())
    }

    pub(crate) fn min_check_interval(&self) -> Duration {
        if self.explorer.is_self_hosted() {
            MIN_CHECK_INTERVAL_SELF_HOSTED
        } else {
            MIN_CHECK_INTERVAL
        }
    }

    /// The effective bound on a single activity lookup, never below one second.
    pub(crate) fn activity_timeout(&self) -> Duration {
        Duration::from_secs(self.activity_timeout).max(MIN_ACTIVITY_TIMEOUT)
    }
}
