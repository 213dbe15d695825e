//! Configuration of the maintainer and of individual paths.

use std::time::Duration;

use crate::errors::TrackerError;

/// Default number of trailing unused addresses.
pub const DEFAULT_GAP_LIMIT: u32 = 20;

/// Default number of addresses derived when a path is created.
pub const DEFAULT_INITIAL_ADDRESS_COUNT: u32 = 10;

/// Default upper bound on a single activity lookup.
pub const DEFAULT_ACTIVITY_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings shared by every path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintainerConfig {
    activity_timeout: Duration,
}

impl Default for MaintainerConfig {
    fn default() -> Self {
        Self {
            activity_timeout: DEFAULT_ACTIVITY_TIMEOUT,
        }
    }
}

impl MaintainerConfig {
    /// Sets the upper bound on a single activity lookup. Expiry counts as "not used".
    pub fn with_activity_timeout(self, timeout: Duration) -> Self {
        Self {
            activity_timeout: timeout,
        }
    }

    /// Returns the activity lookup timeout.
    pub fn activity_timeout(&self) -> Duration {
        self.activity_timeout
    }
}

/// Settings of a single derivation path, applied when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathConfig {
    gap_limit: u32,
    initial_address_count: u32,
    start_index: u32,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            gap_limit: DEFAULT_GAP_LIMIT,
            initial_address_count: DEFAULT_INITIAL_ADDRESS_COUNT,
            start_index: 0,
        }
    }
}

impl PathConfig {
    /// Sets the gap limit.
    pub fn with_gap_limit(self, gap_limit: u32) -> Self {
        Self { gap_limit, ..self }
    }

    /// Sets how many addresses are derived up front.
    pub fn with_initial_address_count(self, count: u32) -> Self {
        Self {
            initial_address_count: count,
            ..self
        }
    }

    /// Sets the first leaf index.
    pub fn with_start_index(self, start_index: u32) -> Self {
        Self {
            start_index,
            ..self
        }
    }

    /// Returns the gap limit.
    pub fn gap_limit(&self) -> u32 {
        self.gap_limit
    }

    /// Returns the number of addresses derived up front.
    pub fn initial_address_count(&self) -> u32 {
        self.initial_address_count
    }

    /// Returns the first leaf index.
    pub fn start_index(&self) -> u32 {
        self.start_index
    }

    pub(crate) fn validate(&self) -> Result<(), TrackerError> {
        if self.gap_limit == 0 {
            return Err(TrackerError::InvalidConfig(
                "gap limit must be at least 1".to_string(),
            ));
        }
        if self.initial_address_count == 0 {
            return Err(TrackerError::InvalidConfig(
                "initial address count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
