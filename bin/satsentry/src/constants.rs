use std::time::Duration;

pub(crate) const DEFAULT_CHECK_INTERVAL_SECS: u64 = 300;

/// Lower bound on the check interval against the public explorer.
pub(crate) const MIN_CHECK_INTERVAL: Duration = Duration::from_secs(300);

/// Lower bound on the check interval against a self-hosted node.
pub(crate) const MIN_CHECK_INTERVAL_SELF_HOSTED: Duration = Duration::from_secs(30);

pub(crate) const DEFAULT_ACTIVITY_TIMEOUT_SECS: u64 = 30;

/// Lower bound on a single activity lookup.
pub(crate) const MIN_ACTIVITY_TIMEOUT: Duration = Duration::from_secs(1);

pub(crate) const DEFAULT_DATADIR: &str = "data";

pub(crate) const DEFAULT_THREAD_COUNT: usize = 4;

/// Capacity of the scheduler command channel.
pub(crate) const COMMAND_CHANNEL_CAPACITY: usize = 16;
