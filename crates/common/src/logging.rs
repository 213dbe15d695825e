//! Provides utilities to initialize logging.
use std::env;

use tracing::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Environment variable name for the service label, which is appended to the
/// whoami string.
pub const SVC_LABEL_ENVVAR: &str = "SATSENTRY_SVC_LABEL";

/// Environment variable that enables source file annotations when set to `1`.
pub const LOG_FILE_ENVVAR: &str = "LOG_FILE";

/// Environment variable that enables line number annotations when set to `1`.
pub const LOG_LINE_NUM_ENVVAR: &str = "LOG_LINE_NUM";

/// Configuration for the logger.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// The whoami string, which is used to identify the service in logs.
    whoami: String,

    /// Whether to include the source file in every event.
    with_file: bool,

    /// Whether to include the line number in every event.
    with_line_number: bool,
}

impl LoggerConfig {
    /// Creates a new instance with whoami set and annotations read from the environment.
    pub fn new(whoami: String) -> Self {
        Self {
            whoami,
            with_file: env_flag(LOG_FILE_ENVVAR),
            with_line_number: env_flag(LOG_LINE_NUM_ENVVAR),
        }
    }

    /// Creates a new instance with the whoami string derived from the provided base name.
    pub fn with_base_name(s: &str) -> Self {
        Self::new(get_whoami_string(s))
    }

    /// Forces source file annotations on or off.
    pub fn with_file(mut self, enabled: bool) -> Self {
        self.with_file = enabled;
        self
    }

    /// Forces line number annotations on or off.
    pub fn with_line_number(mut self, enabled: bool) -> Self {
        self.with_line_number = enabled;
        self
    }

    /// The whoami string this config will log with.
    pub fn whoami(&self) -> &str {
        &self.whoami
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::with_base_name("(satsentry)")
    }
}

/// Initializes the logging subsystem with the provided config.
///
/// Filtering follows `RUST_LOG`. Calling this more than once is harmless: later calls keep the
/// subscriber installed by the first one, which is what tests sharing a process need.
pub fn init(config: LoggerConfig) {
    let filt = tracing_subscriber::EnvFilter::from_default_env();

    let stdout_sub = tracing_subscriber::fmt::layer()
        .compact()
        .event_format(
            tracing_subscriber::fmt::format()
                .with_file(config.with_file)
                .with_line_number(config.with_line_number),
        )
        .with_filter(filt);

    if tracing_subscriber::registry()
        .with(stdout_sub)
        .try_init()
        .is_err()
    {
        return;
    }

    info!(whoami = %config.whoami, "logging started");
}

/// Gets the service label from the standard envvar, which should be included
/// in the whoami string.
pub fn get_service_label_from_env() -> Option<String> {
    env::var(SVC_LABEL_ENVVAR).ok()
}

/// Computes a standard whoami string.
pub fn get_whoami_string(base: &str) -> String {
    match get_service_label_from_env() {
        Some(label) => format!("{base}%{label}"),
        None => base.to_owned(),
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name).is_ok_and(|v| v == "1")
}
