//! Explorer endpoint configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Public explorer used when no self-hosted node is configured.
pub const DEFAULT_EXPLORER_URL: &str = "https://mempool.space";

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// A self-hosted mempool instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfHostedNode {
    /// Host name or IP address, without scheme.
    pub host: String,

    /// Port; 443 selects https, anything else plain http.
    pub port: u16,
}

/// Where and how to reach the explorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Base URL of the public explorer.
    #[serde(default = "default_url")]
    pub url: String,

    /// Overrides `url` when set.
    #[serde(default)]
    pub self_hosted: Option<SelfHostedNode>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_url() -> String {
    DEFAULT_EXPLORER_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            self_hosted: None,
            timeout: default_timeout(),
        }
    }
}

impl ExplorerConfig {
    /// Uses a self-hosted node instead of the public explorer.
    pub fn with_self_hosted(self, host: impl Into<String>, port: u16) -> Self {
        Self {
            self_hosted: Some(SelfHostedNode {
                host: host.into(),
                port,
            }),
            ..self
        }
    }

    /// Whether a self-hosted node is configured.
    pub fn is_self_hosted(&self) -> bool {
        self.self_hosted.is_some()
    }

    /// Base URL of the REST API, without a trailing slash.
    pub fn api_url(&self) -> String {
        match &self.self_hosted {
            Some(node) => {
                let scheme = if node.port == 443 { "https" } else { "http" };
                format!("{scheme}://{}:{}/api", node.host, node.port)
            }
            None => format!("{}/api", self.url.trim_end_matches('/')),
        }
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}
