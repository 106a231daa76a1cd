//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend scoring service connection settings.
    pub backend: BackendConfig,

    /// Confirmation polling settings.
    pub polling: PollingConfig,

    /// Block explorer used for link targets.
    pub explorer: ExplorerConfig,

    /// Batch upload and result table settings.
    pub batch: BatchConfig,

    /// Login gate credentials.
    pub auth: AuthConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Backend connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL every request path is joined onto.
    pub base_url: String,

    /// Timeout for submission-class calls (single check, batch upload) in seconds.
    pub submit_timeout_secs: u64,

    /// Timeout for a single status poll in seconds.
    pub poll_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5001".to_string(),
            submit_timeout_secs: 300,
            poll_timeout_secs: 10,
        }
    }
}

impl BackendConfig {
    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }
}

/// Confirmation polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Delay between two status polls in milliseconds.
    pub interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_ms: 5000 }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Block explorer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Prefix the chain reference is appended to (e.g. "https://sepolia.etherscan.io/tx/").
    pub tx_url_base: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            tx_url_base: "https://sepolia.etherscan.io/tx/".to_string(),
        }
    }
}

/// Batch workflow configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchConfig {
    /// How long the "copied" indicator stays on a row, in milliseconds.
    pub copy_indicator_ms: u64,

    /// Number of hash characters shown before the ellipsis.
    pub hash_preview_chars: usize,

    /// Program (argv) that receives copied text on stdin.
    /// When unset, a platform default is detected.
    pub clipboard_command: Option<Vec<String>>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            copy_indicator_ms: 1200,
            hash_preview_chars: 5,
            clipboard_command: None,
        }
    }
}

impl BatchConfig {
    pub fn copy_indicator(&self) -> Duration {
        Duration::from_millis(self.copy_indicator_ms)
    }
}

/// Login gate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            // WARNING: This is a placeholder! Change this in your config file.
            password: "CHANGE_ME".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Development mode: enables request/response diagnostics.
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus scrape endpoint (console mode only).
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            dev_mode: false,
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
