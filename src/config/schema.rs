//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the fan-out proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Fan-out and race settings.
    pub fanout: FanoutConfig,

    /// Administrative endpoint settings.
    pub admin: AdminConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Fan-out configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FanoutConfig {
    /// Timeout applied independently to every backend attempt, in milliseconds.
    pub attempt_timeout_ms: u64,

    /// Upper bound for the buffered request body that is replicated to backends.
    pub max_body_bytes: usize,

    /// Abort still-running attempts once a winner has been selected.
    pub cancel_losers: bool,

    /// Maximum number of bytes read from a losing response before it is closed.
    pub drain_limit_bytes: usize,

    /// Maximum time spent draining a losing response, in milliseconds.
    pub drain_timeout_ms: u64,

    /// Longest pause allowed between chunks of the relayed winning body, in milliseconds.
    pub relay_idle_timeout_ms: u64,
}

impl FanoutConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }

    pub fn relay_idle_timeout(&self) -> Duration {
        Duration::from_millis(self.relay_idle_timeout_ms)
    }
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            attempt_timeout_ms: 5_000,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
            cancel_losers: false,
            drain_limit_bytes: 64 * 1024,
            drain_timeout_ms: 1_000,
            relay_idle_timeout_ms: 30_000,
        }
    }
}

/// Administrative endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Reserved path of the backend update endpoint.
    pub update_path: String,

    /// Optional API key; when set, updates require `Authorization: Bearer <key>`.
    pub api_key: Option<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            update_path: "/-update-backends".to_string(),
            api_key: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Log output format: "text" or "json".
    pub log_format: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
