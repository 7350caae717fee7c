// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Courier gateway.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Courier configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CourierConfig {
    /// HTTP listener and auth settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Dispatch queue pacing and history settings.
    #[serde(default)]
    pub queue: QueueConfig,

    /// Chat-session sidecar settings.
    #[serde(default)]
    pub bridge: BridgeConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CourierConfig {
    /// Renders the configuration as TOML with secrets replaced.
    pub fn to_redacted_toml(&self) -> Result<String, toml::ser::Error> {
        let mut redacted = self.clone();
        if redacted.server.bearer_token.is_some() {
            redacted.server.bearer_token = Some(REDACTED.to_string());
        }
        if redacted.bridge.token.is_some() {
            redacted.bridge.token = Some(REDACTED.to_string());
        }
        toml::to_string_pretty(&redacted)
    }
}

const REDACTED: &str = "[redacted]";

/// HTTP listener configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Static bearer token required by the send and session endpoints.
    /// `None` makes every protected route reject requests.
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Per-request timeout applied by the HTTP layer.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| REDACTED))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Dispatch queue configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    /// Lower bound of the randomized pause between two deliveries.
    #[serde(default = "default_min_delay_secs")]
    pub min_delay_secs: u64,

    /// Upper bound of the randomized pause between two deliveries.
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,

    /// Lower bound of the simulated typing pause before a text send.
    #[serde(default = "default_typing_delay_min_ms")]
    pub typing_delay_min_ms: u64,

    /// Upper bound of the simulated typing pause before a text send.
    #[serde(default = "default_typing_delay_max_ms")]
    pub typing_delay_max_ms: u64,

    /// Maximum number of delivery records kept in memory.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Timeout for downloading image payloads.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl QueueConfig {
    pub fn min_delay(&self) -> Duration {
        Duration::from_secs(self.min_delay_secs)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_secs(self.max_delay_secs)
    }

    pub fn typing_delay_min(&self) -> Duration {
        Duration::from_millis(self.typing_delay_min_ms)
    }

    pub fn typing_delay_max(&self) -> Duration {
        Duration::from_millis(self.typing_delay_max_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            min_delay_secs: default_min_delay_secs(),
            max_delay_secs: default_max_delay_secs(),
            typing_delay_min_ms: default_typing_delay_min_ms(),
            typing_delay_max_ms: default_typing_delay_max_ms(),
            history_capacity: default_history_capacity(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

fn default_min_delay_secs() -> u64 {
    60
}

fn default_max_delay_secs() -> u64 {
    90
}

fn default_typing_delay_min_ms() -> u64 {
    500
}

fn default_typing_delay_max_ms() -> u64 {
    1500
}

fn default_history_capacity() -> usize {
    1000
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

/// Chat-session sidecar configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Base URL of the sidecar HTTP API.
    #[serde(default = "default_bridge_url")]
    pub base_url: String,

    /// Optional bearer token sent to the sidecar.
    #[serde(default)]
    pub token: Option<String>,

    /// Interval between session state polls.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Ceiling for the poll backoff after consecutive failures.
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,

    /// Timeout for a single sidecar request.
    #[serde(default = "default_bridge_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| REDACTED))
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("max_backoff_secs", &self.max_backoff_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_url: default_bridge_url(),
            token: None,
            poll_interval_secs: default_poll_interval_secs(),
            max_backoff_secs: default_max_backoff_secs(),
            request_timeout_secs: default_bridge_request_timeout_secs(),
        }
    }
}

fn default_bridge_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_poll_interval_secs() -> u64 {
    2
}

fn default_max_backoff_secs() -> u64 {
    60
}

fn default_bridge_request_timeout_secs() -> u64 {
    60
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = CourierConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert!(config.server.bearer_token.is_none());
        assert_eq!(config.queue.min_delay(), Duration::from_secs(60));
        assert_eq!(config.queue.max_delay(), Duration::from_secs(90));
        assert_eq!(config.queue.history_capacity, 1000);
        assert_eq!(config.bridge.base_url, "http://127.0.0.1:3000");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut config = CourierConfig::default();
        config.server.bearer_token = Some("s3cret".into());
        config.bridge.token = Some("bridge-s3cret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("[redacted]"));
    }

    #[test]
    fn redacted_toml_hides_tokens() {
        let mut config = CourierConfig::default();
        config.server.bearer_token = Some("s3cret".into());
        let rendered = config.to_redacted_toml().unwrap();
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("[redacted]"));
        assert!(rendered.contains("port = 5000"));
    }
}
