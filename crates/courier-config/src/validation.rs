// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as ordered delay bounds and well-formed addresses.

use crate::diagnostic::ConfigError;
use crate::model::CourierConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CourierConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let host = config.server.host.trim();
    if host.is_empty() {
        fail("server.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "server.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if config.server.port == 0 {
        fail("server.port must not be 0".to_string());
    }

    if config.server.request_timeout_secs == 0 {
        fail("server.request_timeout_secs must be at least 1".to_string());
    }

    let queue = &config.queue;
    if queue.min_delay_secs > queue.max_delay_secs {
        fail(format!(
            "queue.min_delay_secs ({}) must not exceed queue.max_delay_secs ({})",
            queue.min_delay_secs, queue.max_delay_secs
        ));
    }

    if queue.typing_delay_min_ms > queue.typing_delay_max_ms {
        fail(format!(
            "queue.typing_delay_min_ms ({}) must not exceed queue.typing_delay_max_ms ({})",
            queue.typing_delay_min_ms, queue.typing_delay_max_ms
        ));
    }

    if queue.history_capacity == 0 {
        fail("queue.history_capacity must be at least 1".to_string());
    }

    if queue.fetch_timeout_secs == 0 {
        fail("queue.fetch_timeout_secs must be at least 1".to_string());
    }

    let bridge = &config.bridge;
    if !(bridge.base_url.starts_with("http://") || bridge.base_url.starts_with("https://")) {
        fail(format!(
            "bridge.base_url `{}` must start with http:// or https://",
            bridge.base_url
        ));
    }

    if bridge.poll_interval_secs == 0 {
        fail("bridge.poll_interval_secs must be at least 1".to_string());
    }

    if bridge.max_backoff_secs < bridge.poll_interval_secs {
        fail(format!(
            "bridge.max_backoff_secs ({}) must be at least bridge.poll_interval_secs ({})",
            bridge.max_backoff_secs, bridge.poll_interval_secs
        ));
    }

    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        fail(format!(
            "logging.level `{}` must be one of: {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
