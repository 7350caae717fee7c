// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Courier configuration system.

use courier_config::diagnostic::ConfigError;
use courier_config::{load_and_validate, load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_courier_config() {
    let toml = r#"
[server]
host = "127.0.0.1"
port = 8080
bearer_token = "tok"
request_timeout_secs = 15

[queue]
min_delay_secs = 90
max_delay_secs = 150
typing_delay_min_ms = 100
typing_delay_max_ms = 200
history_capacity = 50
fetch_timeout_secs = 5

[bridge]
base_url = "http://sidecar:3000"
token = "bridge-tok"
poll_interval_secs = 3
max_backoff_secs = 30
request_timeout_secs = 20

[logging]
level = "debug"
"#;

    let config = load_and_validate_str(toml).expect("valid TOML should load");
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.bearer_token.as_deref(), Some("tok"));
    assert_eq!(config.queue.min_delay_secs, 90);
    assert_eq!(config.queue.max_delay_secs, 150);
    assert_eq!(config.queue.history_capacity, 50);
    assert_eq!(config.bridge.base_url, "http://sidecar:3000");
    assert_eq!(config.bridge.token.as_deref(), Some("bridge-tok"));
    assert_eq!(config.bridge.poll_interval_secs, 3);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn partial_toml_keeps_defaults() {
    let config = load_config_from_str("[server]\nport = 9000\n").unwrap();
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.queue.min_delay_secs, 60);
    assert_eq!(config.queue.max_delay_secs, 90);
}

#[test]
fn unknown_key_gets_suggestion() {
    let toml = "[queue]\nmin_dealy_secs = 5\n";
    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "min_dealy_secs");
            assert_eq!(suggestion.as_deref(), Some("min_delay_secs"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[server]\nport = \"eighty\"\n").unwrap_err();
    assert!(matches!(errors[0], ConfigError::InvalidType { .. }));
}

#[test]
fn semantic_errors_surface_after_parse() {
    let toml = "[queue]\nmin_delay_secs = 200\nmax_delay_secs = 100\n";
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

#[test]
fn env_vars_override_files() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "courier.toml",
            "[server]\nport = 7000\nbearer_token = \"from-file\"\n",
        )?;
        jail.set_env("COURIER_SERVER_BEARER_TOKEN", "from-env");
        jail.set_env("COURIER_QUEUE_MAX_DELAY_SECS", "120");

        let config = load_and_validate(None).expect("config should load");
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.server.bearer_token.as_deref(), Some("from-env"));
        assert_eq!(config.queue.max_delay_secs, 120);
        Ok(())
    });
}

#[test]
fn env_vars_reach_every_section() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("COURIER_SERVER_PORT", "7001");
        jail.set_env("COURIER_QUEUE_MIN_DELAY_SECS", "5");
        jail.set_env("COURIER_BRIDGE_TOKEN", "sidecar");
        jail.set_env("COURIER_BRIDGE_POLL_INTERVAL_SECS", "4");
        jail.set_env("COURIER_LOGGING_LEVEL", "debug");

        let config = load_and_validate(None).expect("config should load");
        assert_eq!(config.server.port, 7001);
        assert_eq!(config.queue.min_delay_secs, 5);
        assert_eq!(config.bridge.token.as_deref(), Some("sidecar"));
        assert_eq!(config.bridge.poll_interval_secs, 4);
        assert_eq!(config.logging.level, "debug");
        Ok(())
    });
}

#[test]
fn env_vars_apply_on_top_of_explicit_path() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("custom.toml", "[server]\nport = 7000\n")?;
        jail.set_env("COURIER_SERVER_PORT", "7002");
        let path = jail.directory().join("custom.toml");

        let config = load_and_validate(Some(&path)).expect("config should load");
        assert_eq!(config.server.port, 7002);
        Ok(())
    });
}

#[test]
fn explicit_path_is_used() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("custom.toml", "[logging]\nlevel = \"warn\"\n")?;
        let path = jail.directory().join("custom.toml");

        let config = load_and_validate(Some(&path)).expect("config should load");
        assert_eq!(config.logging.level, "warn");
        Ok(())
    });
}

#[test]
fn unknown_key_in_file_has_span() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("courier.toml", "[bridge]\nbase_ulr = \"http://x\"\n")?;
        let path = jail.directory().join("courier.toml");

        let errors = load_and_validate(Some(&path)).unwrap_err();
        match &errors[0] {
            ConfigError::UnknownKey { span, .. } => assert!(span.is_some()),
            other => panic!("expected UnknownKey, got {other:?}"),
        }
        Ok(())
    });
}
