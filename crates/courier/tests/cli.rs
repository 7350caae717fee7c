// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `courier check-config` end to end.

use std::io::Write;
use std::process::{Command, Output};

fn check_config(toml: &str) -> Output {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(toml.as_bytes()).unwrap();

    Command::new(env!("CARGO_BIN_EXE_courier"))
        .arg("check-config")
        .arg("--config")
        .arg(file.path())
        .env_clear()
        .output()
        .unwrap()
}

#[test]
fn prints_effective_config_with_secrets_redacted() {
    let output = check_config(
        r#"
        [server]
        port = 5055
        bearer_token = "super-secret"

        [bridge]
        token = "bridge-secret"
        "#,
    );

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("port = 5055"), "{stdout}");
    assert!(stdout.contains("[redacted]"), "{stdout}");
    assert!(!stdout.contains("super-secret"));
    assert!(!stdout.contains("bridge-secret"));
}

#[test]
fn invalid_values_exit_with_failure() {
    let output = check_config(
        r#"
        [queue]
        min_delay_secs = 90
        max_delay_secs = 60
        "#,
    );
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn unknown_keys_exit_with_failure() {
    let output = check_config(
        r#"
        [server]
        prot = 5000
        "#,
    );
    assert!(!output.status.success());
}
