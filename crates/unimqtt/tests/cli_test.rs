//! Integration tests for the `unimqtt` binary.
//!
//! Everything here fails or exits before any network I/O.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command with all `UNIMQTT_*` variables cleared and the config
/// directory pointed somewhere empty.
fn unimqtt_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("unimqtt");
    cmd.env("HOME", "/tmp/unimqtt-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/unimqtt-cli-test-nonexistent")
        .env_remove("RUST_LOG");
    for key in [
        "NAME",
        "MQTT_URL",
        "UNIFI_HOST",
        "UNIFI_PORT",
        "UNIFI_USER",
        "UNIFI_PASSWORD",
        "UNIFI_SITE",
        "INSECURE",
        "VERBOSITY",
        "TIMEOUT",
        "CONFIG",
    ] {
        cmd.env_remove(format!("UNIMQTT_{key}"));
    }
    cmd
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    unimqtt_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("MQTT")
            .and(predicate::str::contains("--mqtt-url"))
            .and(predicate::str::contains("--unifi-host"))
            .and(predicate::str::contains("--insecure")),
    );
}

#[test]
fn test_version_flag() {
    unimqtt_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("unimqtt"));
}

#[test]
fn test_unknown_flag_is_usage_error() {
    unimqtt_cmd().arg("--bogus").assert().code(2);
}

// ── Startup validation ──────────────────────────────────────────────

#[test]
fn test_bad_mqtt_scheme_rejected() {
    unimqtt_cmd()
        .args(["-u", "http://broker", "-s", "pw"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("mqtt_url"));
}

#[test]
fn test_bad_verbosity_rejected() {
    unimqtt_cmd()
        .args(["-v", "unimqtt=loud", "-s", "pw"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("verbosity"));
}

#[test]
fn test_unreadable_config_file_rejected() {
    let dir = std::env::temp_dir().join("unimqtt-cli-test-bad-config");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.toml");
    std::fs::write(&path, "unifi_port = \"not a port\"\n").unwrap();

    unimqtt_cmd()
        .arg("--config")
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unifi_port"));
}
