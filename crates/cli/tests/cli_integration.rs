//! CLI integration tests for startup behavior.
//!
//! Uses `assert_cmd` to spawn the `storewatch` binary with a controlled
//! environment and verify exit codes and stderr content. Every case here
//! fails (or exits) before the scheduler loop would block.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const ENV_VARS: &[&str] = &[
    "SLACK_WEBHOOK_URL",
    "SLACK_CHANNEL_NAME",
    "POLL_TIME_IN_SECONDS",
    "NOTIFIER_APP_NAME",
    "NUMBER_OF_BUILDS",
    "STOREWATCH_STATE_FILE",
    "BUNDLE_IDENTIFIERS",
    "APP_STORE_SNAPSHOT_URL",
    "APP_STORE_SNAPSHOT_FILE",
    "APP_STORE_SNAPSHOT_TOKEN",
    "GOOGLE_PLAY_PACKAGE_NAMES",
    "PLAY_STORE_SNAPSHOT_URL",
    "PLAY_STORE_SNAPSHOT_FILE",
    "PLAY_STORE_SNAPSHOT_TOKEN",
    "RUST_LOG",
];

/// A `storewatch` command with every configuration variable cleared and the
/// state file pointed into `dir`.
fn storewatch(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("storewatch");
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.env("STOREWATCH_STATE_FILE", dir.path().join("state.db"));
    cmd.current_dir(dir.path());
    cmd
}

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_shows_description_and_flags() {
    let dir = TempDir::new().unwrap();
    storewatch(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("App Store"))
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--status-port"));
}

#[test]
fn version_prints_crate_version() {
    let dir = TempDir::new().unwrap();
    storewatch(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_flag_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    storewatch(&dir).arg("--bogus").assert().failure().code(2);
}

// ──────────────────────────────────────────────
// 2. Configuration failures
// ──────────────────────────────────────────────

#[test]
fn no_platform_configured_exits_1() {
    let dir = TempDir::new().unwrap();
    storewatch(&dir)
        .arg("--dry-run")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("BUNDLE_IDENTIFIERS"));
}

#[test]
fn missing_webhook_without_dry_run_exits_1() {
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("play.json");
    fs::write(&snapshot, r#"{"platform":"play-store","apps":[]}"#).unwrap();
    storewatch(&dir)
        .env("GOOGLE_PLAY_PACKAGE_NAMES", "com.example.app")
        .env("PLAY_STORE_SNAPSHOT_FILE", &snapshot)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("SLACK_WEBHOOK_URL"));
}

#[test]
fn malformed_webhook_exits_1() {
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("play.json");
    fs::write(&snapshot, r#"{"platform":"play-store","apps":[]}"#).unwrap();
    storewatch(&dir)
        .env("SLACK_WEBHOOK_URL", "not a url")
        .env("GOOGLE_PLAY_PACKAGE_NAMES", "com.example.app")
        .env("PLAY_STORE_SNAPSHOT_FILE", &snapshot)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("webhook"));
}

#[test]
fn invalid_package_name_exits_1() {
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("play.json");
    fs::write(&snapshot, r#"{"platform":"play-store","apps":[]}"#).unwrap();
    storewatch(&dir)
        .arg("--dry-run")
        .env("GOOGLE_PLAY_PACKAGE_NAMES", "1invalid")
        .env("PLAY_STORE_SNAPSHOT_FILE", &snapshot)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not a valid package name"));
}

#[test]
fn missing_snapshot_file_exits_1() {
    let dir = TempDir::new().unwrap();
    storewatch(&dir)
        .arg("--dry-run")
        .env("BUNDLE_IDENTIFIERS", "com.example.app")
        .env("APP_STORE_SNAPSHOT_FILE", dir.path().join("absent.json"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("file does not exist"));
}

#[test]
fn zero_poll_interval_exits_1() {
    let dir = TempDir::new().unwrap();
    storewatch(&dir)
        .arg("--dry-run")
        .env("POLL_TIME_IN_SECONDS", "0")
        .env("BUNDLE_IDENTIFIERS", "com.example.app")
        .env("APP_STORE_SNAPSHOT_FILE", "app.json")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("POLL_TIME_IN_SECONDS"));
}
