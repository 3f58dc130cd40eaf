//! Smoke tests for the todoprobe CLI

#![allow(deprecated)] // Command::cargo_bin
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for the todoprobe binary
fn todoprobe() -> Command {
    let mut cmd = Command::cargo_bin("todoprobe").expect("todoprobe binary should exist");
    cmd.env_remove("TODOPROBE_BROWSER")
        .env_remove("TODOPROBE_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_version_flag() {
    todoprobe()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    todoprobe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("setup"));
}

#[test]
fn test_no_args_fails() {
    todoprobe().assert().failure();
}

#[test]
fn test_run_help() {
    todoprobe()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--browser"))
        .stdout(predicate::str::contains("--headless"))
        .stdout(predicate::str::contains("--fail-fast"));
}

#[test]
fn test_list_prints_catalog() {
    todoprobe()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("TodoMVC-0"))
        .stdout(predicate::str::contains("TodoMVC-13"));
}

#[test]
fn test_unsupported_browser_fails_before_launch() {
    todoprobe()
        .args(["run", "--browser", "safari"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported browser 'safari'"));
}

#[test]
fn test_unsupported_browser_from_env() {
    todoprobe()
        .env("TODOPROBE_BROWSER", "edge")
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported browser 'edge'"));
}

#[test]
fn test_bad_format_rejected() {
    todoprobe()
        .args(["run", "--format", "xml"])
        .assert()
        .failure();
}

#[test]
fn test_setup_creates_directory_and_succeeds() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("webdrivers");
    todoprobe()
        .args(["--color", "never", "setup", "--webdriver-dir"])
        .arg(&dir)
        .env("PATH", "")
        .assert()
        .success()
        .stderr(predicate::str::contains("create driver directory"))
        .stderr(predicate::str::contains("steps need attention"));
    assert!(dir.is_dir());
}
