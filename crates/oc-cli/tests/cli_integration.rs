//! CLI integration tests
//!
//! Exercises argument parsing and help output with assert_cmd; calls that
//! need a daemon are covered by the client crate's integration suite.

use assert_cmd::Command;
use predicates::prelude::*;

fn opencore() -> Command {
    Command::cargo_bin("opencore")
        .expect("Failed to locate opencore binary - ensure it's built before running tests")
}

#[test]
fn test_cli_help() {
    opencore()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("opencore"))
        .stdout(predicate::str::contains("OpenCORE management client"));
}

#[test]
fn test_cli_version() {
    opencore()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("opencore"));
}

#[test]
fn test_cli_records_help() {
    opencore()
        .args(["records", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("class"));
}

#[test]
fn test_cli_create_help() {
    opencore()
        .args(["create", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("JSON"));
}

#[test]
fn test_cli_requires_subcommand() {
    opencore().assert().failure();
}

#[test]
fn test_cli_rejects_unknown_subcommand() {
    opencore().arg("frobnicate").assert().failure();
}

#[test]
fn test_cli_ping_fails_without_daemon() {
    // Point at a socket that cannot exist; the command must fail cleanly
    opencore()
        .args(["--socket", "/nonexistent/opencore.sock", "ping"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Login failed"));
}
