//! Smoke tests for the skenario CLI
//!
//! Everything here runs without a browser.

#![allow(deprecated)] // Command::cargo_bin
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const ENV_VARS: [&str; 6] = [
    "SKENARIO_CONFIG",
    "SKENARIO_SPEC_PATTERN",
    "SKENARIO_BASE_URL",
    "SKENARIO_LOGIN_IDENTIFIER",
    "SKENARIO_LOGIN_SECRET",
    "SKENARIO_COMMAND_TIMEOUT_MS",
];

/// Get a command for the skenario binary with a clean environment
fn skenario() -> Command {
    let mut cmd = Command::cargo_bin("skenario").expect("skenario binary should exist");
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Project directory populated by `skenario init`
fn initialized_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    skenario()
        .args(["--color", "never", "init"])
        .arg(dir.path())
        .assert()
        .success();
    dir
}

fn config_arg(dir: &Path) -> String {
    dir.join("skenario.yaml").display().to_string()
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    skenario()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_help_flag() {
    skenario()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn test_no_args_fails() {
    skenario().assert().failure();
}

#[test]
fn test_run_help_lists_flags() {
    skenario()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--fail-fast"))
        .stdout(predicate::str::contains("--base-url"))
        .stdout(predicate::str::contains("--filter"));
}

// ============================================================================
// Init
// ============================================================================

#[test]
fn test_init_creates_project() {
    let dir = initialized_project();
    assert!(dir.path().join("skenario.yaml").is_file());
    let scenario = fs::read_to_string(dir.path().join("scenarios/login.yaml")).unwrap();
    assert!(scenario.contains("APPLIKASI BIZ"));
}

#[test]
fn test_init_twice_requires_force() {
    let dir = initialized_project();
    skenario()
        .arg("init")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    skenario()
        .args(["init", "--force"])
        .arg(dir.path())
        .assert()
        .success();
}

// ============================================================================
// Validate / List
// ============================================================================

#[test]
fn test_validate_initialized_project() {
    let dir = initialized_project();
    skenario()
        .args(["validate", "--config", &config_arg(dir.path())])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: 1 scenario file(s), 2 case(s), 12 step(s)"));
}

#[test]
fn test_list_initialized_project() {
    let dir = initialized_project();
    skenario()
        .args(["list", "--config", &config_arg(dir.path())])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skenario Login"))
        .stdout(predicate::str::contains("Visits the login page and logs in [7 step(s)]"))
        .stdout(predicate::str::contains("expects assertion_timeout"));
}

#[test]
fn test_validate_rejects_unknown_variable() {
    let dir = initialized_project();
    fs::write(
        dir.path().join("scenarios/broken.yaml"),
        "scenario: Broken\ncases:\n  - name: typo\n    steps:\n      - type: navigate\n        url: \"${bse_url}\"\n",
    )
    .unwrap();
    skenario()
        .args(["validate", "--config", &config_arg(dir.path())])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bse_url"));
}

#[test]
fn test_validate_missing_config() {
    let dir = TempDir::new().unwrap();
    skenario()
        .args(["validate", "--config", &config_arg(dir.path())])
        .assert()
        .failure()
        .stderr(predicate::str::contains("skenario init"));
}

#[test]
fn test_bad_config_reports_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("skenario.yaml"), "base_url: ftp://nope\n").unwrap();
    skenario()
        .args(["validate", "--config", &config_arg(dir.path())])
        .assert()
        .failure()
        .stderr(predicate::str::contains("base_url"));
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_masks_secret() {
    let dir = initialized_project();
    skenario()
        .args(["config", "--config", &config_arg(dir.path())])
        .assert()
        .success()
        .stdout(predicate::str::contains("********"))
        .stdout(predicate::str::contains("1234").not());
}

#[test]
fn test_config_env_override() {
    let dir = initialized_project();
    skenario()
        .args(["config", "--json", "--config", &config_arg(dir.path())])
        .env("SKENARIO_BASE_URL", "http://localhost:8080/")
        .env("SKENARIO_LOGIN_SECRET", "hunter2")
        .assert()
        .success()
        .stdout(predicate::str::contains("http://localhost:8080/"))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn test_config_without_file_uses_base_url_flag() {
    let dir = TempDir::new().unwrap();
    skenario()
        .args(["config", "--config", &config_arg(dir.path())])
        .args(["--base-url", "https://staging.example/", "--timeout", "2500"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://staging.example/"))
        .stdout(predicate::str::contains("2500"));
}
