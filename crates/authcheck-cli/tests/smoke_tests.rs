//! Smoke tests for the authcheck CLI

#![allow(deprecated)] // Command::cargo_bin
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the authcheck binary, isolated from CI settings
fn authcheck() -> Command {
    let mut cmd = Command::cargo_bin("authcheck").expect("authcheck binary should exist");
    cmd.env_remove("CI")
        .env_remove("BASE_URL")
        .env_remove("AUTH_EMAIL")
        .env_remove("AUTH_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

/// Empty config file so a stray authcheck.yaml never leaks in
fn empty_config(dir: &TempDir) -> String {
    let path = dir.path().join("authcheck.yaml");
    fs::write(&path, "{}\n").unwrap();
    path.to_string_lossy().into_owned()
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    authcheck()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_help_flag() {
    authcheck()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("test"))
        .stdout(predicate::str::contains("locators"))
        .stdout(predicate::str::contains("email"));
}

#[test]
fn test_no_args_shows_help() {
    authcheck().assert().failure();
}

// ============================================================================
// test
// ============================================================================

#[test]
fn test_all_suites_pass_against_fake_app() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(&dir);
    let out = dir.path().join("results");

    authcheck()
        .args(["--color", "never", "test", "--config", &config, "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Running 6 tests"))
        .stdout(predicate::str::contains("PASS Login flow › Test 1 - Successful login"))
        .stdout(predicate::str::contains("6 passed (6 total)"));

    let report = fs::read_to_string(out.join("report.json")).unwrap();
    assert!(report.contains("Registration flow"));
    assert!(report.contains("\"run_id\""));
}

#[test]
fn test_grep_narrows_run() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(&dir);

    authcheck()
        .args(["--color", "never", "test", "--suite", "login", "--grep", "Test 2", "--config", &config])
        .arg("--output")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 passed (1 total)"));
}

#[test]
fn test_bad_grep_fails() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(&dir);

    authcheck()
        .args(["test", "--grep", "(", "--config", &config])
        .arg("--output")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid grep pattern"));
}

#[test]
fn test_missing_config_file_fails() {
    authcheck()
        .args(["test", "--config", "/nonexistent/authcheck.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_wrong_credentials_fail_with_exit_code_1() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("authcheck.yaml");
    fs::write(&config, "timeouts:\n  expect_ms: 300\n  page_default_ms: 300\n").unwrap();

    authcheck()
        .env("AUTH_PASSWORD", "wrong-password")
        .args(["--color", "never", "test", "--suite", "login", "--grep", "Test 1"])
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FAIL Login flow › Test 1 - Successful login"))
        .stdout(predicate::str::contains("step: Verify logout button after login"));

    assert!(dir
        .path()
        .join("login-flow-test-1-successful-login")
        .join("failure.png")
        .exists());
}

// ============================================================================
// locators / email
// ============================================================================

#[test]
fn test_locators_auth() {
    authcheck()
        .args(["--color", "never", "locators"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("auth\n"))
        .stdout(predicate::str::contains("emailInput"))
        .stdout(predicate::str::contains("errorMessages"));
}

#[test]
fn test_locators_registration_with_js() {
    authcheck()
        .args(["--color", "never", "locators", "--page", "registration", "--js"])
        .assert()
        .success()
        .stdout(predicate::str::contains("industrySelect"))
        .stdout(predicate::str::contains("H.byRole"));
}

#[test]
fn test_email_generation() {
    authcheck()
        .args(["email", "--base", "qa@example.org", "-n", "3"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^(qa\+\d{6}@example\.org\n){3}$").unwrap());
}

#[test]
fn test_email_zero_count_fails() {
    authcheck()
        .args(["email", "-n", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid argument"));
}
