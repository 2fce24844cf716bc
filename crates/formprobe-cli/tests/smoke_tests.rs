//! Smoke tests for the formprobe binary

#![allow(deprecated)] // Command::cargo_bin
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn formprobe() -> Command {
    let mut cmd = Command::cargo_bin("formprobe").expect("formprobe binary should exist");
    cmd.env_remove("RUST_LOG")
        .env_remove("FORMPROBE_CONFIG")
        .env_remove("REQRES_API_KEY");
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_help_lists_subcommands() {
    formprobe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("form"))
        .stdout(predicate::str::contains("api"))
        .stdout(predicate::str::contains("fixtures"));
}

#[test]
fn test_version_flag() {
    formprobe()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_no_args_fails() {
    formprobe().assert().failure();
}

#[test]
fn test_unknown_scenario_is_rejected() {
    formprobe()
        .args(["form", "--scenario", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

// ============================================================================
// Fixtures and config
// ============================================================================

#[test]
fn test_fixtures_are_reproducible() {
    let run = || {
        formprobe()
            .args(["fixtures", "--seed", "11", "-n", "2"])
            .output()
            .unwrap()
    };
    let first = run();
    let second = run();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);

    let parsed: serde_json::Value = serde_json::from_slice(&first.stdout).unwrap();
    assert_eq!(parsed.as_array().map(Vec::len), Some(2));
}

#[test]
fn test_config_prints_defaults() {
    formprobe()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("form_base_url: https://demoqa.com"));
}

#[test]
fn test_bad_config_file_exits_with_two() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("formprobe.yaml");
    fs::write(&path, "form_base_url: ftp://nowhere\n").unwrap();

    formprobe()
        .args(["--config", path.to_str().unwrap(), "config"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("form_base_url"));
}

// ============================================================================
// Simulated form run
// ============================================================================

#[test]
fn test_simulated_form_run_writes_report() {
    let dir = TempDir::new().unwrap();

    formprobe()
        .args(["-q", "form", "--simulated", "-s", "minimal", "-s", "guard", "--output"])
        .arg(dir.path())
        .assert()
        .success();

    let reports: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    let report = reports
        .iter()
        .find(|n| n.starts_with("form-") && !n.starts_with("form-events-"))
        .expect("report file");
    assert!(reports.iter().any(|n| n.starts_with("form-events-")));

    let text = fs::read_to_string(dir.path().join(report)).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["outcomes"].as_array().map(Vec::len), Some(2));
    assert_eq!(parsed["outcomes"][1]["name"], "guard");
    assert_eq!(parsed["outcomes"][1]["passed"], true);
}
