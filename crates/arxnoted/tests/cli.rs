//! Integration tests for the arxnote CLI commands.
//!
//! None of these reach the network: they cover argument handling, the configuration file
//! and failures raised before a query is sent.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

// Helper function to create a clean command instance
fn arxnote() -> Command { Command::cargo_bin("arxnote").unwrap() }

// Helper to get a configuration path inside a temporary directory
fn temp_config() -> (tempfile::TempDir, PathBuf) {
  let dir = tempdir().unwrap();
  let path = dir.path().join("nested").join("config.toml");
  (dir, path)
}

#[test]
fn test_help_lists_commands() {
  arxnote()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("search"))
    .stdout(predicate::str::contains("config"));
}

#[test]
fn test_config_init_and_path() {
  let (dir, path) = temp_config();

  arxnote()
    .args(["config", "init", "--force", "--config"])
    .arg(&path)
    .assert()
    .success()
    .stdout(predicate::str::contains("Wrote default configuration"));
  assert!(path.exists());
  let written = std::fs::read_to_string(&path).unwrap();
  assert!(written.contains("max_results"));

  // Existing file, prompt answered by --accept-defaults
  arxnote()
    .args(["config", "init", "--accept-defaults", "--config"])
    .arg(&path)
    .assert()
    .success()
    .stdout(predicate::str::contains("Wrote default configuration"));

  arxnote()
    .args(["config", "path", "--config"])
    .arg(&path)
    .assert()
    .success()
    .stdout(predicate::str::contains(path.to_string_lossy().as_ref()));

  dir.close().unwrap();
}

#[test]
fn test_search_requires_keywords() {
  arxnote().arg("search").assert().failure();
}

#[test]
fn test_search_rejects_bad_dates() {
  let (dir, path) = temp_config();

  arxnote()
    .args(["search", "llm", "--start", "next week", "--no-translate", "--config"])
    .arg(&path)
    .assert()
    .failure()
    .stderr(predicate::str::contains("Unparseable date expression"));

  dir.close().unwrap();
}

#[test]
fn test_search_rejects_zero_results() {
  let (dir, path) = temp_config();

  arxnote()
    .args(["search", "llm", "-n", "0", "--no-translate", "--config"])
    .arg(&path)
    .assert()
    .failure()
    .stderr(predicate::str::contains("max_results"));

  dir.close().unwrap();
}
