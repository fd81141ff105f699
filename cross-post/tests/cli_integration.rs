//! CLI integration tests for cross-post
//!
//! Every command runs with a cleared environment from an empty temp dir so
//! neither the developer's shell nor a stray `.env` leaks credentials in.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Command with no inherited environment, run from an empty directory
fn cross_post(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cross-post").unwrap();
    cmd.env_clear().current_dir(dir.path());
    cmd
}

#[test]
fn test_help_lists_platform_flags() {
    let dir = TempDir::new().unwrap();

    cross_post(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--twitter"))
        .stdout(predicate::str::contains("--mastodon"))
        .stdout(predicate::str::contains("--threads"))
        .stdout(predicate::str::contains("--bluesky"))
        .stdout(predicate::str::contains("--nostr"))
        .stdout(predicate::str::contains("--all"));
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();

    cross_post(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cross-post"));
}

#[test]
fn test_no_flags_is_usage_error() {
    let dir = TempDir::new().unwrap();

    cross_post(&dir)
        .arg("Hello")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("At least one flag is required"));
}

#[test]
fn test_flag_without_message_is_usage_error() {
    let dir = TempDir::new().unwrap();

    cross_post(&dir)
        .arg("--mastodon")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Please provide a message"));
}

#[test]
fn test_unconfigured_platform_reports_false() {
    let dir = TempDir::new().unwrap();

    cross_post(&dir)
        .args(["--twitter", "Hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("twitter: false"));
}

#[test]
fn test_threads_is_attempted_and_reports_false() {
    let dir = TempDir::new().unwrap();

    cross_post(&dir)
        .args(["--threads", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("threads: false"))
        .stderr(predicate::str::contains("Threads posting failed"));
}

#[test]
fn test_bad_nostr_key_reports_full_outcome() {
    let dir = TempDir::new().unwrap();

    cross_post(&dir)
        .env("NOSTR_PRIVATE_KEY", "garbage")
        .args(["--noster", "hi", "there"])
        .assert()
        .success()
        .stdout(predicate::eq(
            "{ twitter: false, mastodon: false, threads: false, bluesky: false, nostr: false }\n",
        ))
        .stderr(predicate::str::contains("Nostr posting failed"));
}

#[test]
fn test_json_output() {
    let dir = TempDir::new().unwrap();

    let output = cross_post(&dir)
        .args(["--all", "--format", "json", "Hello"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let outcome: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    for name in ["twitter", "mastodon", "threads", "bluesky", "nostr"] {
        assert_eq!(outcome[name], serde_json::Value::Bool(false), "{}", name);
    }
}

#[test]
fn test_env_file_supplies_credentials() {
    let dir = TempDir::new().unwrap();
    let env_path = dir.path().join("creds.env");
    fs::write(&env_path, "NOSTR_PRIVATE_KEY=garbage\n").unwrap();

    cross_post(&dir)
        .arg("--env-file")
        .arg(&env_path)
        .args(["--nostr", "-v", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nostr: false"))
        .stderr(predicate::str::contains("Nostr posting failed"))
        .stderr(predicate::str::contains("not configured").not());
}

#[test]
fn test_dotenv_in_working_directory_is_loaded() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".env"), "NOSTR_PRIVATE_KEY=garbage\n").unwrap();

    // A configured handle is attempted; an unconfigured one is only skipped
    cross_post(&dir)
        .env("CROSSCAST_LOG_LEVEL", "info")
        .args(["--nostr", "--twitter", "hello"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Posting to platform: nostr"))
        .stderr(predicate::str::contains("Twitter requested but not configured"));
}

#[test]
fn test_env_file_values_win_over_process_environment() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".env"), "BLUESKY_EMAIL=from-dotenv\n").unwrap();

    // Login against a closed port fails fast; the session log names the identifier
    cross_post(&dir)
        .env("BLUESKY_EMAIL", "from-process")
        .env("BLUESKY_PASSWORD", "app-password")
        .env("BLUESKY_SERVICE", "http://127.0.0.1:1")
        .args(["--bluesky", "-v", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bluesky: false"))
        .stderr(predicate::str::contains("Creating Bluesky session for from-dotenv"))
        .stderr(predicate::str::contains("from-process").not());
}

#[test]
fn test_missing_env_file_is_error() {
    let dir = TempDir::new().unwrap();

    cross_post(&dir)
        .args(["--env-file", "does-not-exist.env", "--mastodon", "Hello"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Error:"));
}
