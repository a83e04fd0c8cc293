//! Integration tests for the dsync binary.
//!
//! These tests run the real binary against a bare repository on local disk.

mod support;

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use support::TestRemote;

/// Get a command for running dsync.
fn dsync() -> Command {
    let mut cmd = Command::cargo_bin("dsync").unwrap();
    cmd.env_remove("DASHSYNC_CONFIG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_commands() {
    dsync()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("snapshot"))
        .stdout(predicate::str::contains("head"));
}

#[test]
fn version_flag_works() {
    dsync()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dsync"));
}

#[test]
fn missing_config_fails_with_exit_code_1() {
    let dir = TempDir::new().unwrap();
    dsync()
        .args(["--config"])
        .arg(dir.path().join("absent.toml"))
        .arg("head")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to load config"));
}

#[test]
fn snapshot_prints_json() {
    let remote = TestRemote::new();
    let config = remote.write_config();

    let output = dsync()
        .arg("--config")
        .arg(&config)
        .arg("snapshot")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["team"]["cpu.json"], "{\"cpu\":1}");
    assert!(json.get("README.md").is_none());
}

#[test]
fn head_prints_remote_tip() {
    let remote = TestRemote::new();
    let config = remote.write_config();

    dsync()
        .arg("--config")
        .arg(&config)
        .args(["head", "--id-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains(remote.head().to_string()));
}

#[test]
fn head_prints_summary() {
    let remote = TestRemote::new();
    let config = remote.write_config();

    dsync()
        .arg("--config")
        .arg(&config)
        .arg("head")
        .assert()
        .success()
        .stdout(predicate::str::contains("seed"))
        .stdout(predicate::str::contains("Author: Fixture"));
}

#[test]
fn sync_pushes_source_directory() {
    let remote = TestRemote::new();
    let config = remote.write_config();
    let source = TempDir::new().unwrap();
    fs::create_dir_all(source.path().join("ops")).unwrap();
    fs::write(source.path().join("ops/disk.json"), "[1,2]").unwrap();

    dsync()
        .arg("--config")
        .arg(&config)
        .arg("sync")
        .arg("--source")
        .arg(source.path())
        .args(["--tag", "v9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("with tag <v9>"))
        .stdout(predicate::str::contains("Pushed main"));

    assert_eq!(remote.read("ops/disk.json").unwrap(), b"[1,2]");
    assert!(remote.head_message().contains("<v9>"));
}

#[test]
fn sync_of_unchanged_content_does_not_push() {
    let remote = TestRemote::new();
    let config = remote.write_config();
    let before = remote.head();
    let source = TempDir::new().unwrap();
    fs::create_dir_all(source.path().join("team")).unwrap();
    fs::write(source.path().join("team/cpu.json"), "{\"cpu\":1}").unwrap();

    dsync()
        .arg("--config")
        .arg(&config)
        .arg("sync")
        .arg("--source")
        .arg(source.path())
        .args(["--tag", "v1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to commit"));

    assert_eq!(remote.head(), before);
}

#[test]
fn sync_with_empty_source_fails() {
    let remote = TestRemote::new();
    let config = remote.write_config();
    let source = TempDir::new().unwrap();

    dsync()
        .arg("--config")
        .arg(&config)
        .arg("sync")
        .arg("--source")
        .arg(source.path())
        .args(["--tag", "v1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no files found"));
}

#[test]
fn json_logs_go_to_stderr() {
    let remote = TestRemote::new();
    let config = remote.write_config();

    dsync()
        .arg("--config")
        .arg(&config)
        .args(["--log-json", "snapshot"])
        .assert()
        .success()
        .stderr(predicate::str::contains("\"repo cloned\""));
}
