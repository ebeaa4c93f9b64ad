//! CLI integration tests
//!
//! Tests the cw-probe CLI using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;

fn cw_probe() -> Command {
    Command::cargo_bin("cw-probe")
        .expect("Failed to locate cw-probe binary - ensure it's built before running tests")
}

#[test]
fn test_cli_help() {
    cw_probe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("cw-probe"))
        .stdout(predicate::str::contains("Headless probe for remote console windows"));
}

#[test]
fn test_cli_version() {
    cw_probe()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cw-probe"));
}

#[test]
fn test_cli_connect_help() {
    cw_probe()
        .args(["connect", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--connection-id"))
        .stdout(predicate::str::contains("--viewport"));
}

#[test]
fn test_cli_requires_subcommand() {
    cw_probe().assert().failure();
}

#[test]
fn test_connect_requires_connection_id() {
    cw_probe()
        .args(["connect", "https://gw.example.com/console"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--connection-id"));
}

#[test]
fn test_connect_rejects_bad_viewport() {
    cw_probe()
        .args([
            "connect",
            "https://gw.example.com/console",
            "-i",
            "abc",
            "--viewport",
            "huge",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("WIDTHxHEIGHT"));
}

#[test]
fn test_connect_rejects_bad_url() {
    let dir = tempfile::tempdir().unwrap();
    cw_probe()
        .args(["connect", "not-a-url", "-i", "abc", "--layouts"])
        .arg(dir.path().join("layouts.json"))
        .env_remove("CW_TOKEN")
        .env_remove("CW_USERNAME")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid console URL"));
}

#[test]
fn test_config_path_honors_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("probe.toml");

    cw_probe()
        .args(["config", "path", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("probe.toml"));
}

#[test]
fn test_config_init_then_get() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    cw_probe()
        .args(["config", "init", "--config"])
        .arg(&path)
        .assert()
        .success();
    assert!(path.exists());

    cw_probe()
        .args(["config", "get", "retry.max_retries", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::diff("3\n"));

    cw_probe()
        .args(["config", "get", "tunnel.data_source", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::diff("postgresql\n"));
}

#[test]
fn test_config_get_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[retry]\nmax_retries = 5\n").unwrap();

    cw_probe()
        .args(["config", "get", "retry.max_retries", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::diff("5\n"));

    cw_probe()
        .args(["config", "get", "retry.nonexistent", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Key not found"));
}

#[test]
fn test_config_show_rejects_invalid_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is = = not toml").unwrap();

    cw_probe()
        .args(["config", "show", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn test_explicit_missing_config_fails() {
    let dir = tempfile::tempdir().unwrap();

    cw_probe()
        .args(["config", "show", "--config"])
        .arg(dir.path().join("absent.toml"))
        .assert()
        .failure();
}
