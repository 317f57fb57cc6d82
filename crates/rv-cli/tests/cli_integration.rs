//! CLI integration tests
//!
//! Tests the rv CLI using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;

fn rv() -> Command {
    Command::cargo_bin("rv").expect("Failed to locate rv binary - ensure it's built before running tests")
}

#[test]
fn test_cli_help() {
    rv()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("rv"))
        .stdout(predicate::str::contains("rendezvous"));
}

#[test]
fn test_cli_version() {
    rv().arg("--version").assert().success().stdout(predicate::str::contains("rv"));
}

#[test]
fn test_cli_serve_help() {
    rv()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("broker"));
}

#[test]
fn test_cli_agent_help() {
    rv()
        .args(["agent", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--local-port"));
}

#[test]
fn test_cli_proxy_help() {
    rv()
        .args(["proxy", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ProxyCommand"));
}

#[test]
fn test_cli_proxy_missing_node() {
    rv().arg("proxy").assert().failure();
}

#[test]
fn test_cli_proxy_invalid_node_id() {
    rv()
        .args(["proxy", "bad/node", "--server", "127.0.0.1:1"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Invalid node id"));
}

#[test]
fn test_cli_proxy_unreachable_broker() {
    // Port 1 on loopback is closed on any sane test host
    rv()
        .args(["proxy", "n1", "--server", "127.0.0.1:1"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Failed to reach n1"));
}

#[test]
fn test_cli_unknown_command() {
    rv()
        .arg("nonexistent-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_cli_config_path_follows_flag() {
    rv()
        .args(["--config", "/tmp/rv-test/config.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp/rv-test/config.toml"));
}

#[test]
fn test_cli_config_init_and_show() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let path = path.to_str().unwrap();

    rv().args(["--config", path, "config", "init"]).assert().success();

    rv()
        .args(["--config", path, "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bind_address = \"0.0.0.0:8443\""));
}

#[test]
fn test_cli_config_show_rejects_broken_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[broker\n").unwrap();

    rv()
        .args(["--config", path.to_str().unwrap(), "config", "show"])
        .assert()
        .failure();
}

#[test]
fn test_cli_serve_missing_config_file() {
    rv()
        .args(["--config", "/nonexistent/rv/config.toml", "serve"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}
