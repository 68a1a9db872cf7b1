//! CLI options interaction tests
//!
//! These run the built binary. Sessions use the simulated transport so no
//! ICMP privileges or network access are needed.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

/// Helper function to create a test command isolated from the caller's
/// environment and any `.env` in the working directory
fn create_test_cmd() -> (Command, TempDir) {
    let workdir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("pingplot").unwrap();
    cmd.current_dir(workdir.path())
        .env_remove("PINGPLOT_HOST")
        .env_remove("PINGPLOT_INTERVAL_MS")
        .env_remove("PINGPLOT_TIMEOUT_MS")
        .env_remove("PINGPLOT_HISTORY_SECONDS")
        .env_remove("ENABLE_COLOR");
    (cmd, workdir)
}

#[test]
fn test_help_lists_options() {
    let (mut cmd, _dir) = create_test_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--host"))
        .stdout(predicate::str::contains("--interval"))
        .stdout(predicate::str::contains("--history"))
        .stdout(predicate::str::contains("--simulate"));
}

#[test]
fn test_version() {
    let (mut cmd, _dir) = create_test_cmd();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_out_of_range_values_rejected() {
    let cases: [&[&str]; 6] = [
        &["--interval", "10001"],
        &["--interval", "-1"],
        &["--history", "0.5"],
        &["--history", "301"],
        &["--timeout", "0"],
        &["--host", "   "],
    ];

    for args in cases {
        let (mut cmd, _dir) = create_test_cmd();
        cmd.args(args).assert().failure();
    }
}

#[test]
fn test_conflicting_color_flags() {
    let (mut cmd, _dir) = create_test_cmd();
    cmd.args(["--color", "--no-color", "--simulate", "--duration", "1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Cannot specify both"));
}

#[test]
fn test_env_help() {
    let (mut cmd, _dir) = create_test_cmd();
    cmd.arg("--env-help")
        .assert()
        .success()
        .stdout(predicate::str::contains("PINGPLOT_HOST"))
        .stdout(predicate::str::contains("PINGPLOT_HISTORY_SECONDS"));
}

#[test]
fn test_write_example_env() {
    let (mut cmd, dir) = create_test_cmd();
    let path = dir.path().join("example.env");
    cmd.arg("--write-example-env").arg(&path).assert().success();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("PINGPLOT_INTERVAL_MS"));
}

#[test]
fn test_simulated_session_prints_readout_and_summary() {
    let (mut cmd, _dir) = create_test_cmd();
    cmd.args(["--simulate", "--no-color", "--host", "192.0.2.1", "--interval", "20", "--duration", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Probing 192.0.2.1 (simulated)"))
        .stdout(predicate::str::contains("Pings per second:"))
        .stdout(predicate::str::contains("Sent "));
}

#[test]
fn test_simulated_session_json_output() {
    let (mut cmd, _dir) = create_test_cmd();
    let output = cmd
        .args(["--simulate", "--format", "json", "--host", "192.0.2.1", "--interval", "20", "--duration", "1"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let events: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(events.first().unwrap()["event"], "session_start");
    assert_eq!(events.last().unwrap()["event"], "summary");
    assert!(events.iter().any(|event| event["event"] == "stats"));
}

#[test]
fn test_unresolvable_host_exit_code() {
    let (mut cmd, _dir) = create_test_cmd();
    cmd.args(["--simulate", "--host", "no.such.host.invalid", "--duration", "1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Resolution"));
}

#[test]
fn test_env_file_in_working_directory_is_used() {
    let (mut cmd, dir) = create_test_cmd();
    fs::write(dir.path().join(".env"), "PINGPLOT_HOST=192.0.2.77\n").unwrap();

    cmd.args(["--simulate", "--no-color", "--duration", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Probing 192.0.2.77"));
}

#[test]
fn test_stdin_commands_adjust_running_session() {
    let workdir = TempDir::new().unwrap();
    assert_cmd::Command::cargo_bin("pingplot")
        .unwrap()
        .current_dir(workdir.path())
        .env_remove("PINGPLOT_HOST")
        .env_remove("ENABLE_COLOR")
        .args(["--simulate", "--no-color", "--host", "192.0.2.1", "--interval", "20", "--duration", "1"])
        .write_stdin("host 192.0.2.9\nhistory 0.5\ninterval fast\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Probing 192.0.2.1 (simulated)"))
        .stdout(predicate::str::contains("Probing 192.0.2.9 (simulated)"))
        .stderr(predicate::str::contains("History must be between"))
        .stderr(predicate::str::contains("Interval must be a whole number"));
}
