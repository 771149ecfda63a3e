// CLI tests: run the wlanalyze binary against the trace fixtures
#![allow(deprecated)] // suppress assert_cmd::Command::cargo_bin deprecation in tests

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const CLIENT: &str = "tests/fixtures/client.log";
const MULTI: &str = "tests/fixtures/multi_connection.log";
const CORRUPT: &str = "tests/fixtures/corrupt.log";

fn wlanalyze() -> Command {
    Command::cargo_bin("wlanalyze").unwrap()
}

#[test]
fn test_requires_logfile() {
    wlanalyze().assert().failure();
}

#[test]
fn test_text_output() {
    wlanalyze()
        .arg(CLIENT)
        .assert()
        .success()
        .stdout(predicate::str::contains("-> wl_display#1 [1]"))
        .stdout(predicate::str::contains("wl_callback#6 [2]"))
        .stdout(predicate::str::contains("3712'345.101"));
}

#[test]
fn test_filter_expression() {
    let output = wlanalyze()
        .arg("-e")
        .arg("method=commit")
        .arg(CLIENT)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 2);
    assert!(stdout.lines().all(|line| line.contains("commit()")));
}

#[test]
fn test_invalid_filter_expression() {
    wlanalyze()
        .arg("-e")
        .arg("colour=blue")
        .arg(CLIENT)
        .assert()
        .failure()
        .stderr(predicate::str::contains("colour"));
}

#[test]
fn test_corrupt_trace_fails_with_line() {
    wlanalyze()
        .arg(CORRUPT)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 3"))
        .stderr(predicate::str::contains("destroy for unknown object #5"));
}

#[test]
fn test_missing_file() {
    wlanalyze()
        .arg("/nonexistent/trace.log")
        .assert()
        .failure()
        .stderr(predicate::str::contains("/nonexistent/trace.log"));
}

#[test]
fn test_stdin_input() {
    let trace = fs::read_to_string(CLIENT).unwrap();
    wlanalyze()
        .arg("-")
        .write_stdin(trace)
        .assert()
        .success()
        .stdout(predicate::str::contains("wl_compositor#4 [1]"));
}

#[test]
fn test_json_output() {
    let output = wlanalyze()
        .arg("--format")
        .arg("json")
        .arg(MULTI)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["format"], "wlanalyze-json-v1");
    assert_eq!(json["summary"]["total_messages"], 8);
    assert_eq!(json["messages"][0]["connection"], "client-a");
    assert_eq!(json["messages"][7]["created"][0]["generation"], 2);
}

#[test]
fn test_csv_output() {
    wlanalyze()
        .arg("--format")
        .arg("csv")
        .arg("-e")
        .arg("conn=client-b")
        .arg(MULTI)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("line,time,time_delta,"))
        .stdout(predicate::str::contains("client-b").count(2));
}

#[test]
fn test_summary_mode() {
    wlanalyze()
        .arg("-c")
        .arg(CLIENT)
        .assert()
        .success()
        .stdout(predicate::str::contains("% calls"))
        .stdout(predicate::str::contains("wl_display.delete_id"))
        .stdout(predicate::str::contains("total"));
}

#[test]
fn test_sort_reverse_time() {
    let output = wlanalyze()
        .arg("-s")
        .arg("time")
        .arg("--reverse")
        .arg(CLIENT)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let first = stdout.lines().next().unwrap();
    assert!(first.contains("3712'379.205"));
}

#[test]
fn test_stats_flag() {
    wlanalyze()
        .arg("--stats")
        .arg(CLIENT)
        .assert()
        .success()
        .stdout(predicate::str::contains("Time Δ median:"));
}

#[test]
fn test_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("wlanalyze.toml");
    fs::write(&config, "filters = [\"class=wl_callback\"]\nformat = \"csv\"\n").unwrap();

    let output = wlanalyze()
        .arg("--config")
        .arg(&config)
        .arg(CLIENT)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    // header plus three callback done events
    assert_eq!(stdout.lines().count(), 4);
}

#[test]
fn test_invalid_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "sort = \"colour\"\n").unwrap();

    wlanalyze()
        .arg("--config")
        .arg(&config)
        .arg(CLIENT)
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad.toml"));
}

#[test]
fn test_multiple_logfiles_get_headers() {
    wlanalyze()
        .arg(CLIENT)
        .arg(MULTI)
        .assert()
        .success()
        .stdout(predicate::str::contains("==> tests/fixtures/client.log <=="))
        .stdout(predicate::str::contains("==> tests/fixtures/multi_connection.log <=="));
}
