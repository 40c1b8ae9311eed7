//! Integration tests for the sky-post CLI

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_describes_tool() {
    let mut cmd = Command::cargo_bin("sky-post").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Post content to a Bluesky account"))
        .stdout(predicate::str::contains("--format"));
}

#[test]
fn test_version_flag() {
    let mut cmd = Command::cargo_bin("sky-post").unwrap();
    cmd.arg("--version").assert().success();
}

#[test]
fn test_empty_content_rejected() {
    let mut cmd = Command::cargo_bin("sky-post").unwrap();
    cmd.arg("")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("empty"));
}

#[test]
fn test_whitespace_content_rejected() {
    let mut cmd = Command::cargo_bin("sky-post").unwrap();
    cmd.arg("   \n")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("empty"));
}

#[test]
fn test_empty_stdin_rejected() {
    let mut cmd = Command::cargo_bin("sky-post").unwrap();
    cmd.write_stdin("")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("empty"));
}

#[test]
fn test_missing_config_fails_before_posting() {
    let mut cmd = Command::cargo_bin("sky-post").unwrap();
    cmd.env("SKYMIRROR_CONFIG", "/nonexistent/skymirror/config.toml")
        .arg("hello world")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}
