//! CLI behavior that needs no storage service
//!
//! Every case here fails (or finishes) before a request would be sent, so
//! the tests run offline.

use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gsupload"))
        .args(args)
        .env_remove("GSUPLOAD_BUCKET")
        .env_remove("GSUPLOAD_CREDENTIALS")
        .env_remove("GSUPLOAD_ENDPOINT")
        .env_remove("GSUPLOAD_REGION")
        .output()
        .expect("Failed to execute gsupload")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_help_lists_commands() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["file", "dir", "list", "delete", "info", "expire", "completions"] {
        assert!(stdout.contains(command), "missing {command} in help");
    }
    assert!(stdout.contains("--bucket"));
    assert!(stdout.contains("--expiration"));
}

#[test]
fn test_no_command_is_usage_error() {
    let output = run(&[]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_missing_bucket() {
    let output = run(&["list"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("bucket"));
}

#[test]
fn test_file_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.txt");
    let output = run(&["-b", "bucket", "file", missing.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("missing.txt"));
}

#[test]
fn test_file_given_directory() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&["-b", "bucket", "file", dir.path().to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("dir"));
}

#[test]
fn test_dir_given_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("a.txt");
    std::fs::write(&file, "a").unwrap();
    let output = run(&["-b", "bucket", "dir", file.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("not a directory"));
}

#[test]
fn test_expire_rejects_non_positive_days() {
    for days in ["0", "-2"] {
        let output = run(&["-b", "bucket", "expire", "a.txt", days]);
        assert_eq!(output.status.code(), Some(2), "days = {days}");
        assert!(stderr(&output).contains("greater than 0"), "days = {days}");
    }
}

#[test]
fn test_expire_rejects_malformed_days() {
    let output = run(&["-b", "bucket", "expire", "a.txt", "tomorrow"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_unreadable_credentials_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&[
        "-b",
        "bucket",
        "-c",
        dir.path().join("nope.toml").to_str().unwrap(),
        "list",
    ]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_json_error_output() {
    let output = run(&["--json", "list"]);
    assert_eq!(output.status.code(), Some(2));
    let error: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert!(error["error"].as_str().unwrap().contains("bucket"));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_completions_bash() {
    let output = run(&["completions", "bash"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("gsupload"));
}
