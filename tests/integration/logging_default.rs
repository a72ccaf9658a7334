//! Integration tests for logging defaults of the CLI binary.
//!
//! Logging stays silent unless asked for; when directed to a file it lands there and
//! nowhere else.

use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn cloudflow(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cloudflow"));
    cmd.env("XDG_DATA_HOME", temp_dir.path().join("data"))
        .env("XDG_CONFIG_HOME", temp_dir.path().join("config"))
        .env("HOME", temp_dir.path().join("home"))
        .env_remove("CLOUDFLOW_LOG")
        .arg("--workspace")
        .arg(temp_dir.path());
    cmd
}

#[test]
fn test_no_logs_by_default() {
    let temp_dir = TempDir::new().unwrap();
    let output = cloudflow(&temp_dir).arg("status").output().unwrap();

    assert!(
        output.status.success(),
        "cloudflow status should succeed: stderr={:?}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("CloudFlow CLI starting"), "stderr={}", stderr);
}

#[test]
fn test_verbose_logs_to_requested_file() {
    let temp_dir = TempDir::new().unwrap();
    let log_file = temp_dir.path().join("logs").join("run.log");

    let output = cloudflow(&temp_dir)
        .arg("--verbose")
        .arg("--log-output")
        .arg("file")
        .arg("--log-file")
        .arg(&log_file)
        .arg("status")
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "cloudflow status should succeed: stderr={:?}",
        String::from_utf8_lossy(&output.stderr)
    );
    let contents = fs::read_to_string(&log_file).unwrap();
    assert!(contents.contains("CloudFlow CLI starting"));
    assert!(!String::from_utf8_lossy(&output.stdout).contains("CloudFlow CLI starting"));
}
