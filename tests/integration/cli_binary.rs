//! End-to-end tests driving the CLI binary against an isolated data directory

use super::test_utils::write_tree;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(temp_dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cloudflow"))
        .env("XDG_DATA_HOME", temp_dir.path().join("data"))
        .env("XDG_CONFIG_HOME", temp_dir.path().join("config"))
        .env("HOME", temp_dir.path().join("home"))
        .arg("--workspace")
        .arg(temp_dir.path())
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "command failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_add_list_export_across_runs() {
    let temp_dir = TempDir::new().unwrap();
    let drop = temp_dir.path().join("drop");
    write_tree(&drop, &[("notes.txt", b"remember the milk"), ("sub/data.json", b"{}")]);
    let drop_arg = drop.to_string_lossy().into_owned();

    let added = stdout(&run(&temp_dir, &["add", &drop_arg, "--no-enrich"]));
    assert!(added.starts_with("Added 2 files (19 B)"), "{}", added);

    let listing = stdout(&run(&temp_dir, &["list", "--format", "json", "--sort", "size"]));
    let rows: serde_json::Value = serde_json::from_str(&listing).unwrap();
    assert_eq!(rows[0]["name"], "data.json");
    assert_eq!(rows[1]["name"], "notes.txt");
    assert_eq!(rows[1]["size_display"], "17 B");

    let id = rows[1]["id"].as_str().unwrap().to_string();
    let out_dir = temp_dir.path().join("out");
    let out_arg = out_dir.to_string_lossy().into_owned();
    stdout(&run(&temp_dir, &["export", &id, "--output", &out_arg]));
    assert_eq!(
        std::fs::read(out_dir.join("notes.txt")).unwrap(),
        b"remember the milk"
    );

    let usage = stdout(&run(&temp_dir, &["usage", "--format", "json"]));
    let usage: serde_json::Value = serde_json::from_str(&usage).unwrap();
    assert_eq!(usage["used_bytes"], 19);
    assert_eq!(usage["file_count"], 2);
}

#[test]
fn test_unknown_id_fails_with_message() {
    let temp_dir = TempDir::new().unwrap();
    let output = run(&temp_dir, &["describe", "deadbeef"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("matches no entry"), "stderr={}", stderr);
}

#[test]
fn test_clear_with_yes_empties_catalog() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("a.txt");
    std::fs::write(&file, b"a").unwrap();
    let file_arg = file.to_string_lossy().into_owned();

    stdout(&run(&temp_dir, &["add", &file_arg, "--no-enrich"]));
    let cleared = stdout(&run(&temp_dir, &["clear", "--yes"]));
    assert_eq!(cleared.trim(), "Removed 1 entries");
    let listing = stdout(&run(&temp_dir, &["list"]));
    assert_eq!(listing.trim(), "No files stored yet.");
}
