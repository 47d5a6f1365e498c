/// CLI binary integration tests using assert_cmd
///
/// These tests invoke the actual binary and verify command-line behavior
mod common;

use std::process::Command;

use assert_cmd::prelude::*;
use common::{ExportDirBuilder, TranscriptBuilder, write_transcript};
use predicates::prelude::*;
use tempfile::TempDir;

fn cli(cache_dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_chat-export-explorer"));
    cmd.env("CHAT_EXPORT_CACHE_DIR", cache_dir.path()).env_remove("RUST_LOG");
    cmd
}

fn sample_export() -> TempDir {
    let transcript = TranscriptBuilder::new()
        .message("Alice", "Hello")
        .line("How are you?")
        .message("Bob", "IMG_001.jpg (file attached)")
        .message("Alice", "View once secret")
        .build();
    ExportDirBuilder::new()
        .with_transcript(&transcript)
        .with_file("IMG_001.jpg", &[0xff, 0xd8])
        .build()
}

#[test]
fn test_cli_parse_text_output() {
    let cache = TempDir::new().unwrap();
    let export = sample_export();

    cli(&cache)
        .arg("parse")
        .arg(export.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("[2023-05-13 10:00:00] Alice:"))
        .stdout(predicate::str::contains("    How are you?"))
        .stdout(predicate::str::contains("Bob: [media]"))
        .stdout(predicate::str::contains("[view once]"));
}

#[test]
fn test_cli_parse_json_output() {
    let cache = TempDir::new().unwrap();
    let export = sample_export();

    let output = cli(&cache)
        .args(["parse", "--format", "json", "--no-cache"])
        .arg(export.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let records: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["sender"], "Alice");
    assert_eq!(records[0]["text"], "Hello\nHow are you?");
    assert!(records[1]["mediaLocator"].as_str().unwrap().starts_with("media://"));
    assert_eq!(records[2]["isEphemeral"], true);
}

#[test]
fn test_cli_parse_with_filter() {
    let cache = TempDir::new().unwrap();
    let export = sample_export();

    cli(&cache)
        .args(["parse", "--filter", "sender:bob OR has:ephemeral"])
        .arg(export.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Bob:"))
        .stdout(predicate::str::contains("View once secret"))
        .stdout(predicate::str::contains("How are you?").not());
}

#[test]
fn test_cli_invalid_filter_fails() {
    let cache = TempDir::new().unwrap();
    let export = sample_export();

    cli(&cache)
        .args(["parse", "--filter", "has:video"])
        .arg(export.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --filter"));
}

#[test]
fn test_cli_stats_command() {
    let cache = TempDir::new().unwrap();
    let export = sample_export();

    cli(&cache)
        .arg("stats")
        .arg(export.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Chat Export Statistics"))
        .stdout(predicate::str::contains("Total messages: 3"))
        .stdout(predicate::str::contains("With media: 1"))
        .stdout(predicate::str::contains("View once: 1"))
        .stdout(predicate::str::contains("Senders: 2"))
        .stdout(predicate::str::contains("Oldest message: 2023-05-13 10:00:00"));
}

#[test]
fn test_cli_second_run_uses_cache() {
    let cache = TempDir::new().unwrap();
    let export = sample_export();

    cli(&cache).arg("stats").arg(export.path()).assert().success();
    cli(&cache)
        .arg("stats")
        .arg(export.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded from cache"))
        .stdout(predicate::str::contains("With media: 1"));
}

#[test]
fn test_cli_no_cache_flag_writes_nothing() {
    let cache = TempDir::new().unwrap();
    let export = sample_export();

    cli(&cache).args(["stats", "--no-cache"]).arg(export.path()).assert().success();
    assert_eq!(std::fs::read_dir(cache.path()).unwrap().count(), 0);
}

#[test]
fn test_cli_plain_transcript_file() {
    let cache = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    let path = write_transcript(dir.path(), "chat.txt", "[1/2/23, 10:00:00 AM] Alice: Hello\nHow are you?\n");

    cli(&cache)
        .arg("parse")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[2023-02-01 10:00:00] Alice:"))
        .stdout(predicate::str::contains("    Hello\n    How are you?"));
}

#[test]
fn test_cli_missing_transcript_reports_error() {
    let cache = TempDir::new().unwrap();
    let export = ExportDirBuilder::new().with_file("IMG_1.jpg", &[0]).build();

    cli(&cache)
        .arg("parse")
        .arg(export.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No transcript found"));
}

#[test]
fn test_cli_unsupported_source() {
    let cache = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    let path = write_transcript(dir.path(), "export.zip", "PK");

    cli(&cache)
        .arg("parse")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported source"));
}

#[test]
fn test_cli_zero_chunk_lines_rejected() {
    let cache = TempDir::new().unwrap();
    let export = sample_export();

    cli(&cache)
        .args(["parse", "--chunk-lines", "0"])
        .arg(export.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("chunk_lines must be at least 1"));
}

#[test]
fn test_cli_no_command_shows_help_message() {
    let cache = TempDir::new().unwrap();
    cli(&cache).assert().success().stdout(predicate::str::contains("Use --help for usage information"));
}

#[test]
fn test_cli_help_flag() {
    let cache = TempDir::new().unwrap();
    cli(&cache)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Parse and browse exported chat transcripts"))
        .stdout(predicate::str::contains("stats"));
}

#[test]
fn test_cli_version_flag() {
    let cache = TempDir::new().unwrap();
    cli(&cache).arg("--version").assert().success().stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_cli_invalid_command() {
    let cache = TempDir::new().unwrap();
    cli(&cache).arg("invalid-command").assert().failure();
}
