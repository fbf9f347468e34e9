//! CLI command integration tests.
//!
//! These tests run the built binary in a scratch directory and check its
//! output, the files it leaves behind, and its exit codes.

#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{TempDir, tempdir};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ntfs-streams").expect("binary is built");
    cmd.current_dir(dir).env("RUST_LOG", "off");
    cmd
}

/// A project directory with a nested file and a temp file.
fn project() -> TempDir {
    let dir = tempdir().expect("Failed to create temp dir");
    fs::create_dir(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src").join("main.rs"), b"fn main() {}\n").unwrap();
    fs::write(dir.path().join("notes.txt"), b"remember").unwrap();
    fs::write(dir.path().join("scratch.tmp"), b"throwaway").unwrap();
    dir
}

// =============================================================================
// Tar / untar
// =============================================================================

#[test]
fn test_tar_untar_cycle() -> TestResult {
    let src = project();

    cmd(src.path())
        .args(["tar", "/e:*.tmp", "backup"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Writing")
                .and(predicate::str::contains("exclude={ *.tmp }"))
                .and(predicate::str::contains("current dir"))
                .and(predicate::str::contains("bytes written in backup.star")),
        );
    let archive = src.path().join("backup.star");
    assert!(archive.exists());

    let out = tempdir()?;
    cmd(out.path())
        .arg("untar")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 directories, 2 files, 0 streams"));

    assert_eq!(fs::read(out.path().join("notes.txt"))?, b"remember");
    assert_eq!(
        fs::read(out.path().join("src").join("main.rs"))?,
        b"fn main() {}\n"
    );
    assert!(!out.path().join("scratch.tmp").exists());
    assert!(!out.path().join("backup.star").exists());
    Ok(())
}

#[test]
fn test_tar_test_mode_writes_nothing() -> TestResult {
    let src = project();
    cmd(src.path())
        .args(["tar", "/t", "dry"])
        .assert()
        .success()
        .stdout(predicate::str::contains(", test").and(predicate::str::contains("notes.txt")));
    assert!(!src.path().join("dry.star").exists());
    Ok(())
}

#[test]
fn test_tar_selected_items() -> TestResult {
    let src = project();
    cmd(src.path())
        .args(["tar", "picked.star", "notes.txt", "missing.txt"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("items={ notes.txt missing.txt }")
                .and(predicate::str::contains("missing.txt")),
        );

    cmd(src.path())
        .args(["untar", "-l", "picked"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 directories, 1 files"));
    Ok(())
}

#[test]
fn test_untar_keeps_existing_files_without_overwrite() -> TestResult {
    let src = project();
    cmd(src.path()).args(["tar", "a"]).assert().success();

    let out = tempdir()?;
    fs::write(out.path().join("notes.txt"), b"local edit")?;
    let archive = src.path().join("a.star");

    cmd(out.path()).arg("untar").arg(&archive).assert().success();
    assert_eq!(fs::read(out.path().join("notes.txt"))?, b"local edit");

    cmd(out.path())
        .arg("untar")
        .arg("/o")
        .arg(&archive)
        .assert()
        .success();
    assert_eq!(fs::read(out.path().join("notes.txt"))?, b"remember");
    Ok(())
}

#[test]
fn test_untar_stream_separator() -> TestResult {
    let src = project();
    fs::write(src.path().join("notes.txt:meta"), b"side")?;
    cmd(src.path()).args(["tar", "s"]).assert().success();

    let out = tempdir()?;
    cmd(out.path())
        .args(["untar", "/f:_"])
        .arg(src.path().join("s.star"))
        .assert()
        .success()
        .stdout(predicate::str::contains("stream separator=_"));

    // Off Windows the colon name is an ordinary file and round-trips as one.
    #[cfg(not(windows))]
    assert_eq!(fs::read(out.path().join("notes.txt:meta"))?, b"side");
    #[cfg(windows)]
    assert_eq!(fs::read(out.path().join("notes.txt_meta"))?, b"side");
    Ok(())
}

// =============================================================================
// Exit codes
// =============================================================================

#[test]
fn test_help_exits_zero() {
    let dir = tempdir().unwrap();
    cmd(dir.path())
        .arg("/?")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_bad_block_size_is_bad_args() {
    let src = project();
    cmd(src.path())
        .args(["tar", "/b:10X", "out"])
        .assert()
        .code(255)
        .stderr(predicate::str::contains("Invalid block size"));
    assert!(!src.path().join("out.star").exists());
}

#[test]
fn test_invalid_archive_exit_code() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("junk.star"), b"not an archive").unwrap();
    cmd(dir.path())
        .args(["untar", "junk.star"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_missing_archive_is_io_error() {
    let dir = tempdir().unwrap();
    cmd(dir.path())
        .args(["untar", "nowhere"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("nowhere.star"));
}

#[test]
fn test_unknown_option_is_bad_args() {
    let dir = tempdir().unwrap();
    cmd(dir.path())
        .args(["tar", "--no-such-flag"])
        .assert()
        .code(255);
}

// =============================================================================
// Stream commands
// =============================================================================

#[test]
fn test_copy_type_delete() -> TestResult {
    let dir = tempdir()?;
    fs::write(dir.path().join("a.txt"), b"one\r\ntwo")?;

    cmd(dir.path())
        .args(["copy", "a.txt", "b.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("8 bytes copied from a.txt to b.txt"));
    assert_eq!(fs::read(dir.path().join("b.txt"))?, b"one\r\ntwo");

    cmd(dir.path())
        .args(["type", "b.txt"])
        .assert()
        .success()
        .stdout("one\ntwo\n");

    cmd(dir.path())
        .args(["del", "b.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("b.txt deleted"));
    assert!(!dir.path().join("b.txt").exists());
    Ok(())
}

#[test]
fn test_copy_missing_source() {
    let dir = tempdir().unwrap();
    cmd(dir.path())
        .args(["copy", "nothing.txt", "b.txt"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("nothing.txt"));
}

#[test]
fn test_echo_writes_crlf_lines() -> TestResult {
    let dir = tempdir()?;
    cmd(dir.path())
        .args(["echo", "note.txt"])
        .write_stdin("hello\nworld\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("14 bytes written to note.txt"));
    assert_eq!(fs::read(dir.path().join("note.txt"))?, b"hello\r\nworld\r\n");
    Ok(())
}

// =============================================================================
// Listing and completions
// =============================================================================

#[test]
fn test_dir_lists_every_item() {
    let src = project();
    cmd(src.path())
        .arg("dir")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Directory:")
                .and(predicate::str::contains("<DIR>"))
                .and(predicate::str::contains("notes.txt")),
        );
}

#[test]
fn test_no_arguments_shows_short_help() {
    let src = project();
    cmd(src.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("--help").and(predicate::str::contains("Directory:")));
}

#[test]
fn test_completions() {
    let dir = tempdir().unwrap();
    cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ntfs-streams"));
}
