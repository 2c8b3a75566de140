use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Writes `contents` to a fresh scratch file inside a fresh temp directory.
/// The caller must keep the returned `TempDir` alive for as long as the
/// path is used — dropping it removes the directory and its contents.
fn write_script(contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("script.kvazz");
    fs::write(&path, contents).expect("write temp script");
    (dir, path)
}

#[test]
fn exec_runs_hello_world() {
    let (_dir, script) = write_script(r#"function main() { print("hello"); }"#);
    Command::cargo_bin("kvazz")
        .unwrap()
        .arg("exec")
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("hello"));
}

#[test]
fn exec_reports_runtime_errors_non_zero() {
    let (_dir, script) = write_script("function main() { print(1 / 0); }");
    Command::cargo_bin("kvazz")
        .unwrap()
        .arg("exec")
        .arg(&script)
        .assert()
        .failure();
}

#[test]
fn lex_prints_tuple_list() {
    let (_dir, script) = write_script("var x = 1;");
    Command::cargo_bin("kvazz")
        .unwrap()
        .arg("lex")
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"("var", "keyword")"#))
        .stdout(predicate::str::contains(r#"("x", "identifier")"#));
}

#[test]
fn parse_prints_tree() {
    let (_dir, script) = write_script("var x = 1;");
    Command::cargo_bin("kvazz")
        .unwrap()
        .arg("parse")
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("Program"))
        .stdout(predicate::str::contains("Declare x"));
}

#[test]
fn parse_error_exits_non_zero() {
    let (_dir, script) = write_script("var x = ;");
    Command::cargo_bin("kvazz")
        .unwrap()
        .arg("parse")
        .arg(&script)
        .assert()
        .failure();
}

#[test]
fn compile_reports_not_implemented() {
    let (_dir, script) = write_script("var x = 1;");
    Command::cargo_bin("kvazz")
        .unwrap()
        .arg("compile")
        .arg(&script)
        .assert()
        .failure();
}

#[test]
fn unknown_subcommand_prints_usage() {
    Command::cargo_bin("kvazz")
        .unwrap()
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("usage"));
}

#[test]
fn help_exits_zero() {
    Command::cargo_bin("kvazz").unwrap().arg("help").assert().success();
}
