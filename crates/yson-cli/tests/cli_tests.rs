//! Integration tests for the `yson` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise the check, fmt
//! and stats subcommands through the actual binary, including stdin/stdout
//! piping, file I/O, parser limits and error reporting.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn yson() -> Command {
    Command::cargo_bin("yson").unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// check
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn check_valid_stdin() {
    yson()
        .arg("check")
        .write_stdin(r#"{"name":"Yang","age":99}"#)
        .assert()
        .success()
        .stdout("ok\n");
}

#[test]
fn check_valid_file() {
    yson()
        .args(["check", "-i", &fixture("sample.json")])
        .assert()
        .success()
        .stdout("ok\n");
}

#[test]
fn check_rejects_non_json() {
    yson()
        .arg("check")
        .write_stdin("not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON in <stdin>"));
}

#[test]
fn check_rejects_trailing_comma_with_offset() {
    yson()
        .args(["check", "-i", &fixture("invalid.json")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid.json"))
        .stderr(predicate::str::contains("offset 27"));
}

#[test]
fn check_missing_file_fails() {
    yson()
        .args(["check", "-i", "/nonexistent/input.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn max_depth_limits_nesting() {
    yson()
        .args(["--max-depth", "2", "check"])
        .write_stdin("[[1]]")
        .assert()
        .success();

    yson()
        .args(["--max-depth", "2", "check"])
        .write_stdin("[[[1]]]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nesting deeper than 2 levels"));
}

// ─────────────────────────────────────────────────────────────────────────────
// fmt
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn fmt_compacts_stdin() {
    yson()
        .arg("fmt")
        .write_stdin("[ 1 ,\n 2.50 , \"a\\u0041\" , null ]")
        .assert()
        .success()
        .stdout("[1,2.5,\"aA\",null]\n");
}

#[test]
fn fmt_keeps_float_intent() {
    yson()
        .args(["fmt", "-i", &fixture("sample.json")])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""ratio":1.0"#))
        .stdout(predicate::str::contains(r#""age":99"#))
        .stdout(predicate::str::contains(r#""tags":["admin","ops"]"#));
}

#[test]
fn fmt_writes_output_file() {
    let output_path = std::env::temp_dir().join("yson-test-fmt-output.json");
    let _ = std::fs::remove_file(&output_path);

    yson()
        .args(["fmt", "-i", &fixture("sample.json"), "-o"])
        .arg(&output_path)
        .assert()
        .success()
        .stdout("");

    let content = std::fs::read_to_string(&output_path).expect("output file must exist");
    assert!(content.contains(r#""city":"Shanghai""#), "{content}");
    assert!(content.ends_with('\n'));

    let _ = std::fs::remove_file(&output_path);
}

#[test]
fn fmt_output_is_accepted_by_check() {
    let output = yson()
        .args(["fmt", "-i", &fixture("sample.json")])
        .output()
        .unwrap();
    assert!(output.status.success());

    yson()
        .arg("check")
        .write_stdin(output.stdout)
        .assert()
        .success();
}

// ─────────────────────────────────────────────────────────────────────────────
// stats
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn stats_counts_nodes_per_kind() {
    yson()
        .args(["stats", "-i", &fixture("sample.json")])
        .assert()
        .success()
        .stdout(predicate::str::contains("nodes:      11"))
        .stdout(predicate::str::contains("objects:    2"))
        .stdout(predicate::str::contains("arrays:     1"))
        .stdout(predicate::str::contains("strings:    4"))
        .stdout(predicate::str::contains("numbers:    2"))
        .stdout(predicate::str::contains("bools:      1"))
        .stdout(predicate::str::contains("nulls:      1"))
        .stdout(predicate::str::contains("max depth:  2"));
}

#[test]
fn stats_of_a_scalar() {
    yson()
        .arg("stats")
        .write_stdin("42")
        .assert()
        .success()
        .stdout(predicate::str::contains("nodes:      1"))
        .stdout(predicate::str::contains("max depth:  0"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging and usage
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn verbose_logs_go_to_stderr() {
    yson()
        .args(["-v", "check"])
        .env_remove("RUST_LOG")
        .write_stdin("[1,2]")
        .assert()
        .success()
        .stdout("ok\n")
        .stderr(predicate::str::contains("parsing input"));
}

#[test]
fn missing_subcommand_prints_usage() {
    yson()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn version_flag() {
    yson()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("yson "));
}
