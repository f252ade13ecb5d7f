//! Integration tests for the solgraph CLI.
//!
//! These tests spawn the compiled `solgraph` binary and validate its behavior
//! through stdout, stderr, exit codes, and the files it writes.
//!
//! ## Test Strategy
//!
//! 1. **Input validation**: missing files, missing arguments, flag dependencies
//! 2. **Building**: every file becomes a source unit
//! 3. **Resolution**: unresolved references are listed and can fail the run
//! 4. **Output**: JSON to stdout and to files
//! 5. **Help and version**: CLI metadata display
//!
//! Test data lives in `tests/test_data/sol/` at the workspace root.

use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use std::process::Command;

/// Resolves `<workspace_root>/tests/test_data/sol/<name>`.
fn example_file(name: &str) -> std::path::PathBuf {
    std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")) // cli/
        .parent()
        .unwrap() // core/
        .parent()
        .unwrap() // workspace root
        .join("tests")
        .join("test_data")
        .join("sol")
        .join(name)
}

fn solgraph() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("solgraph"));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn fails_when_file_missing() {
    let mut cmd = solgraph();
    cmd.arg("this-file-does-not-exist.sol");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("path not found"));
}

#[test]
fn fails_without_paths() {
    solgraph().assert().failure();
}

#[test]
fn fail_on_unresolved_requires_resolve() {
    let mut cmd = solgraph();
    cmd.arg(example_file("Unresolved.sol"))
        .arg("--fail-on-unresolved");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--resolve"));
}

#[test]
fn build_only_succeeds() {
    let mut cmd = solgraph();
    cmd.arg(example_file("Token.sol"));
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Parsed:"))
        .stderr(predicate::str::contains("Token.sol"));
}

#[test]
fn resolves_imports_between_files() {
    let mut cmd = solgraph();
    cmd.arg(example_file("Token.sol"))
        .arg(example_file("Math.sol"))
        .arg("--resolve")
        .arg("--fail-on-unresolved");
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Resolved: 0 unresolved"));
}

#[test]
fn missing_import_is_reported() {
    let mut cmd = solgraph();
    cmd.arg(example_file("Token.sol")).arg("--resolve");
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("unresolved import `./Math.sol`"));
}

#[test]
fn unresolved_names_fail_when_requested() {
    let mut cmd = solgraph();
    cmd.arg(example_file("Unresolved.sol"))
        .arg("--resolve")
        .arg("--fail-on-unresolved");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unresolved identifier `missing`"))
        .stderr(predicate::str::contains("Unresolved.sol:6:"));
}

#[test]
fn unresolved_names_do_not_fail_by_default() {
    let mut cmd = solgraph();
    cmd.arg(example_file("Unresolved.sol")).arg("--resolve");
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Resolved: 1 unresolved"));
}

#[test]
fn json_to_stdout_is_the_tree_only() {
    let mut cmd = solgraph();
    cmd.arg(example_file("Math.sol"))
        .arg("--resolve")
        .arg("--json")
        .arg("-");
    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tree["source_units"].as_array().unwrap().len(), 1);
    assert!(!tree["nodes"].as_array().unwrap().is_empty());
}

#[test]
fn json_is_written_to_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let source = temp.child("Counter.sol");
    source
        .write_str(
            "pragma solidity ^0.8.0;\n\
             contract Counter {\n    uint256 count;\n    function inc() public { count += 1; }\n}\n",
        )
        .unwrap();
    let destination = temp.child("out").child("tree.json");

    let mut cmd = solgraph();
    cmd.current_dir(temp.path())
        .arg(source.path())
        .arg("--resolve")
        .arg("--json")
        .arg(destination.path());
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("JSON written to:"));

    destination.assert(predicate::path::exists());
    destination.assert(predicate::str::contains("\"Counter\""));
}

#[test]
fn verbose_logs_resolution_phases() {
    let mut cmd = solgraph();
    cmd.arg(example_file("Math.sol"))
        .arg("--resolve")
        .arg("--verbose");
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("resolution finished"));
}

#[test]
fn shows_version() {
    let mut cmd = solgraph();
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
