//! CLI Integration Tests
//!
//! Tests the tc-connector binary directly using assert_cmd.

#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

mod common;

use assert_cmd::Command;
use common::{add_broken_script, add_checkout_script, text_rows, uft_archive, write_workbook};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

// ═══════════════════════════════════════════════════════════════════════════
// HELP AND VERSION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("tc-connector").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("tc-connector"))
        .stdout(predicate::str::contains("COMMANDS"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("tc-connector").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tc-connector"));
}

#[test]
fn test_uft_help() {
    let mut cmd = Command::cargo_bin("tc-connector").unwrap();
    cmd.args(["uft", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Framework/ObjectRepository"));
}

#[test]
fn test_selenium_requires_files() {
    let mut cmd = Command::cargo_bin("tc-connector").unwrap();
    cmd.arg("selenium").assert().failure();
}

// ═══════════════════════════════════════════════════════════════════════════
// MIGRATION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_uft_archive_to_yaml() {
    let dir = TempDir::new().unwrap();
    let archive = uft_archive(dir.path());
    let output = dir.path().join("shop.yaml");

    let mut cmd = Command::cargo_bin("tc-connector").unwrap();
    cmd.arg("uft")
        .arg(&archive)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Migration Complete"))
        .stdout(predicate::str::contains("template_conversion"));

    let yaml = fs::read_to_string(&output).unwrap();
    assert!(yaml.contains("engine: Html"));
    assert!(yaml.contains("kind: template_conversion"));
    assert!(yaml.contains("{XL[UserName]}"));
}

#[test]
fn test_uft_archive_to_json() {
    let dir = TempDir::new().unwrap();
    let archive = uft_archive(dir.path());
    let output = dir.path().join("shop.json");

    let mut cmd = Command::cargo_bin("tc-connector").unwrap();
    cmd.arg("uft")
        .arg(&archive)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let objects = json["objects"].as_array().unwrap();
    assert_eq!(objects[0]["kind"], "test_case");
    assert_eq!(objects[0]["name"], "Login");
    assert_eq!(objects[0]["id"], 1);
}

#[test]
fn test_uft_failure_exits_non_zero() {
    let dir = TempDir::new().unwrap();
    let archive = uft_archive(dir.path());
    add_broken_script(&archive);
    let output = dir.path().join("shop.yaml");

    let mut cmd = Command::cargo_bin("tc-connector").unwrap();
    cmd.arg("uft")
        .arg(&archive)
        .arg("-o")
        .arg(&output)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Migration failed"))
        .stderr(predicate::str::contains("SwfWindow"));
    assert!(!output.exists());
}

#[test]
fn test_uft_keep_going_reports_failures() {
    let dir = TempDir::new().unwrap();
    let archive = uft_archive(dir.path());
    add_broken_script(&archive);
    let output = dir.path().join("shop.yaml");

    let mut cmd = Command::cargo_bin("tc-connector").unwrap();
    cmd.arg("uft")
        .arg(&archive)
        .arg("-o")
        .arg(&output)
        .arg("--keep-going")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("1 failed file"))
        .stdout(predicate::str::contains("Broken.xlsx"));
    assert!(output.exists());
}

#[test]
fn test_uft_repository_miss_is_reported_not_fatal() {
    let dir = TempDir::new().unwrap();
    let archive = uft_archive(dir.path());
    add_checkout_script(&archive);
    let output = dir.path().join("shop.yaml");

    let mut cmd = Command::cargo_bin("tc-connector").unwrap();
    cmd.arg("uft")
        .arg(&archive)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Migration Complete"))
        .stdout(predicate::str::contains("3 row(s) migrated without their control"))
        .stdout(predicate::str::contains("Coupon"));
    assert!(output.exists());
}

#[test]
fn test_definition_file_sets_folders() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("cases.xlsx");
    write_workbook(
        &input,
        &[(
            "Cases",
            text_rows(&[&["TestCase", "Action"], &["Checkout", "Pay by card"]]),
        )],
    );
    let definition = dir.path().join("definition.yaml");
    fs::write(&definition, "test_cases_folder: Imported/Manual\n").unwrap();
    let output = dir.path().join("cases.yaml");

    let mut cmd = Command::cargo_bin("tc-connector").unwrap();
    cmd.arg("manual")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--definition")
        .arg(&definition)
        .assert()
        .success();

    let yaml = fs::read_to_string(&output).unwrap();
    assert!(yaml.contains("folder: Imported/Manual"));
    assert!(yaml.contains("kind: manual_test_step"));
}

#[test]
fn test_invalid_definition_rejected() {
    let dir = TempDir::new().unwrap();
    let definition = dir.path().join("definition.yaml");
    fs::write(&definition, "modules: Typo\n").unwrap();

    let mut cmd = Command::cargo_bin("tc-connector").unwrap();
    cmd.arg("selenium")
        .arg(dir.path().join("script.xlsx"))
        .arg("--definition")
        .arg(&definition)
        .arg("-o")
        .arg(dir.path().join("out.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}
