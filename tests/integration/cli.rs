//! Tests for the `framedump` binary

use super::common::fixtures::{write_config, write_snapshot};
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn framedump(config: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("framedump").expect("binary is built");
    cmd.arg("--config").arg(config).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_render_to_stdout() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let snapshot = write_snapshot(dir.path());
    let config = write_config(dir.path(), "");

    framedump(&config)
        .arg("render")
        .arg(&snapshot)
        .arg("--package")
        .arg("shop")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Locals from file \"shop/views.py\", line 42, in handler:",
        ))
        .stdout(predicate::str::contains("    cart['total'] = 59.9"))
        .stdout(predicate::str::contains("requests/api.py").not())
        .stdout(predicate::str::contains(
            "  PaymentError: card declined\n  Caused by:\n    HTTPError: 402 Payment Required",
        ));
}

#[test]
fn test_package_from_config_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let snapshot = write_snapshot(dir.path());
    let config = write_config(dir.path(), "[dump]\npackage_name = \"requests\"\n");

    framedump(&config)
        .arg("render")
        .arg(&snapshot)
        .assert()
        .success()
        .stdout(predicate::str::contains("in send:"))
        .stdout(predicate::str::contains("in handler:").not());
}

#[test]
fn test_render_appends_to_output_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let snapshot = write_snapshot(dir.path());
    let config = write_config(dir.path(), "");
    let output = dir.path().join("dump.txt");

    for _ in 0..2 {
        framedump(&config)
            .arg("render")
            .arg(&snapshot)
            .arg("--output")
            .arg(&output)
            .assert()
            .success()
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("Dumped stack and locals to"))
            .stderr(predicate::str::contains("cat '"));
    }

    let contents = fs::read_to_string(&output).unwrap();
    assert_eq!(contents.matches("in handler:").count(), 2);
}

#[test]
fn test_render_to_temp_dir_from_config() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let dumps = dir.path().join("dumps");
    fs::create_dir_all(&dumps).unwrap();
    let snapshot = write_snapshot(dir.path());
    let config = write_config(
        dir.path(),
        &format!(
            "[dump]\npackage_name = \"shop\"\ntemp_dir = {:?}\n",
            dumps.to_string_lossy()
        ),
    );

    framedump(&config)
        .arg("render")
        .arg(&snapshot)
        .arg("--temp")
        .assert()
        .success()
        .stderr(predicate::str::contains("shop_stack_and_locals"));

    assert_eq!(fs::read_dir(&dumps).unwrap().count(), 1);
}

#[test]
fn test_missing_snapshot_fails() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(dir.path(), "");

    framedump(&config)
        .arg("render")
        .arg(dir.path().join("nope.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load snapshot"));
}

#[test]
fn test_invalid_config_fails_render() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let snapshot = write_snapshot(dir.path());
    let config = write_config(dir.path(), "[dump]\ndump_locals = \"often\"\n");

    framedump(&config)
        .arg("render")
        .arg(&snapshot)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}

#[test]
fn test_init_config_writes_example() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("framedump").join("config.toml");

    framedump(&path).arg("init-config").assert().success();
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("[dump]"));

    framedump(&path)
        .arg("init-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    framedump(&path).arg("init-config").arg("--force").assert().success();
}
