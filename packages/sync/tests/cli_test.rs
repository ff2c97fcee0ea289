//! Tests for the `rsr-sync` binary.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("project_updates")
        .join(name)
}

fn rsr_sync() -> Command {
    let mut cmd = Command::cargo_bin("rsr-sync").unwrap();
    cmd.env_remove("RSR_STORE_DIR");
    cmd
}

#[test]
fn test_ingest_reports_counts() {
    let dir = tempdir().unwrap();

    rsr_sync()
        .arg("ingest")
        .arg(fixture("updates.xml"))
        .arg("--store")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Stored updates: 4"))
        .stdout(predicate::str::contains("Warnings: 2"));

    assert!(dir.path().join("updates/2505.yaml").is_file());
}

#[test]
fn test_ingest_uses_store_dir_from_env() {
    let dir = tempdir().unwrap();

    rsr_sync()
        .env("RSR_STORE_DIR", dir.path())
        .arg("ingest")
        .arg(fixture("single.xml"))
        .assert()
        .success();

    assert!(dir.path().join("updates/2702.yaml").is_file());
}

#[test]
fn test_ingest_missing_feed_fails() {
    let dir = tempdir().unwrap();

    rsr_sync()
        .arg("ingest")
        .arg(dir.path().join("missing.xml"))
        .arg("--store")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Feed file does not exist"));
}

#[test]
fn test_show_update_with_project() {
    let dir = tempdir().unwrap();

    rsr_sync()
        .args(["add-project", "363", "Kenya farm video screenings", "--store"])
        .arg(dir.path())
        .assert()
        .success();

    rsr_sync()
        .arg("ingest")
        .arg(fixture("updates.xml"))
        .arg("--store")
        .arg(dir.path())
        .assert()
        .success();

    rsr_sync()
        .args(["show-update", "2505", "--store"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Kenya farm video screenings"))
        .stdout(predicate::str::contains(
            "Video screening improves farms productivity",
        ))
        .stdout(predicate::str::contains("Editable: no"));
}

#[test]
fn test_show_unknown_update_fails() {
    let dir = tempdir().unwrap();

    rsr_sync()
        .args(["show-update", "9999", "--store"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Update 9999 not found in store"));
}

#[test]
fn test_lookup_prints_last_update() {
    rsr_sync()
        .arg("lookup")
        .arg(fixture("single.xml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Seedlings distributed"))
        .stdout(predicate::str::contains("project 363"));
}
