mod common;

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn ledger(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("ledger.csv");
    common::write_ledger(
        &path,
        &[["created", "1001", "fietsenbon", "100.00", "EUR", "", ""]],
    )
    .unwrap();
    path
}

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::new(cargo_bin!("checkout-connect"));
    cmd.arg("replay")
        .arg(ledger(&dir))
        .arg("--db-path")
        .arg(dir.path().join("some_db"))
        .env_remove("RUST_LOG");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains(
            "storage-rocksdb feature is not enabled; falling back to in-memory storage",
        ))
        .stdout(predicate::str::contains("1001,FIETSENBON,100.00,EUR,pending,,false"));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::new(cargo_bin!("checkout-connect"));
    cmd.arg("replay")
        .arg(ledger(&dir))
        .arg("--db-path")
        .arg(dir.path().join("test_db"))
        .env_remove("RUST_LOG");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("falling back").not());
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    // First run opens the transaction.
    Command::new(cargo_bin!("checkout-connect"))
        .arg("replay")
        .arg(ledger(&dir))
        .arg("--db-path")
        .arg(&db_path)
        .assert()
        .success();

    // Second run only carries the notification.
    let second = dir.path().join("second.csv");
    common::write_ledger(
        &second,
        &[["notification", "1001", "", "100.00", "EUR", "completed", "42"]],
    )
    .unwrap();

    Command::new(cargo_bin!("checkout-connect"))
        .arg("replay")
        .arg(&second)
        .arg("--db-path")
        .arg(&db_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1001,FIETSENBON,100.00,EUR,completed,42,false"));
}
