mod common;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_history_survives_restarts() {
    let dir = tempdir().unwrap();
    let data_file = dir.path().join("history.json");

    common::tipcalc(&data_file)
        .args(["save", "50", "--percent", "20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved calculation 1"))
        .stdout(predicate::str::contains("Total: $60.00"));

    common::tipcalc(&data_file)
        .args(["save", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved calculation 2"));

    let output = common::tipcalc(&data_file).arg("history").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("id,billAmount,tipPercent,tipAmount,totalAmount,timestamp\n"));

    let rows = common::history_rows(&output.stdout);
    assert_eq!(rows.len(), 2);
    // Newest first.
    assert_eq!(rows[0][..5], ["2", "0", "15", "0", "0"]);
    assert_eq!(rows[1][..5], ["1", "50", "20", "10", "60"]);
    let newer: i64 = rows[0][5].parse().unwrap();
    let older: i64 = rows[1][5].parse().unwrap();
    assert!(newer >= older);
}

#[test]
fn test_delete_and_clear() {
    let dir = tempdir().unwrap();
    let data_file = dir.path().join("history.json");

    for bill in ["10", "20", "30"] {
        common::tipcalc(&data_file)
            .args(["save", bill, "--percent", "10"])
            .assert()
            .success();
    }

    common::tipcalc(&data_file)
        .args(["delete", "2"])
        .assert()
        .success();

    let output = common::tipcalc(&data_file).arg("history").output().unwrap();
    let ids: Vec<String> = common::history_rows(&output.stdout)
        .into_iter()
        .map(|row| row[0].clone())
        .collect();
    assert_eq!(ids, ["3", "1"]);

    // Unknown ids are not an error.
    common::tipcalc(&data_file)
        .args(["delete", "42"])
        .assert()
        .success();

    common::tipcalc(&data_file).arg("clear").assert().success();
    common::tipcalc(&data_file).arg("clear").assert().success();

    common::tipcalc(&data_file)
        .arg("history")
        .assert()
        .success()
        .stdout("id,billAmount,tipPercent,tipAmount,totalAmount,timestamp\n");

    // Ids keep counting after a clear.
    common::tipcalc(&data_file)
        .args(["save", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved calculation 4"));
}

#[test]
fn test_corrupt_history_file_fails() {
    let dir = tempdir().unwrap();
    let data_file = dir.path().join("history.json");
    std::fs::write(&data_file, "{ not json").unwrap();

    common::tipcalc(&data_file)
        .arg("history")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Serialization error"));
}

#[test]
fn test_in_memory_history_is_not_written() {
    let dir = tempdir().unwrap();
    let data_file = dir.path().join("history.json");

    common::tipcalc(&data_file)
        .args(["--in-memory", "save", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved calculation 1"));

    assert!(!data_file.exists());
}

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let dir = tempdir().unwrap();
    let data_file = dir.path().join("history.json");

    common::tipcalc(&data_file)
        .args(["save", "50"])
        .arg("--db-path")
        .arg(dir.path().join("db"))
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "'storage-rocksdb' feature is not enabled. Falling back to the history file.",
        ));

    assert!(data_file.exists());
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let data_file = dir.path().join("history.json");
    let db_path = dir.path().join("db");

    common::tipcalc(&data_file)
        .args(["save", "50", "--percent", "20"])
        .arg("--db-path")
        .arg(&db_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Falling back").not());

    common::tipcalc(&data_file)
        .args(["save", "80", "--percent", "10"])
        .arg("--db-path")
        .arg(&db_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved calculation 2"));

    let output = common::tipcalc(&data_file)
        .arg("history")
        .arg("--db-path")
        .arg(&db_path)
        .output()
        .unwrap();
    let rows = common::history_rows(&output.stdout);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][..5], ["2", "80", "10", "8", "88"]);
    assert!(!data_file.exists());
}
