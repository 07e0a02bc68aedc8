#![allow(dead_code)]

use assert_cmd::cargo_bin;
use std::path::Path;
use std::process::Command;

/// A `tipcalc` command bound to `data_file`, isolated from the caller's
/// environment.
pub fn tipcalc(data_file: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin!("tipcalc"));
    cmd.env_remove("TIPCALC_DB_PATH")
        .env_remove("TIPCALC_DATA_FILE")
        .env_remove("TIPCALC_LOG")
        .arg("--data-file")
        .arg(data_file);
    cmd
}

/// Data rows of `tipcalc history` output, header skipped.
pub fn history_rows(stdout: &[u8]) -> Vec<Vec<String>> {
    let mut reader = csv::Reader::from_reader(stdout);
    reader
        .records()
        .map(|record| {
            record
                .expect("history output should be valid CSV")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect()
}
