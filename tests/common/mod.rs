#![allow(dead_code)]

use assert_cmd::cargo_bin;
use serde_json::Value;
use std::path::Path;
use std::process::Command;

/// A `staffpay` invocation against `data_dir` with the simulated delays off.
pub fn staffpay(data_dir: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin!("staffpay"));
    cmd.env_remove("STAFFPAY_DATA_DIR")
        .env("STAFFPAY_GATEWAY_DELAY_MS", "0")
        .env("STAFFPAY_SUBMIT_DELAY_MS", "0")
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

/// The persisted array under `key`, or `Value::Null` when nothing was written.
pub fn stored(data_dir: &Path, key: &str) -> Value {
    match std::fs::read_to_string(data_dir.join(format!("{key}.json"))) {
        Ok(raw) => serde_json::from_str(&raw).unwrap(),
        Err(_) => Value::Null,
    }
}

pub fn add_teacher(data_dir: &Path, name: &str, salary: &str) -> String {
    let output = staffpay(data_dir)
        .args(["teachers", "add"])
        .args(["--name", name])
        .args(["--email", "new.teacher@school.edu"])
        .args(["--subject", "Chemistry"])
        .args(["--role", "Teacher"])
        .args(["--birthdate", "1991-05-04"])
        .args(["--address", "22 Elm Street, Riverside"])
        .args(["--salary", salary])
        .args(["--qualification", "BSc Chemistry:4"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}
