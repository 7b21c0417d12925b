//! End-to-end tests for the command-line tools.
//!
//! Each test writes a state file into a temporary directory, runs the real
//! binaries against it and inspects exit codes, output and the saved state.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

const STATE: &str = r#"{
  "config": {
    "currency": "EUR",
    "transfer": { "enabled": true, "min_transfer": "1", "fee_percent": "10" },
    "conditional_discounts": [ { "condition": "100", "percent": "20" } ]
  },
  "categories": [
    { "id": 2, "parent": 0 },
    { "id": 7, "parent": 2 }
  ],
  "store": { "users": [1, 2] },
  "coupons": {
    "coupons": {
      "WELCOME": { "code": "WELCOME", "kind": "fixed", "value": "10" },
      "HALF": { "code": "HALF", "kind": "percent", "value": "50" }
    }
  }
}"#;

fn setup() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wallet.json");
    fs::write(&path, STATE).unwrap();
    (dir, path)
}

fn run(bin: &str, file: &Path, args: &[&str]) -> Output {
    Command::new(bin)
        .arg(file)
        .args(args)
        .output()
        .expect("failed to run binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Compare amounts by value, whatever their scale or JSON representation.
fn money(value: &serde_json::Value) -> Decimal {
    match value {
        serde_json::Value::String(s) => s.parse().unwrap(),
        other => other.to_string().parse().unwrap(),
    }
}

fn balance_json(file: &Path, user: &str, category: &str) -> serde_json::Value {
    let output = run(
        env!("CARGO_BIN_EXE_ewallet-balance"),
        file,
        &["--user", user, "--category", category, "--json"],
    );
    assert!(output.status.success(), "{output:?}");
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn credit_then_debit_updates_state_file() {
    let (_dir, file) = setup();

    let output = run(
        env!("CARGO_BIN_EXE_ewallet-credit"),
        &file,
        &["--user", "1", "--amount", "30", "--category", "2"],
    );
    assert!(output.status.success(), "{output:?}");
    assert!(stdout(&output).contains("credit 30 cat=2"));

    let output = run(
        env!("CARGO_BIN_EXE_ewallet-debit"),
        &file,
        &["--user", "1", "--amount", "12.5", "--category", "7", "-d", "fee"],
    );
    assert!(output.status.success(), "{output:?}");

    let summary = balance_json(&file, "1", "7");
    assert_eq!(money(&summary["balance"]), dec!(17.5));
    assert_eq!(money(&summary["refundable"]), dec!(17.5));
}

#[test]
fn refused_debit_exits_with_one_and_keeps_state() {
    let (_dir, file) = setup();
    let before = fs::read_to_string(&file).unwrap();

    let output = run(
        env!("CARGO_BIN_EXE_ewallet-debit"),
        &file,
        &["--user", "1", "--amount", "5"],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("insufficient balance"));
    assert_eq!(fs::read_to_string(&file).unwrap(), before);
}

#[test]
fn missing_state_file_exits_with_two() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(
        env!("CARGO_BIN_EXE_ewallet-balance"),
        &dir.path().join("nope.json"),
        &["--user", "1"],
    );
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn unknown_user_exits_with_two() {
    let (_dir, file) = setup();
    let output = run(
        env!("CARGO_BIN_EXE_ewallet-balance"),
        &file,
        &["--user", "9"],
    );
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn top_up_applies_discount() {
    let (_dir, file) = setup();
    let output = run(
        env!("CARGO_BIN_EXE_ewallet-credit"),
        &file,
        &["--user", "1", "--amount", "100", "--top-up"],
    );
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout(&output).lines().count(), 2);

    let summary = balance_json(&file, "1", "0");
    assert_eq!(money(&summary["balance"]), dec!(125));
    assert_eq!(money(&summary["free"]), dec!(25));
}

#[test]
fn coupon_redemption_records_usage() {
    let (_dir, file) = setup();
    let output = run(
        env!("CARGO_BIN_EXE_ewallet-credit"),
        &file,
        &["--user", "2", "--coupon", "WELCOME"],
    );
    assert!(output.status.success(), "{output:?}");

    let summary = balance_json(&file, "2", "7");
    assert_eq!(money(&summary["nonrefundable"]), dec!(10));
    assert_eq!(money(&summary["free"]), dec!(10));

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
    assert_eq!(saved["coupons"]["usage"].as_array().unwrap().len(), 1);
}

#[test]
fn transfer_charges_fee_to_sender() {
    let (_dir, file) = setup();
    run(
        env!("CARGO_BIN_EXE_ewallet-credit"),
        &file,
        &["--user", "1", "--amount", "50"],
    );

    let output = run(
        env!("CARGO_BIN_EXE_ewallet-transfer"),
        &file,
        &["--from", "1", "--to", "2", "--amount", "20"],
    );
    assert!(output.status.success(), "{output:?}");
    assert!(stdout(&output).contains("fee: 2"));

    assert_eq!(money(&balance_json(&file, "1", "0")["balance"]), dec!(28));
    assert_eq!(money(&balance_json(&file, "2", "0")["nonrefundable"]), dec!(20));
}

#[test]
fn self_transfer_is_refused() {
    let (_dir, file) = setup();
    let output = run(
        env!("CARGO_BIN_EXE_ewallet-transfer"),
        &file,
        &["--from", "1", "--to", "1", "--amount", "5"],
    );
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn enrolment_with_percent_coupon() {
    let (_dir, file) = setup();
    run(
        env!("CARGO_BIN_EXE_ewallet-credit"),
        &file,
        &["--user", "1", "--amount", "30", "--category", "2"],
    );

    let output = run(
        env!("CARGO_BIN_EXE_ewallet-enrol"),
        &file,
        &[
            "--user", "1", "--course", "11", "--cost", "40", "--category", "7", "--coupon",
            "HALF",
        ],
    );
    assert!(output.status.success(), "{output:?}");
    assert!(stdout(&output).contains("coupon HALF applied"));
    assert_eq!(money(&balance_json(&file, "1", "7")["balance"]), dec!(10));
}

#[test]
fn history_lists_records_as_json() {
    let (_dir, file) = setup();
    run(
        env!("CARGO_BIN_EXE_ewallet-credit"),
        &file,
        &["--user", "1", "--amount", "5", "--non-refundable"],
    );
    run(
        env!("CARGO_BIN_EXE_ewallet-debit"),
        &file,
        &["--user", "1", "--amount", "2"],
    );

    let output = run(
        env!("CARGO_BIN_EXE_ewallet-history"),
        &file,
        &["--user", "1", "--json"],
    );
    assert!(output.status.success(), "{output:?}");
    let records: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["kind"], "credit");
    assert_eq!(records[1]["kind"], "debit");
    assert_eq!(money(&records[1]["balance_after"]), dec!(3));
}

#[test]
fn credit_past_decimal_range_exits_with_one() {
    let (_dir, file) = setup();
    let max = Decimal::MAX.to_string();
    let output = run(
        env!("CARGO_BIN_EXE_ewallet-credit"),
        &file,
        &["--user", "1", "--amount", &max],
    );
    assert!(output.status.success(), "{output:?}");
    let before = fs::read_to_string(&file).unwrap();

    let output = run(
        env!("CARGO_BIN_EXE_ewallet-credit"),
        &file,
        &["--user", "1", "--amount", "1"],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("overflows"));
    assert_eq!(fs::read_to_string(&file).unwrap(), before);
}
