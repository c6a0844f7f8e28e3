//! CLI integration tests for the expense ledger
//!
//! These tests run the `expense` binary against a temporary ledger
//! directory, with a config path that does not exist so the user's own
//! configuration never leaks in.

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command instance for the expense binary, pointed at `dir`
fn expense_cmd(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("expense"));
    cmd.env_remove("EXPENSE_DIR")
        .env_remove("EXPENSE_FILE")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(dir.path().join("config.toml"))
        .arg("--dir")
        .arg(dir.path().join("ledgers"));
    cmd
}

fn ledger_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("ledgers").join("expense.txt")
}

fn add(dir: &TempDir, category: &str, amount: &str, description: &str) {
    expense_cmd(dir)
        .args(["add", category, amount, description, "--at", "2024-03-01 12:00:00"])
        .assert()
        .success();
}

fn json_output(cmd: &mut assert_cmd::Command) -> serde_json::Value {
    let output = cmd.assert().success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    serde_json::from_str(&stdout).unwrap()
}

// =============================================================================
// Add / List
// =============================================================================

#[test]
fn test_add_creates_ledger() {
    let dir = TempDir::new().unwrap();

    expense_cmd(&dir)
        .args(["add", "Food", "20.00", "Lunch", "--at", "2024-03-01 12:00:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Expense added:"))
        .stdout(predicate::str::contains("$20.00"));

    let contents = fs::read_to_string(ledger_path(&dir)).unwrap();
    assert_eq!(contents, "2024-03-01 12:00:00\tFood\t$20.00\tLunch\n");
}

#[test]
fn test_add_rejects_bad_amount() {
    let dir = TempDir::new().unwrap();

    expense_cmd(&dir)
        .args(["add", "Food", "lots", "Lunch"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid amount"));

    assert!(!ledger_path(&dir).exists());
}

#[test]
fn test_add_json_reports_position() {
    let dir = TempDir::new().unwrap();
    add(&dir, "Food", "5", "Coffee");

    let json = json_output(
        expense_cmd(&dir).args(["add", "Transport", "15", "Bus fare", "--format", "json"]),
    );

    assert_eq!(json["position"], 2);
    assert_eq!(json["expense"]["category"], "Transport");
    assert_eq!(json["expense"]["amount"], "15.00");
}

#[test]
fn test_list_shows_expenses() {
    let dir = TempDir::new().unwrap();
    add(&dir, "Food", "20", "Lunch");
    add(&dir, "Transport", "15", "Bus fare");

    expense_cmd(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Expenses:"))
        .stdout(predicate::str::contains("Food\t$20.00\tLunch"))
        .stdout(predicate::str::contains("Transport\t$15.00\tBus fare"))
        .stdout(predicate::str::contains("2 expense(s)"));
}

#[test]
fn test_list_empty_ledger() {
    let dir = TempDir::new().unwrap();

    expense_cmd(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No expenses recorded."));
}

#[test]
fn test_list_json_parses_fields() {
    let dir = TempDir::new().unwrap();
    add(&dir, "Food", "20", "Lunch");
    fs::write(
        ledger_path(&dir),
        fs::read_to_string(ledger_path(&dir)).unwrap() + "free text note\n",
    )
    .unwrap();

    let json = json_output(expense_cmd(&dir).args(["list", "--format", "json"]));
    let items = json.as_array().unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["position"], 1);
    assert_eq!(items[0]["expense"]["description"], "Lunch");
    assert_eq!(items[1]["record"], "free text note");
    assert!(items[1]["expense"].is_null());
}

// =============================================================================
// Show / Update / Remove
// =============================================================================

#[test]
fn test_show_expense() {
    let dir = TempDir::new().unwrap();
    add(&dir, "Food", "20", "Lunch");

    expense_cmd(&dir)
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Expense #1"))
        .stdout(predicate::str::contains("Category:    Food"))
        .stdout(predicate::str::contains("Amount:      $20.00"));
}

#[test]
fn test_show_out_of_range_fails() {
    let dir = TempDir::new().unwrap();
    add(&dir, "Food", "20", "Lunch");

    expense_cmd(&dir)
        .args(["show", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn test_update_keeps_timestamp() {
    let dir = TempDir::new().unwrap();
    add(&dir, "Food", "20", "Lunch");

    expense_cmd(&dir)
        .args(["update", "1", "Food", "22.50", "Lunch and dessert"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Expense 1 updated"));

    let contents = fs::read_to_string(ledger_path(&dir)).unwrap();
    assert_eq!(contents, "2024-03-01 12:00:00\tFood\t$22.50\tLunch and dessert\n");
}

#[test]
fn test_update_out_of_range_fails() {
    let dir = TempDir::new().unwrap();

    expense_cmd(&dir)
        .args(["update", "1", "Food", "1", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn test_remove_expense() {
    let dir = TempDir::new().unwrap();
    add(&dir, "Food", "5", "Coffee");
    add(&dir, "Food", "12", "Lunch");
    add(&dir, "Food", "20", "Dinner");

    expense_cmd(&dir)
        .args(["remove", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Expense 2 removed"));

    let contents = fs::read_to_string(ledger_path(&dir)).unwrap();
    let descriptions: Vec<_> = contents
        .lines()
        .map(|line| line.rsplit('\t').next().unwrap())
        .collect();
    assert_eq!(descriptions, vec!["Coffee", "Dinner"]);
}

#[test]
fn test_remove_out_of_range_fails_without_change() {
    let dir = TempDir::new().unwrap();
    add(&dir, "Food", "5", "Coffee");
    let before = fs::read_to_string(ledger_path(&dir)).unwrap();

    expense_cmd(&dir)
        .args(["remove", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No expense at position 0"));

    expense_cmd(&dir).args(["remove", "2"]).assert().failure();

    assert_eq!(fs::read_to_string(ledger_path(&dir)).unwrap(), before);
}

// =============================================================================
// Search / Clear / Info
// =============================================================================

#[test]
fn test_search_expenses() {
    let dir = TempDir::new().unwrap();
    add(&dir, "Food", "5", "Coffee");
    add(&dir, "Transport", "15", "Bus fare");

    expense_cmd(&dir)
        .args(["search", "BUS"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bus fare"))
        .stdout(predicate::str::contains("Coffee").not());
}

#[test]
fn test_clear_requires_yes() {
    let dir = TempDir::new().unwrap();
    add(&dir, "Food", "5", "Coffee");

    expense_cmd(&dir)
        .arg("clear")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));

    expense_cmd(&dir)
        .args(["clear", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 1 expense(s)"));

    assert_eq!(fs::read_to_string(ledger_path(&dir)).unwrap(), "");
}

#[test]
fn test_info_reports_count() {
    let dir = TempDir::new().unwrap();
    add(&dir, "Food", "5", "Coffee");

    let json = json_output(expense_cmd(&dir).args(["info", "--format", "json"]));
    assert_eq!(json["count"], 1);
    assert!(json["path"].as_str().unwrap().ends_with("expense.txt"));
}

#[test]
fn test_file_flag_adds_extension() {
    let dir = TempDir::new().unwrap();

    expense_cmd(&dir)
        .args(["--file", "travel", "add", "Hotel", "120", "Two nights"])
        .assert()
        .success();

    assert!(dir.path().join("ledgers").join("travel.txt").exists());
}

// =============================================================================
// Config
// =============================================================================

#[test]
fn test_config_file_sets_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("config.toml"),
        "file_name = \"household\"\ndefault_format = \"json\"\n",
    )
    .unwrap();

    let json = json_output(expense_cmd(&dir).arg("info"));
    assert!(json["path"].as_str().unwrap().ends_with("household.txt"));
}

#[test]
fn test_config_path_prints_override() {
    let dir = TempDir::new().unwrap();

    expense_cmd(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

// =============================================================================
// Interactive menu
// =============================================================================

#[test]
fn test_menu_add_and_view() {
    let dir = TempDir::new().unwrap();

    expense_cmd(&dir)
        .arg("menu")
        .write_stdin("test_expenses.txt\n1\nFood\n20.00\nLunch\n2\n7\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Welcome"))
        .stdout(predicate::str::contains("Expense added:"))
        .stdout(predicate::str::contains("Food\t$20.00\tLunch"));

    assert!(dir.path().join("ledgers").join("test_expenses.txt").exists());
}

#[test]
fn test_no_subcommand_runs_menu() {
    let dir = TempDir::new().unwrap();

    expense_cmd(&dir)
        .write_stdin("\n7\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Welcome to the Expense tracker:"))
        .stdout(predicate::str::contains("Goodbye!"));
}
