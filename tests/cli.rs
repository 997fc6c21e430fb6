use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

const BIN_NAME: &str = "budget-lens";

fn lens(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin(BIN_NAME).expect("binary exists");
    cmd.env("BUDGET_LENS_DATA_DIR", data_dir);
    cmd.env_remove("RUST_LOG");
    cmd
}

fn json_output(data_dir: &Path, args: &[&str]) -> Value {
    let output = lens(data_dir).arg("--json").args(args).output().unwrap();
    assert!(output.status.success(), "command failed: {:?}", args);
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn help_lists_command_groups() {
    let dir = TempDir::new().unwrap();
    lens(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("transaction").and(contains("analyze")).and(contains("simulate")));
}

#[test]
fn init_then_config_reports_paths() {
    let dir = TempDir::new().unwrap();
    lens(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(contains("Initialization complete"));
    assert!(dir.path().join("config.json").exists());
    assert!(dir.path().join("data").join("templates.json").exists());

    lens(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(contains("already initialized"));

    lens(dir.path())
        .arg("config")
        .assert()
        .success()
        .stdout(contains("Default template:    Conservative"));
}

#[test]
fn performance_reports_budget_vs_actual() {
    let dir = TempDir::new().unwrap();
    lens(dir.path())
        .args(["budget", "set", "Food", "3000", "--month", "2025-08"])
        .assert()
        .success();
    lens(dir.path())
        .args(["transaction", "add", "1250", "-c", "Food", "-d", "2025-08-15"])
        .assert()
        .success();
    lens(dir.path())
        .args(["transaction", "add", "5500", "-c", "Shopping", "-d", "2025-08-25"])
        .assert()
        .success();

    let rows = json_output(dir.path(), &["analyze", "performance", "--month", "2025-08"]);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);

    // Ordered by actual spending, highest first
    assert_eq!(rows[0]["category"], "Shopping");
    assert_eq!(rows[0]["budgeted"], 0.0);
    assert_eq!(rows[0]["status"], "over");
    assert_eq!(rows[0]["variance_pct"], -100.0);

    assert_eq!(rows[1]["category"], "Food");
    assert_eq!(rows[1]["budgeted"], 3000.0);
    assert_eq!(rows[1]["actual"], 1250.0);
    assert_eq!(rows[1]["variance"], 1750.0);
    assert_eq!(rows[1]["variance_pct"], 58.33);
    assert_eq!(rows[1]["status"], "under");

    let total = json_output(dir.path(), &["analyze", "total", "--month", "2025-08"]);
    assert_eq!(total["total"], 6750.0);

    lens(dir.path())
        .args(["analyze", "performance", "--month", "2025-08"])
        .assert()
        .success()
        .stdout(contains("Budget vs. actual: August 2025").and(contains("1750.00")));
}

#[test]
fn apply_template_before_init_uses_builtins() {
    let dir = TempDir::new().unwrap();
    lens(dir.path())
        .args(["budget", "apply-template", "--month", "2025-09"])
        .assert()
        .success()
        .stdout(contains("Applied template 'Conservative'"));

    let budgets = json_output(dir.path(), &["budget", "list", "--month", "2025-09"]);
    let food = budgets
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["category"] == "Food")
        .unwrap();
    assert_eq!(food["amount"], 3000.0);

    lens(dir.path())
        .args(["budget", "apply-template", "Frugal", "--month", "2025-09"])
        .assert()
        .failure()
        .stderr(contains("Template not found: Frugal"));
}

#[test]
fn csv_import_and_export() {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("in.csv");
    fs::write(
        &csv_path,
        "Date,Category,Amount,Description\n\
         2025-08-03,Food,450.50,Groceries\n\
         2025-08-05,,899,NETFLIX subscription\n",
    )
    .unwrap();

    lens(dir.path())
        .args(["transaction", "import"])
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(contains("Imported 2 transaction(s)").and(contains("1 auto-categorized")));

    lens(dir.path())
        .args(["transaction", "list", "--category", "Subscriptions"])
        .assert()
        .success()
        .stdout(contains("899.00").and(contains("Total (1):")));

    let out_path = dir.path().join("out.csv");
    lens(dir.path())
        .args(["transaction", "export"])
        .arg(&out_path)
        .assert()
        .success()
        .stdout(contains("Exported 2 transaction(s)"));

    let exported = fs::read_to_string(&out_path).unwrap();
    let lines: Vec<_> = exported.lines().collect();
    assert_eq!(lines[0], "Date,Category,Amount,Description,Source");
    assert_eq!(lines[1], "2025-08-03,Food,450.50,Groceries,imported");
}

#[test]
fn bad_csv_row_imports_nothing() {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("bad.csv");
    fs::write(
        &csv_path,
        "Date,Category,Amount\n2025-08-03,Food,10\n2025-08-04,Food,ten\n",
    )
    .unwrap();

    lens(dir.path())
        .args(["transaction", "import"])
        .arg(&csv_path)
        .assert()
        .failure()
        .stderr(contains("line 3"));

    lens(dir.path())
        .args(["transaction", "list"])
        .assert()
        .success()
        .stdout("No transactions found.\n");
}

#[test]
fn simulation_leaves_data_untouched() {
    let dir = TempDir::new().unwrap();
    lens(dir.path())
        .args(["budget", "set", "Food", "3000", "--month", "2025-08"])
        .assert()
        .success();
    lens(dir.path())
        .args(["transaction", "add", "1250", "-c", "Food", "-d", "2025-08-15"])
        .assert()
        .success();

    let scenario = dir.path().join("party.json");
    fs::write(
        &scenario,
        r#"{
            "name": "Party",
            "base_month": "2025-08",
            "transactions": [
                {"date": "2025-08-20", "category": "Food", "amount": 2000}
            ]
        }"#,
    )
    .unwrap();

    let outcome = json_output(
        dir.path(),
        &["simulate", "run", scenario.to_str().unwrap()],
    );
    assert_eq!(outcome["simulated"][0]["actual"], 3250.0);
    assert_eq!(outcome["simulated"][0]["status"], "over");
    assert_eq!(outcome["impact"]["direction"], "increase");
    assert_eq!(outcome["impact"]["risk"], "low");
    assert_eq!(outcome["impact"]["status_changes"][0], "Food");

    let total = json_output(dir.path(), &["analyze", "total", "--month", "2025-08"]);
    assert_eq!(total["total"], 1250.0);
}

#[test]
fn unknown_transaction_is_not_found() {
    let dir = TempDir::new().unwrap();
    lens(dir.path())
        .args(["transaction", "remove", "deadbeef"])
        .assert()
        .failure()
        .stderr(contains("Transaction not found: deadbeef"));
}

#[test]
fn csv_import_keeps_padded_cells_and_skips_bom() {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("bom.csv");
    fs::write(
        &csv_path,
        "\u{feff}Date,Category,Amount,Description\n\
         2025-08-03, Food ,450.50,  lunch  \n",
    )
    .unwrap();

    lens(dir.path())
        .args(["transaction", "import"])
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(contains("Imported 1 transaction(s)"));

    let rows = json_output(dir.path(), &["transaction", "list"]);
    assert_eq!(rows[0]["category"], " Food ");
    assert_eq!(rows[0]["description"], "  lunch  ");
    assert_eq!(rows[0]["amount"], 450.5);
}

#[test]
fn bare_decimal_point_is_rejected() {
    let dir = TempDir::new().unwrap();
    lens(dir.path())
        .args(["transaction", "add", ".", "-c", "Food", "-d", "2025-08-03"])
        .assert()
        .failure()
        .stderr(contains("Invalid amount format"));

    lens(dir.path())
        .args(["transaction", "add", "10.999", "-c", "Food", "-d", "2025-08-03"])
        .assert()
        .failure();

    let csv_path = dir.path().join("dot.csv");
    fs::write(&csv_path, "Date,Category,Amount\n2025-08-03,Food,.\n").unwrap();
    lens(dir.path())
        .args(["transaction", "import"])
        .arg(&csv_path)
        .assert()
        .failure()
        .stderr(contains("line 2"));
}

#[test]
fn backup_then_restore_brings_data_back() {
    let dir = TempDir::new().unwrap();
    lens(dir.path())
        .args(["transaction", "add", "1250", "-c", "Food", "-d", "2025-08-15"])
        .assert()
        .success();
    lens(dir.path())
        .args(["backup", "create", "--label", "before"])
        .assert()
        .success()
        .stdout(contains("Backup created:").and(contains("-before.json")));

    lens(dir.path())
        .args(["transaction", "add", "999", "-c", "Shopping", "-d", "2025-08-16"])
        .assert()
        .success();

    // Without --force nothing changes
    lens(dir.path())
        .args(["backup", "restore", "latest"])
        .assert()
        .success()
        .stdout(contains("WARNING").and(contains("1 transaction(s)")));
    let total = json_output(dir.path(), &["analyze", "total", "--month", "2025-08"]);
    assert_eq!(total["total"], 2249.0);

    lens(dir.path())
        .args(["backup", "restore", "latest", "--force"])
        .assert()
        .success()
        .stdout(contains("Restored 1 transaction(s)").and(contains("Previous data saved to:")));
    let total = json_output(dir.path(), &["analyze", "total", "--month", "2025-08"]);
    assert_eq!(total["total"], 1250.0);

    let backups = json_output(dir.path(), &["backup", "list"]);
    assert_eq!(backups.as_array().unwrap().len(), 2);
    assert_eq!(backups[0]["label"], "pre-restore");
}

#[test]
fn saved_scenarios_can_be_listed_run_and_deleted() {
    let dir = TempDir::new().unwrap();
    lens(dir.path())
        .args(["budget", "set", "Food", "3000", "--month", "2025-08"])
        .assert()
        .success();

    let scenario = dir.path().join("lean.json");
    fs::write(
        &scenario,
        r#"{"name": "Lean", "base_month": "2025-08", "budget_overrides": {"Food": 2000}}"#,
    )
    .unwrap();

    lens(dir.path())
        .args(["simulate", "save"])
        .arg(&scenario)
        .assert()
        .success()
        .stdout("Saved scenario 'Lean'\n");
    fs::remove_file(&scenario).unwrap();

    lens(dir.path())
        .args(["simulate", "list"])
        .assert()
        .success()
        .stdout(contains("Lean").and(contains("2025-08")));

    let outcome = json_output(dir.path(), &["simulate", "run", "Lean"]);
    assert_eq!(outcome["simulated"][0]["budgeted"], 2000.0);
    assert_eq!(outcome["impact"]["net_budget_change"], -1000.0);

    lens(dir.path())
        .args(["simulate", "delete", "Lean"])
        .assert()
        .success();
    lens(dir.path())
        .args(["simulate", "run", "Lean"])
        .assert()
        .failure()
        .stderr(contains("Scenario not found: Lean"));
}

#[test]
fn analyze_category_reports_history() {
    let dir = TempDir::new().unwrap();
    for (month, budget) in [("2025-07", "500"), ("2025-08", "500")] {
        lens(dir.path())
            .args(["budget", "set", "Food", budget, "--month", month])
            .assert()
            .success();
    }
    lens(dir.path())
        .args(["transaction", "add", "400", "-c", "Food", "-d", "2025-07-10"])
        .assert()
        .success();
    lens(dir.path())
        .args(["transaction", "add", "700", "-c", "Food", "-d", "2025-08-10"])
        .assert()
        .success();

    let history = json_output(dir.path(), &["analyze", "category", "Food"]);
    assert_eq!(history["months_with_data"], 2);
    assert_eq!(history["months_over_budget"], 1);
    assert_eq!(history["total_spent"], 1100.0);
    assert_eq!(history["average_monthly"], 550.0);
    assert_eq!(history["adherence_pct"], 110.0);
    assert_eq!(history["first_month"], "2025-07");
}
