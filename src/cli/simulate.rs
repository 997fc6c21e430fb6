//! Simulation CLI commands
//!
//! Scenarios come from JSON files or the saved scenario list and are
//! evaluated against current data without touching transactions or budgets.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use serde::Serialize;

use super::print_json;
use crate::config::settings::Settings;
use crate::display::{format_deltas, format_saved_scenarios, format_scenario_outcome};
use crate::error::{LensError, LensResult};
use crate::export::read_scenario_json;
use crate::models::{CategoryDelta, Scenario};
use crate::services::{compare_scenarios, validate_scenario, Simulator};
use crate::storage::Storage;

/// Simulate subcommands
#[derive(Subcommand)]
pub enum SimulateCommands {
    /// Evaluate a scenario against its base month
    Run {
        /// Path to scenario JSON, or the name of a saved scenario
        scenario: String,
    },
    /// Compare the simulated results of two scenarios
    Compare {
        /// Scenario treated as "before" (file or saved name)
        before: String,
        /// Scenario treated as "after" (file or saved name)
        after: String,
    },
    /// Check a scenario file and keep it under its name
    Save {
        /// Path to scenario JSON
        file: PathBuf,
    },
    /// List saved scenarios
    List,
    /// Delete a saved scenario
    Delete {
        /// Scenario name
        name: String,
    },
}

#[derive(Serialize)]
struct Comparison<'a> {
    before: &'a str,
    after: &'a str,
    deltas: &'a [CategoryDelta],
}

fn load_scenario(path: &Path) -> LensResult<Scenario> {
    let file = File::open(path)
        .map_err(|e| LensError::Io(format!("Failed to open '{}': {}", path.display(), e)))?;
    read_scenario_json(BufReader::new(file))
}

/// An existing file wins over a saved scenario with the same name
fn resolve_scenario(storage: &Storage, source: &str) -> LensResult<Scenario> {
    let path = Path::new(source);
    if path.is_file() {
        return load_scenario(path);
    }
    storage
        .scenarios
        .get(source)?
        .ok_or_else(|| LensError::scenario_not_found(source))
}

/// Handle a simulate command
pub fn handle_simulate_command(
    storage: &Storage,
    settings: &Settings,
    cmd: SimulateCommands,
    json: bool,
) -> LensResult<()> {
    let simulator = Simulator::from_storage(storage, settings);

    match cmd {
        SimulateCommands::Run { scenario } => {
            let scenario = resolve_scenario(storage, &scenario)?;
            let outcome = simulator.run_scenario(&scenario)?;
            if json {
                print_json(&outcome)?;
            } else {
                print!("{}", format_scenario_outcome(&outcome));
            }
        }

        SimulateCommands::Compare { before, after } => {
            let before = simulator.run_scenario(&resolve_scenario(storage, &before)?)?;
            let after = simulator.run_scenario(&resolve_scenario(storage, &after)?)?;
            if before.month != after.month {
                return Err(LensError::Validation(format!(
                    "Scenarios target different months ({} and {})",
                    before.month, after.month
                )));
            }

            let deltas = compare_scenarios(&before.simulated, &after.simulated);
            if json {
                print_json(&Comparison {
                    before: &before.name,
                    after: &after.name,
                    deltas: &deltas,
                })?;
            } else {
                println!("{} -> {} ({})", before.name, after.name, before.month);
                print!("{}", format_deltas(&deltas));
            }
        }

        SimulateCommands::Save { file } => {
            let scenario = load_scenario(&file)?;
            validate_scenario(&scenario)?;
            let name = scenario.name.clone();
            let replaced = storage.scenarios.save_scenario(scenario)?;
            if json {
                print_json(&serde_json::json!({ "name": name, "replaced": replaced }))?;
            } else if replaced {
                println!("Replaced saved scenario '{}'", name);
            } else {
                println!("Saved scenario '{}'", name);
            }
        }

        SimulateCommands::List => {
            let scenarios = storage.scenarios.list()?;
            if json {
                print_json(&scenarios)?;
            } else {
                print!("{}", format_saved_scenarios(&scenarios));
            }
        }

        SimulateCommands::Delete { name } => {
            let removed = storage.scenarios.remove(&name)?;
            if json {
                print_json(&removed)?;
            } else {
                println!("Deleted saved scenario '{}'", removed.scenario.name);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LensPaths;
    use crate::models::YearMonth;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LensPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_resolve_saved_name_and_file() {
        let (temp_dir, storage) = create_test_storage();
        let month = YearMonth::parse("2025-08").unwrap();
        storage
            .scenarios
            .save_scenario(Scenario::new("Lean", month))
            .unwrap();

        assert_eq!(resolve_scenario(&storage, "Lean").unwrap().name, "Lean");

        let file = temp_dir.path().join("trip.json");
        std::fs::write(&file, r#"{"name": "Trip", "base_month": "2025-08"}"#).unwrap();
        let from_file = resolve_scenario(&storage, file.to_str().unwrap()).unwrap();
        assert_eq!(from_file.name, "Trip");

        assert!(resolve_scenario(&storage, "Nope").unwrap_err().is_not_found());
    }
}
