//! Saved scenario store
//!
//! Named what-if scenarios kept in `scenarios.json` so they can be re-run
//! later. Saving under an existing name replaces that scenario.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{LensError, LensResult};
use crate::models::Scenario;

use super::file_io::{read_json, write_json_atomic};

/// A scenario plus when it was last saved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedScenario {
    pub saved_at: DateTime<Utc>,
    pub scenario: Scenario,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ScenarioData {
    #[serde(default)]
    scenarios: Vec<SavedScenario>,
}

/// Owner of saved scenarios, keyed by name
pub struct ScenarioStore {
    path: PathBuf,
    scenarios: RwLock<BTreeMap<String, SavedScenario>>,
}

impl ScenarioStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            scenarios: RwLock::new(BTreeMap::new()),
        }
    }

    fn read(&self) -> LensResult<RwLockReadGuard<'_, BTreeMap<String, SavedScenario>>> {
        self.scenarios
            .read()
            .map_err(|e| LensError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> LensResult<RwLockWriteGuard<'_, BTreeMap<String, SavedScenario>>> {
        self.scenarios
            .write()
            .map_err(|e| LensError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Load saved scenarios from disk, replacing the current contents
    pub fn load(&self) -> LensResult<()> {
        let file_data: ScenarioData = read_json(&self.path)?;
        let mut scenarios = self.write()?;
        *scenarios = file_data
            .scenarios
            .into_iter()
            .map(|saved| (saved.scenario.name.clone(), saved))
            .collect();

        debug!(count = scenarios.len(), "loaded saved scenarios");
        Ok(())
    }

    /// Save scenarios to disk, sorted by name
    pub fn save(&self) -> LensResult<()> {
        let scenarios = self.read()?;
        let file_data = ScenarioData {
            scenarios: scenarios.values().cloned().collect(),
        };
        write_json_atomic(&self.path, &file_data)
    }

    /// Store a scenario under its name; returns true if one was replaced
    pub fn save_scenario(&self, scenario: Scenario) -> LensResult<bool> {
        if scenario.name.trim().is_empty() {
            return Err(LensError::Validation(
                "Scenario name must not be empty".into(),
            ));
        }

        let mut scenarios = self.write()?;
        let name = scenario.name.clone();
        let replaced = scenarios
            .insert(
                name.clone(),
                SavedScenario {
                    saved_at: Utc::now(),
                    scenario,
                },
            )
            .is_some();

        info!(scenario = %name, replaced, "saved scenario");
        Ok(replaced)
    }

    /// Look up a saved scenario by name
    pub fn get(&self, name: &str) -> LensResult<Option<Scenario>> {
        let scenarios = self.read()?;
        Ok(scenarios.get(name).map(|saved| saved.scenario.clone()))
    }

    /// Every saved scenario, sorted by name
    pub fn list(&self) -> LensResult<Vec<SavedScenario>> {
        let scenarios = self.read()?;
        Ok(scenarios.values().cloned().collect())
    }

    /// Delete a saved scenario
    pub fn remove(&self, name: &str) -> LensResult<SavedScenario> {
        let mut scenarios = self.write()?;
        let removed = scenarios
            .remove(name)
            .ok_or_else(|| LensError::scenario_not_found(name))?;

        info!(scenario = %name, "deleted scenario");
        Ok(removed)
    }

    pub fn count(&self) -> LensResult<usize> {
        Ok(self.read()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, YearMonth};
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, ScenarioStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = ScenarioStore::new(temp_dir.path().join("scenarios.json"));
        (temp_dir, store)
    }

    fn road_trip() -> Scenario {
        Scenario::new("Road trip", YearMonth::parse("2025-08").unwrap())
            .with_override("Petrol", Money::from_units(6000))
    }

    #[test]
    fn test_save_get_and_replace() {
        let (_dir, store) = create_test_store();
        assert!(!store.save_scenario(road_trip()).unwrap());
        assert_eq!(store.get("Road trip").unwrap(), Some(road_trip()));

        let bigger = road_trip().with_override("Food", Money::from_units(100));
        assert!(store.save_scenario(bigger.clone()).unwrap());
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.get("Road trip").unwrap(), Some(bigger));
        assert_eq!(store.get("road trip").unwrap(), None);
    }

    #[test]
    fn test_empty_name_rejected() {
        let (_dir, store) = create_test_store();
        let unnamed = Scenario::new("  ", YearMonth::parse("2025-08").unwrap());
        assert!(store.save_scenario(unnamed).unwrap_err().is_validation());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_list_sorted_and_remove() {
        let (_dir, store) = create_test_store();
        store.save_scenario(road_trip()).unwrap();
        store
            .save_scenario(Scenario::new("Diwali", YearMonth::parse("2025-10").unwrap()))
            .unwrap();

        let names: Vec<_> = store
            .list()
            .unwrap()
            .into_iter()
            .map(|s| s.scenario.name)
            .collect();
        assert_eq!(names, vec!["Diwali", "Road trip"]);

        let removed = store.remove("Diwali").unwrap();
        assert_eq!(removed.scenario.name, "Diwali");

        let err = store.remove("Diwali").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Scenario not found: Diwali");
    }

    #[test]
    fn test_save_and_load() {
        let (_dir, store) = create_test_store();
        store.save_scenario(road_trip()).unwrap();
        store.save().unwrap();

        let reloaded = ScenarioStore::new(store.path.clone());
        reloaded.load().unwrap();
        assert_eq!(reloaded.list().unwrap(), store.list().unwrap());
    }
}
