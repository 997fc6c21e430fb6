//! Storage layer for budget-lens
//!
//! In-memory transaction, budget and saved-scenario stores, each behind a
//! single lock, with JSON snapshots written atomically under the data
//! directory.

pub mod budget;
pub mod file_io;
pub mod init;
pub mod scenarios;
pub mod transactions;

pub use budget::{BudgetKey, BudgetStore, TemplateMap};
pub use file_io::{read_json, write_json_atomic};
pub use init::{builtin_templates, initialize_storage};
pub use scenarios::{SavedScenario, ScenarioStore};
pub use transactions::{TransactionFilter, TransactionQuery, TransactionStore};

use crate::config::paths::LensPaths;
use crate::error::LensResult;

/// Owns every store and the paths they snapshot to
pub struct Storage {
    paths: LensPaths,
    pub transactions: TransactionStore,
    pub budgets: BudgetStore,
    pub scenarios: ScenarioStore,
}

impl Storage {
    /// Create empty stores rooted at `paths`
    pub fn new(paths: LensPaths) -> LensResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            transactions: TransactionStore::new(paths.transactions_file()),
            budgets: BudgetStore::new(paths.budgets_file(), paths.templates_file()),
            scenarios: ScenarioStore::new(paths.scenarios_file()),
            paths,
        })
    }

    pub fn paths(&self) -> &LensPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> LensResult<()> {
        self.transactions.load()?;
        self.budgets.load()?;
        self.scenarios.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> LensResult<()> {
        self.transactions.save()?;
        self.budgets.save()?;
        self.scenarios.save()?;
        Ok(())
    }

    /// Check if storage has been initialized
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }
}
