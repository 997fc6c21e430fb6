//! Budget store
//!
//! Per-(month, category) ceilings plus named templates. Budgets snapshot to
//! `budgets.json`, templates to `templates.json`.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{LensError, LensResult};
use crate::models::{Budget, BudgetTemplate, Money, YearMonth};

use super::file_io::{read_json, write_json_atomic};

/// Serializable budget data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct BudgetData {
    #[serde(default)]
    budgets: Vec<Budget>,
}

/// Template file layout: `{template: {category: amount}}`
pub type TemplateMap = BTreeMap<String, BTreeMap<String, Money>>;

/// Composite key for budget entries
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BudgetKey {
    pub month: YearMonth,
    pub category: String,
}

impl BudgetKey {
    pub fn new(month: YearMonth, category: impl Into<String>) -> Self {
        Self {
            month,
            category: category.into(),
        }
    }
}

#[derive(Debug, Default)]
struct BudgetState {
    budgets: BTreeMap<BudgetKey, Budget>,
    templates: BTreeMap<String, BudgetTemplate>,
}

impl BudgetState {
    fn upsert(&mut self, month: YearMonth, category: &str, amount: Money) {
        let key = BudgetKey::new(month, category);
        match self.budgets.get_mut(&key) {
            Some(existing) => {
                existing.amount = amount;
                existing.updated_at = Utc::now();
            }
            None => {
                self.budgets
                    .insert(key, Budget::new(month, category, amount));
            }
        }
    }

    fn month_entries(&self, month: YearMonth) -> impl Iterator<Item = &Budget> + '_ {
        self.budgets
            .range(BudgetKey::new(month, "")..)
            .take_while(move |(key, _)| key.month == month)
            .map(|(_, budget)| budget)
    }
}

/// Owner of budget ceilings and templates
pub struct BudgetStore {
    budgets_path: PathBuf,
    templates_path: PathBuf,
    state: RwLock<BudgetState>,
}

impl BudgetStore {
    /// Create an empty store
    pub fn new(budgets_path: PathBuf, templates_path: PathBuf) -> Self {
        Self {
            budgets_path,
            templates_path,
            state: RwLock::new(BudgetState::default()),
        }
    }

    fn read(&self) -> LensResult<RwLockReadGuard<'_, BudgetState>> {
        self.state
            .read()
            .map_err(|e| LensError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> LensResult<RwLockWriteGuard<'_, BudgetState>> {
        self.state
            .write()
            .map_err(|e| LensError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Load budgets and templates from disk
    pub fn load(&self) -> LensResult<()> {
        let file_data: BudgetData = read_json(&self.budgets_path)?;
        let template_data: TemplateMap = read_json(&self.templates_path)?;

        let mut budgets = BTreeMap::new();
        for budget in file_data.budgets {
            budget.validate().map_err(|e| {
                LensError::Storage(format!("{}: {}", self.budgets_path.display(), e))
            })?;
            budgets.insert(BudgetKey::new(budget.month, budget.category.clone()), budget);
        }

        let templates = build_templates(template_data).map_err(|e| {
            LensError::Storage(format!("{}: {}", self.templates_path.display(), e))
        })?;

        let mut state = self.write()?;
        state.budgets = budgets;
        state.templates = templates;

        debug!(
            budgets = state.budgets.len(),
            templates = state.templates.len(),
            "loaded budget store"
        );
        Ok(())
    }

    /// Save budgets and templates to disk
    pub fn save(&self) -> LensResult<()> {
        let state = self.read()?;

        let file_data = BudgetData {
            budgets: state.budgets.values().cloned().collect(),
        };
        write_json_atomic(&self.budgets_path, &file_data)?;

        let templates: TemplateMap = state
            .templates
            .values()
            .map(|t| (t.name.clone(), t.amounts.clone()))
            .collect();
        write_json_atomic(&self.templates_path, &templates)
    }

    /// Set the ceiling for a category in a month, overwriting any existing one
    pub fn set_budget(&self, month: YearMonth, category: &str, amount: Money) -> LensResult<()> {
        Budget::new(month, category, amount)
            .validate()
            .map_err(|e| LensError::Validation(e.to_string()))?;

        let mut state = self.write()?;
        state.upsert(month, category, amount);

        debug!(%month, category, %amount, "set budget");
        Ok(())
    }

    /// Get the ceiling for a category; `None` means no ceiling was set
    pub fn get_budget(&self, month: YearMonth, category: &str) -> LensResult<Option<Money>> {
        let state = self.read()?;
        Ok(state
            .budgets
            .get(&BudgetKey::new(month, category))
            .map(|b| b.amount))
    }

    /// Remove the ceiling for a category
    pub fn remove_budget(&self, month: YearMonth, category: &str) -> LensResult<Budget> {
        let mut state = self.write()?;
        let removed = state
            .budgets
            .remove(&BudgetKey::new(month, category))
            .ok_or_else(|| LensError::budget_not_found(format!("{} {}", month, category)))?;

        debug!(%month, category, "removed budget");
        Ok(removed)
    }

    /// All budgets for a month, sorted by category
    pub fn budgets_for_month(&self, month: YearMonth) -> LensResult<Vec<Budget>> {
        let state = self.read()?;
        Ok(state.month_entries(month).cloned().collect())
    }

    /// Ceilings for a month keyed by category
    pub fn budget_map(&self, month: YearMonth) -> LensResult<BTreeMap<String, Money>> {
        let state = self.read()?;
        Ok(state
            .month_entries(month)
            .map(|b| (b.category.clone(), b.amount))
            .collect())
    }

    /// Every stored budget, by month then category
    pub fn get_all(&self) -> LensResult<Vec<Budget>> {
        let state = self.read()?;
        Ok(state.budgets.values().cloned().collect())
    }

    /// Sum of all ceilings in a month
    pub fn total_budget(&self, month: YearMonth) -> LensResult<Money> {
        let state = self.read()?;
        Ok(state.month_entries(month).map(|b| b.amount).sum())
    }

    /// Copy every budget of `source` into `target`, overwriting existing keys
    pub fn copy_month(&self, source: YearMonth, target: YearMonth) -> LensResult<usize> {
        let mut state = self.write()?;

        let lines: Vec<(String, Money)> = state
            .month_entries(source)
            .map(|b| (b.category.clone(), b.amount))
            .collect();

        if lines.is_empty() {
            return Err(LensError::budget_not_found(source.to_string()));
        }

        for (category, amount) in &lines {
            state.upsert(target, category, *amount);
        }

        info!(%source, %target, count = lines.len(), "copied budgets");
        Ok(lines.len())
    }

    /// Write one budget per template entry into `month`
    ///
    /// Returns the number of categories written. Applying the same template
    /// twice leaves the store as after the first application.
    pub fn apply_template(&self, name: &str, month: YearMonth) -> LensResult<usize> {
        let mut state = self.write()?;

        let lines: Vec<(String, Money)> = state
            .templates
            .get(name)
            .ok_or_else(|| LensError::template_not_found(name))?
            .amounts
            .iter()
            .map(|(category, amount)| (category.clone(), *amount))
            .collect();

        let mut applied = 0;
        for (category, amount) in &lines {
            let key = BudgetKey::new(month, category.as_str());
            if state.budgets.get(&key).map(|b| b.amount) != Some(*amount) {
                state.upsert(month, category, *amount);
            }
            applied += 1;
        }

        info!(template = name, %month, applied, "applied budget template");
        Ok(applied)
    }

    /// Add a template, replacing any template with the same name
    pub fn add_template(&self, template: BudgetTemplate) -> LensResult<()> {
        template
            .validate()
            .map_err(|e| LensError::Validation(e.to_string()))?;

        let mut state = self.write()?;
        debug!(template = %template.name, lines = template.amounts.len(), "added template");
        state.templates.insert(template.name.clone(), template);
        Ok(())
    }

    /// Add every template in a `{name: {category: amount}}` map
    ///
    /// Nothing is added unless every template is valid.
    pub fn load_templates(&self, templates: TemplateMap) -> LensResult<usize> {
        let templates =
            build_templates(templates).map_err(|e| LensError::Validation(e.to_string()))?;

        let mut state = self.write()?;
        let count = templates.len();
        state.templates.extend(templates);

        info!(count, "loaded templates");
        Ok(count)
    }

    /// Template names, sorted
    pub fn list_templates(&self) -> LensResult<Vec<String>> {
        let state = self.read()?;
        Ok(state.templates.keys().cloned().collect())
    }

    /// Look up a template by name
    pub fn template(&self, name: &str) -> LensResult<Option<BudgetTemplate>> {
        let state = self.read()?;
        Ok(state.templates.get(name).cloned())
    }

    /// Hash of budgets and templates
    pub fn fingerprint(&self) -> LensResult<u64> {
        let state = self.read()?;
        let mut hasher = DefaultHasher::new();
        state.budgets.len().hash(&mut hasher);
        for (key, budget) in &state.budgets {
            key.hash(&mut hasher);
            budget.amount.hash(&mut hasher);
            budget.updated_at.hash(&mut hasher);
        }
        state.templates.len().hash(&mut hasher);
        for template in state.templates.values() {
            template.name.hash(&mut hasher);
            template.amounts.hash(&mut hasher);
        }
        Ok(hasher.finish())
    }
}

fn build_templates(
    data: TemplateMap,
) -> Result<BTreeMap<String, BudgetTemplate>, crate::models::BudgetValidationError> {
    let mut templates = BTreeMap::new();
    for (name, amounts) in data {
        let template = BudgetTemplate { name, amounts };
        template.validate()?;
        templates.insert(template.name.clone(), template);
    }
    Ok(templates)
}
