//! JSON import and export
//!
//! Derived analytics payloads are written as indented UTF-8 JSON. Budget
//! template files and scenario files are read from JSON.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LensError, LensResult};
use crate::models::{CategoryPerformance, Money, Scenario, YearMonth};
use crate::services::AnalyticsEngine;
use crate::storage::{BudgetStore, TemplateMap};

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Write any serializable payload as indented JSON
pub fn write_json<T, W>(value: &T, mut writer: W) -> LensResult<()>
where
    T: Serialize + ?Sized,
    W: Write,
{
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| LensError::Export(format!("Failed to serialize JSON: {}", e)))?;
    writeln!(writer).map_err(|e| LensError::Export(e.to_string()))?;
    writer
        .flush()
        .map_err(|e| LensError::Export(e.to_string()))
}

/// Render any serializable payload as an indented JSON string
pub fn to_json_string<T: Serialize + ?Sized>(value: &T) -> LensResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| LensError::Export(format!("Failed to serialize JSON: {}", e)))
}

/// Parse a `{template: {category: amount}}` file
///
/// Negative or non-numeric amounts are a `Parse` error.
pub fn parse_templates_json<R: Read>(reader: R) -> LensResult<TemplateMap> {
    let raw: BTreeMap<String, BTreeMap<String, f64>> = serde_json::from_reader(reader)
        .map_err(|e| LensError::Parse(format!("Invalid template file: {}", e)))?;

    let mut templates = TemplateMap::new();
    for (name, lines) in raw {
        let mut amounts = BTreeMap::new();
        for (category, value) in lines {
            let amount = Money::from_f64(value).map_err(|e| {
                LensError::Parse(format!("Template '{}', category '{}': {}", name, category, e))
            })?;
            if amount.is_negative() {
                return Err(LensError::Parse(format!(
                    "Template '{}', category '{}': amount cannot be negative ({})",
                    name, category, amount
                )));
            }
            amounts.insert(category, amount);
        }
        templates.insert(name, amounts);
    }
    Ok(templates)
}

/// Parse a template file and add every template to the store
pub fn load_templates_json<R: Read>(store: &BudgetStore, reader: R) -> LensResult<usize> {
    let templates = parse_templates_json(reader)?;
    store.load_templates(templates)
}

/// Parse a scenario file
pub fn read_scenario_json<R: Read>(reader: R) -> LensResult<Scenario> {
    serde_json::from_reader(reader)
        .map_err(|e| LensError::Parse(format!("Invalid scenario file: {}", e)))
}

/// Budget vs. actual for one month, for sharing or archiving
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub app_version: String,
    pub month: YearMonth,
    pub total_spending: Money,
    pub total_budget: Money,
    /// Total spending as a percentage of total budget
    pub adherence_pct: f64,
    pub categories: Vec<CategoryPerformance>,
}

impl MonthlyReport {
    /// Build the report from current store contents
    pub fn generate(engine: &AnalyticsEngine<'_>, month: YearMonth) -> LensResult<Self> {
        let categories = engine.category_performance(month)?;
        let total_budget = categories.iter().map(|c| c.budgeted).sum();

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            month,
            total_spending: engine.project_monthly_total(month)?,
            total_budget,
            adherence_pct: engine.budget_adherence(month)?,
            categories,
        })
    }
}
