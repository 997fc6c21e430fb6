//! What-if scenario model
//!
//! A scenario bundles hypothetical transactions and budget overrides for one
//! month so it can be saved as JSON, shared, and re-run against live data.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::analytics::{CategoryDelta, CategoryPerformance};
use super::money::Money;
use super::month::YearMonth;
use super::transaction::Transaction;

/// A named set of hypothetical changes for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub base_month: YearMonth,

    /// Transactions layered on top of the real ones
    #[serde(default)]
    pub transactions: Vec<Transaction>,

    /// Replacement ceilings by category
    #[serde(default)]
    pub budget_overrides: BTreeMap<String, Money>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, base_month: YearMonth) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            base_month,
            transactions: Vec::new(),
            budget_overrides: BTreeMap::new(),
        }
    }

    /// Add a hypothetical transaction (builder style)
    pub fn with_transaction(mut self, transaction: Transaction) -> Self {
        self.transactions.push(transaction);
        self
    }

    /// Override a category ceiling (builder style)
    pub fn with_override(mut self, category: impl Into<String>, amount: Money) -> Self {
        self.budget_overrides.insert(category.into(), amount);
        self
    }
}

/// Whether a scenario raises or lowers the numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactDirection {
    Increase,
    Decrease,
    Neutral,
}

impl fmt::Display for ImpactDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Increase => "increase",
            Self::Decrease => "decrease",
            Self::Neutral => "neutral",
        };
        f.pad(s)
    }
}

/// Size of a scenario's effect relative to configured thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.pad(s)
    }
}

/// Summary of how a scenario moves totals for its month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioImpact {
    pub net_budget_change: Money,
    pub net_spending_change: Money,
    pub direction: ImpactDirection,
    pub risk: RiskLevel,
    /// Categories whose status changed between baseline and scenario
    pub status_changes: Vec<String>,
    pub recommendation: String,
}

/// Everything produced by running a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub month: YearMonth,
    pub baseline: Vec<CategoryPerformance>,
    pub simulated: Vec<CategoryPerformance>,
    pub deltas: Vec<CategoryDelta>,
    pub impact: ScenarioImpact,
}
