//! Derived analytics results
//!
//! These types are computed on demand by the analytics engine and simulator
//! and are never stored. They serialize with field names as-is for JSON
//! export.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;
use super::month::YearMonth;

/// Direction of a spending trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Rising,
    Falling,
    Stable,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Rising => "rising",
            Self::Falling => "falling",
            Self::Stable => "stable",
        };
        f.pad(s)
    }
}

/// Total spending for one period of a trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub period: YearMonth,
    pub total: Money,
}

/// Spending over a sequence of months
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    /// Category the trend was restricted to, if any
    pub category: Option<String>,
    /// Per-period totals, in the order requested
    pub periods: Vec<TrendPoint>,
    pub direction: TrendDirection,
    /// Arithmetic mean of the period totals
    pub average: Money,
    pub total: Money,
    pub min: Money,
    pub max: Money,
}

/// How a category is doing against its ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceStatus {
    Under,
    Near,
    Over,
}

impl fmt::Display for PerformanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Under => "under",
            Self::Near => "near",
            Self::Over => "over",
        };
        f.pad(s)
    }
}

/// Budget vs. actual for one category in one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPerformance {
    pub category: String,
    pub budgeted: Money,
    pub actual: Money,
    /// budgeted - actual; positive means under budget
    pub variance: Money,
    /// variance as a percentage of budgeted (58.3 means 58.3%)
    pub variance_pct: f64,
    pub status: PerformanceStatus,
}

/// Per-category difference between two scenarios (`after - before`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDelta {
    pub category: String,
    pub budgeted: Money,
    pub actual: Money,
    pub variance: Money,
    pub variance_pct: f64,
    /// Status on the `before` side; `None` when the category was absent there
    pub status_before: Option<PerformanceStatus>,
    /// Status on the `after` side; `None` when the category was absent there
    pub status_after: Option<PerformanceStatus>,
}

/// A proposed new ceiling for a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSuggestion {
    pub category: String,
    pub current: Money,
    pub actual: Money,
    pub suggested: Money,
}

/// One category's record across every month in which it had spending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryHistory {
    pub category: String,
    /// Months with positive net spending in the category
    pub months_with_data: usize,
    /// Of those, months where spending exceeded a positive ceiling
    pub months_over_budget: usize,
    pub total_spent: Money,
    /// Sum of positive ceilings over the months with data
    pub total_budget: Money,
    pub average_monthly: Money,
    /// total_spent as a percentage of total_budget; 0 when nothing was budgeted
    pub adherence_pct: f64,
    pub first_month: Option<YearMonth>,
    pub last_month: Option<YearMonth>,
}

/// Severity of an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightLevel {
    Positive,
    Warning,
}

/// A short, actionable observation about spending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub level: InsightLevel,
    pub category: Option<String>,
    pub message: String,
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.level {
            InsightLevel::Positive => "+",
            InsightLevel::Warning => "!",
        };
        write!(f, "[{}] {}", marker, self.message)
    }
}
