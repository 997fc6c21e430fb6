//! Core data models for budget-lens
//!
//! Stored records (transactions, budgets, templates), the value types they
//! are built from (money, months, ids), and derived analytics results.

pub mod analytics;
pub mod budget;
pub mod ids;
pub mod money;
pub mod month;
pub mod scenario;
pub mod transaction;

pub use analytics::{
    BudgetSuggestion, CategoryDelta, CategoryHistory, CategoryPerformance, Insight, InsightLevel,
    PerformanceStatus, TrendDirection, TrendPoint, TrendResult,
};
pub use budget::{Budget, BudgetTemplate, BudgetValidationError};
pub use ids::TransactionId;
pub use money::{Money, MoneyParseError};
pub use month::{MonthParseError, YearMonth};
pub use scenario::{ImpactDirection, RiskLevel, Scenario, ScenarioImpact, ScenarioOutcome};
pub use transaction::{
    parse_date, Transaction, TransactionPatch, TransactionSource, TransactionValidationError,
};
