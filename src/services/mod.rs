//! Service layer for budget-lens
//!
//! Read-only analytics and simulation on top of the stores, plus the keyword
//! categorizer used by imports.

pub mod analytics;
pub mod categorize;
pub mod simulator;

pub use analytics::{compute_performance, trend_direction, AnalyticsEngine};
pub use categorize::{Categorizer, UNCATEGORIZED};
pub use simulator::{compare_scenarios, validate_scenario, Simulator};
