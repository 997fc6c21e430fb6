//! Display formatting for terminal output
//!
//! Plain-text tables and charts for transactions, budgets, analytics and
//! backups.
//! Every command also has a `--json` form that bypasses this module.

pub mod analytics;
pub mod backup;
pub mod budget;
pub mod report;
pub mod transaction;

pub use analytics::{
    format_category_history, format_deltas, format_insights, format_performance,
    format_saved_scenarios, format_scenario_outcome, format_suggestions, format_trend,
};
pub use backup::{format_age, format_backup_list, format_size};
pub use budget::{format_budget_list, format_template};
pub use transaction::{format_transaction_details, format_transaction_register};
