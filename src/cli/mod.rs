//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the stores and services.

pub mod analyze;
pub mod backup;
pub mod budget;
pub mod simulate;
pub mod transaction;

pub use analyze::{handle_analyze_command, AnalyzeCommands};
pub use backup::{handle_backup_command, BackupCommands};
pub use budget::{handle_budget_command, BudgetCommands};
pub use simulate::{handle_simulate_command, SimulateCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{LensError, LensResult};
use crate::models::{parse_date, Money, YearMonth};

/// Parse a `YYYY-MM` argument, defaulting to the current month
pub(crate) fn parse_month_arg(month: Option<&str>) -> LensResult<YearMonth> {
    match month {
        Some(s) => YearMonth::parse(s).map_err(|e| {
            LensError::Validation(format!("Invalid month '{}': {}. Use YYYY-MM", s, e))
        }),
        None => Ok(YearMonth::current()),
    }
}

pub(crate) fn parse_amount_arg(amount: &str) -> LensResult<Money> {
    Money::parse(amount).map_err(|e| {
        LensError::Validation(format!(
            "Invalid amount format: '{}'. Use format like '1250' or '-40.50'. Error: {}",
            amount, e
        ))
    })
}

pub(crate) fn parse_date_arg(date: &str) -> LensResult<NaiveDate> {
    parse_date(date).map_err(|_| {
        LensError::Validation(format!("Invalid date format: '{}'. Use YYYY-MM-DD", date))
    })
}

/// Print a payload as indented JSON on stdout
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> LensResult<()> {
    crate::export::write_json(value, std::io::stdout().lock())
}
