//! Analytics CLI commands
//!
//! Read-only views over the stores: trends, budget vs. actual, adherence,
//! suggestions, insights, per-category history and the monthly report.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Subcommand;

use super::{parse_month_arg, print_json};
use crate::config::settings::Settings;
use crate::display::report::format_percentage;
use crate::display::{
    format_category_history, format_insights, format_performance, format_suggestions,
    format_trend,
};
use crate::error::{LensError, LensResult};
use crate::export::{write_json, MonthlyReport};
use crate::services::AnalyticsEngine;
use crate::storage::Storage;

/// Analyze subcommands
#[derive(Subcommand)]
pub enum AnalyzeCommands {
    /// Spending per month over a trailing window
    Trend {
        /// Number of months in the window
        #[arg(short = 'n', long, default_value = "6")]
        months: usize,
        /// Last month of the window (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        end: Option<String>,
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Budget vs. actual per category
    Performance {
        /// Month (YYYY-MM)
        #[arg(short = 'M', long)]
        month: Option<String>,
    },
    /// Total spending for a month
    Total {
        /// Month (YYYY-MM)
        #[arg(short = 'M', long)]
        month: Option<String>,
    },
    /// Total spending as a percentage of total budget
    Adherence {
        /// Month (YYYY-MM)
        #[arg(short = 'M', long)]
        month: Option<String>,
    },
    /// Suggested ceilings for categories far from budget
    Suggest {
        /// Month (YYYY-MM)
        #[arg(short = 'M', long)]
        month: Option<String>,
    },
    /// Observations across a trailing window
    Insights {
        /// Number of months in the window
        #[arg(short = 'n', long, default_value = "3")]
        months: usize,
        /// Last month of the window (YYYY-MM)
        #[arg(short, long)]
        end: Option<String>,
    },
    /// Spending and budget history of one category across all months
    Category {
        /// Category name
        name: String,
    },
    /// Monthly budget vs. actual report as JSON
    Report {
        /// Month (YYYY-MM)
        #[arg(short = 'M', long)]
        month: Option<String>,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle an analyze command
pub fn handle_analyze_command(
    storage: &Storage,
    settings: &Settings,
    cmd: AnalyzeCommands,
    json: bool,
) -> LensResult<()> {
    let engine = AnalyticsEngine::from_storage(storage, settings.analytics);

    match cmd {
        AnalyzeCommands::Trend {
            months,
            end,
            category,
        } => {
            let window = parse_month_arg(end.as_deref())?.trailing(months);
            let trend = engine.spending_trend(&window, category.as_deref())?;
            if json {
                print_json(&trend)?;
            } else {
                print!("{}", format_trend(&trend));
            }
        }

        AnalyzeCommands::Performance { month } => {
            let month = parse_month_arg(month.as_deref())?;
            let rows = engine.category_performance(month)?;
            if json {
                print_json(&rows)?;
            } else {
                println!("Budget vs. actual: {}", month.label());
                print!("{}", format_performance(&rows));
            }
        }

        AnalyzeCommands::Total { month } => {
            let month = parse_month_arg(month.as_deref())?;
            let total = engine.project_monthly_total(month)?;
            if json {
                print_json(&serde_json::json!({ "month": month, "total": total }))?;
            } else {
                println!(
                    "Total spending for {}: {}",
                    month,
                    total.format_with_symbol(&settings.currency_symbol)
                );
            }
        }

        AnalyzeCommands::Adherence { month } => {
            let month = parse_month_arg(month.as_deref())?;
            let adherence = engine.budget_adherence(month)?;
            let over = engine.over_budget_categories(month)?;
            if json {
                print_json(&serde_json::json!({
                    "month": month,
                    "adherence_pct": adherence,
                    "over_budget": over,
                }))?;
            } else {
                println!(
                    "Spent {} of budget in {}",
                    format_percentage(adherence),
                    month
                );
                if !over.is_empty() {
                    println!("Over budget: {}", over.join(", "));
                }
            }
        }

        AnalyzeCommands::Suggest { month } => {
            let month = parse_month_arg(month.as_deref())?;
            let suggestions = engine.suggest_budget_adjustments(month)?;
            if json {
                print_json(&suggestions)?;
            } else {
                print!("{}", format_suggestions(&suggestions));
            }
        }

        AnalyzeCommands::Insights { months, end } => {
            let window = parse_month_arg(end.as_deref())?.trailing(months);
            let insights = engine.insights(&window)?;
            if json {
                print_json(&insights)?;
            } else {
                print!("{}", format_insights(&insights));
            }
        }

        AnalyzeCommands::Category { name } => {
            let history = engine.analyze_category(&name)?;
            if json {
                print_json(&history)?;
            } else {
                print!("{}", format_category_history(&history));
            }
        }

        AnalyzeCommands::Report { month, output } => {
            let month = parse_month_arg(month.as_deref())?;
            let report = MonthlyReport::generate(&engine, month)?;
            match output {
                Some(path) => {
                    let file = File::create(&path).map_err(|e| {
                        LensError::Export(format!("Failed to create '{}': {}", path.display(), e))
                    })?;
                    write_json(&report, BufWriter::new(file))?;
                    println!("Wrote report for {} to {}", month, path.display());
                }
                None => print_json(&report)?,
            }
        }
    }

    Ok(())
}
