//! Transaction CLI commands
//!
//! Implements CLI commands for recording, listing, editing and moving
//! transactions in and out of CSV files.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use clap::Subcommand;

use super::{parse_amount_arg, parse_date_arg, parse_month_arg, print_json};
use crate::config::settings::Settings;
use crate::display::{format_transaction_details, format_transaction_register};
use crate::error::{LensError, LensResult};
use crate::export::{export_store_csv, import_transactions_csv};
use crate::models::{Transaction, TransactionPatch};
use crate::services::Categorizer;
use crate::storage::{Storage, TransactionFilter};

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Record a new transaction
    Add {
        /// Amount (e.g., "1250" or "-40.50" for a refund)
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Category name; inferred from the description when omitted
        #[arg(short, long)]
        category: Option<String>,
        /// Transaction date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Description
        #[arg(short = 'm', long)]
        description: Option<String>,
    },
    /// List transactions
    List {
        /// Only this month (YYYY-MM)
        #[arg(short = 'M', long)]
        month: Option<String>,
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Show transaction details
    Show {
        /// Transaction ID or short prefix
        id: String,
    },
    /// Edit a transaction
    Edit {
        /// Transaction ID or short prefix
        id: String,
        /// New amount
        #[arg(short, long)]
        amount: Option<String>,
        /// New category
        #[arg(short, long)]
        category: Option<String>,
        /// New date
        #[arg(short, long)]
        date: Option<String>,
        /// New description
        #[arg(short = 'm', long)]
        description: Option<String>,
    },
    /// Delete a transaction
    Remove {
        /// Transaction ID or short prefix
        id: String,
    },
    /// Import transactions from a CSV file
    Import {
        /// Path to CSV file
        file: PathBuf,
    },
    /// Export transactions to a CSV file
    Export {
        /// Output file path
        output: PathBuf,
        /// Only this month (YYYY-MM)
        #[arg(short = 'M', long)]
        month: Option<String>,
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,
    },
}

fn find_transaction(storage: &Storage, id: &str) -> LensResult<Transaction> {
    storage
        .transactions
        .find_by_prefix(id)?
        .ok_or_else(|| LensError::transaction_not_found(id))
}

fn build_filter(
    month: Option<String>,
    category: Option<String>,
    from: Option<String>,
    to: Option<String>,
) -> LensResult<TransactionFilter> {
    let mut filter = TransactionFilter::new();
    if let Some(month) = month {
        filter = filter.month(parse_month_arg(Some(&month))?);
    }
    if let Some(category) = category {
        filter = filter.category(category);
    }
    if from.is_some() || to.is_some() {
        let from = match from {
            Some(s) => parse_date_arg(&s)?,
            None => chrono::NaiveDate::MIN,
        };
        let to = match to {
            Some(s) => parse_date_arg(&s)?,
            None => chrono::NaiveDate::MAX,
        };
        filter = filter.between(from, to);
    }
    Ok(filter)
}

/// Handle a transaction command
pub fn handle_transaction_command(
    storage: &Storage,
    settings: &Settings,
    cmd: TransactionCommands,
    json: bool,
) -> LensResult<()> {
    match cmd {
        TransactionCommands::Add {
            amount,
            category,
            date,
            description,
        } => {
            let amount = parse_amount_arg(&amount)?;
            let date = match date {
                Some(s) => parse_date_arg(&s)?,
                None => chrono::Local::now().date_naive(),
            };
            let description = description.unwrap_or_default();

            let category = match category {
                Some(category) => category,
                None => {
                    let categorizer = Categorizer::new(&settings.category_keywords);
                    let category = categorizer.categorize_or_default(&description);
                    if !json {
                        println!("Auto-categorized as '{}'", category);
                    }
                    category
                }
            };

            let txn = Transaction::new(date, category, amount).with_description(description);
            let id = storage.transactions.add(txn)?;
            let txn = storage
                .transactions
                .get(id)?
                .ok_or_else(|| LensError::transaction_not_found(id.to_string()))?;

            if json {
                print_json(&txn)?;
            } else {
                println!("Created transaction:");
                print!("{}", format_transaction_details(&txn));
            }
        }

        TransactionCommands::List {
            month,
            category,
            from,
            to,
        } => {
            let filter = build_filter(month, category, from, to)?;
            let transactions = storage.transactions.query(filter)?.to_vec();

            if json {
                print_json(&transactions)?;
            } else {
                print!("{}", format_transaction_register(&transactions));
            }
        }

        TransactionCommands::Show { id } => {
            let txn = find_transaction(storage, &id)?;
            if json {
                print_json(&txn)?;
            } else {
                print!("{}", format_transaction_details(&txn));
            }
        }

        TransactionCommands::Edit {
            id,
            amount,
            category,
            date,
            description,
        } => {
            let txn = find_transaction(storage, &id)?;

            let mut patch = TransactionPatch::new();
            if let Some(amount) = amount {
                patch = patch.amount(parse_amount_arg(&amount)?);
            }
            if let Some(category) = category {
                patch = patch.category(category);
            }
            if let Some(date) = date {
                patch = patch.date(parse_date_arg(&date)?);
            }
            if let Some(description) = description {
                patch = patch.description(description);
            }

            if patch.is_empty() {
                println!(
                    "No changes specified. Use --amount, --category, --date, or --description."
                );
                return Ok(());
            }

            let updated = storage.transactions.update(txn.id, &patch)?;
            if json {
                print_json(&updated)?;
            } else {
                println!("Updated transaction:");
                print!("{}", format_transaction_details(&updated));
            }
        }

        TransactionCommands::Remove { id } => {
            let txn = find_transaction(storage, &id)?;
            let removed = storage.transactions.remove(txn.id)?;
            if json {
                print_json(&removed)?;
            } else {
                println!(
                    "Deleted transaction {} ({} {} {})",
                    removed.id.short(),
                    removed.date,
                    removed.category,
                    removed.amount
                );
            }
        }

        TransactionCommands::Import { file } => {
            let reader = File::open(&file).map_err(|e| {
                LensError::Io(format!("Failed to open '{}': {}", file.display(), e))
            })?;
            let categorizer = Categorizer::new(&settings.category_keywords);
            let summary =
                import_transactions_csv(&storage.transactions, BufReader::new(reader), &categorizer)?;

            if json {
                print_json(&serde_json::json!({
                    "imported": summary.imported,
                    "auto_categorized": summary.auto_categorized,
                }))?;
            } else {
                println!(
                    "Imported {} transaction(s) from {}",
                    summary.imported,
                    file.display()
                );
                if summary.auto_categorized > 0 {
                    println!("  {} auto-categorized", summary.auto_categorized);
                }
            }
        }

        TransactionCommands::Export {
            output,
            month,
            category,
        } => {
            let filter = build_filter(month, category, None, None)?;
            let file = File::create(&output).map_err(|e| {
                LensError::Export(format!("Failed to create '{}': {}", output.display(), e))
            })?;
            let rows = export_store_csv(&storage.transactions, filter, BufWriter::new(file))?;
            println!("Exported {} transaction(s) to {}", rows, output.display());
        }
    }

    Ok(())
}
