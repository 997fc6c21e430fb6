//! Budget CLI commands
//!
//! Monthly category ceilings, copying between months, and templates.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::Subcommand;

use super::{parse_amount_arg, parse_month_arg, print_json};
use crate::config::settings::Settings;
use crate::display::{format_budget_list, format_template};
use crate::error::{LensError, LensResult};
use crate::export::load_templates_json;
use crate::storage::Storage;

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Set the ceiling for a category
    Set {
        /// Category name
        category: String,
        /// Amount (e.g., "3000" or "2500.50")
        amount: String,
        /// Budget month (YYYY-MM), defaults to the current month
        #[arg(short = 'M', long)]
        month: Option<String>,
    },
    /// Show the ceiling for a category
    Get {
        /// Category name
        category: String,
        /// Budget month (YYYY-MM)
        #[arg(short = 'M', long)]
        month: Option<String>,
    },
    /// Remove the ceiling for a category
    Remove {
        /// Category name
        category: String,
        /// Budget month (YYYY-MM)
        #[arg(short = 'M', long)]
        month: Option<String>,
    },
    /// List all ceilings for a month
    List {
        /// Budget month (YYYY-MM)
        #[arg(short = 'M', long)]
        month: Option<String>,
    },
    /// Copy every ceiling from one month to another
    Copy {
        /// Source month (YYYY-MM)
        from: String,
        /// Target month (YYYY-MM)
        to: String,
    },
    /// Apply a named template to a month
    ApplyTemplate {
        /// Template name, defaults to the configured default template
        name: Option<String>,
        /// Budget month (YYYY-MM)
        #[arg(short = 'M', long)]
        month: Option<String>,
    },
    /// List templates, or load more from a JSON file
    Templates {
        /// JSON file of `{template: {category: amount}}` to load
        #[arg(short, long)]
        load: Option<PathBuf>,
    },
}

/// Handle a budget command
pub fn handle_budget_command(
    storage: &Storage,
    settings: &Settings,
    cmd: BudgetCommands,
    json: bool,
) -> LensResult<()> {
    let budgets = &storage.budgets;

    match cmd {
        BudgetCommands::Set {
            category,
            amount,
            month,
        } => {
            let month = parse_month_arg(month.as_deref())?;
            let amount = parse_amount_arg(&amount)?;
            budgets.set_budget(month, &category, amount)?;
            println!(
                "Set {} budget for {} to {}",
                category,
                month,
                amount.format_with_symbol(&settings.currency_symbol)
            );
        }

        BudgetCommands::Get { category, month } => {
            let month = parse_month_arg(month.as_deref())?;
            let amount = budgets.get_budget(month, &category)?;
            if json {
                print_json(&serde_json::json!({
                    "month": month,
                    "category": category,
                    "amount": amount,
                }))?;
            } else {
                match amount {
                    Some(amount) => println!(
                        "{} {}: {}",
                        month,
                        category,
                        amount.format_with_symbol(&settings.currency_symbol)
                    ),
                    None => println!("No budget set for {} in {}", category, month),
                }
            }
        }

        BudgetCommands::Remove { category, month } => {
            let month = parse_month_arg(month.as_deref())?;
            let removed = budgets.remove_budget(month, &category)?;
            println!(
                "Removed {} budget for {} (was {})",
                removed.category, removed.month, removed.amount
            );
        }

        BudgetCommands::List { month } => {
            let month = parse_month_arg(month.as_deref())?;
            let entries = budgets.budgets_for_month(month)?;
            if json {
                print_json(&entries)?;
            } else {
                print!("{}", format_budget_list(month, &entries));
            }
        }

        BudgetCommands::Copy { from, to } => {
            let source = parse_month_arg(Some(&from))?;
            let target = parse_month_arg(Some(&to))?;
            let copied = budgets.copy_month(source, target)?;
            println!("Copied {} budget(s) from {} to {}", copied, source, target);
        }

        BudgetCommands::ApplyTemplate { name, month } => {
            let month = parse_month_arg(month.as_deref())?;
            let name = name.unwrap_or_else(|| settings.default_template.clone());
            let applied = budgets.apply_template(&name, month)?;
            println!(
                "Applied template '{}' to {} ({} categories)",
                name, month, applied
            );
        }

        BudgetCommands::Templates { load } => {
            if let Some(path) = load {
                let file = File::open(&path).map_err(|e| {
                    LensError::Io(format!("Failed to open '{}': {}", path.display(), e))
                })?;
                let loaded = load_templates_json(budgets, BufReader::new(file))?;
                println!("Loaded {} template(s) from {}", loaded, path.display());
                return Ok(());
            }

            let mut templates = Vec::new();
            for name in budgets.list_templates()? {
                if let Some(template) = budgets.template(&name)? {
                    templates.push(template);
                }
            }

            if json {
                print_json(&templates)?;
            } else if templates.is_empty() {
                println!("No templates defined. Run 'budget-lens init' to seed the built-ins.");
            } else {
                for template in &templates {
                    print!("{}", format_template(template));
                }
            }
        }
    }

    Ok(())
}
