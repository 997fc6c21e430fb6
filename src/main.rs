use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use budget_lens::cli::{
    handle_analyze_command, handle_backup_command, handle_budget_command,
    handle_simulate_command, handle_transaction_command, AnalyzeCommands, BackupCommands,
    BudgetCommands, SimulateCommands, TransactionCommands,
};
use budget_lens::config::{paths::LensPaths, settings::Settings};
use budget_lens::storage::init::{initialize_storage, needs_initialization};
use budget_lens::storage::Storage;

#[derive(Parser)]
#[command(
    name = "budget-lens",
    version,
    about = "Budget and transaction analytics with what-if simulation",
    long_about = "budget-lens records categorized spending and monthly budget ceilings, \
                  then reports trends, budget vs. actual, suggestions and insights. \
                  Scenarios let you try hypothetical spending or budget changes \
                  without touching your data."
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Transaction management commands
    #[command(subcommand, alias = "txn")]
    Transaction(TransactionCommands),

    /// Budget management commands
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Spending analytics
    #[command(subcommand)]
    Analyze(AnalyzeCommands),

    /// What-if scenarios
    #[command(subcommand, alias = "sim")]
    Simulate(SimulateCommands),

    /// Backup and restore all data
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Initialize the data directory and built-in templates
    Init,

    /// Show current configuration and paths
    Config,
}

fn init_logging(verbose: bool) {
    // RUST_LOG wins over --verbose
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn load_storage(paths: &LensPaths) -> Result<Storage> {
    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;
    Ok(storage)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Initialize paths and settings
    let paths = LensPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    // First run: seed the built-in templates so apply-template works before `init`
    let first_run = needs_initialization(&paths);
    if first_run {
        initialize_storage(&paths)?;
    }

    let json = cli.json;
    match cli.command {
        Some(Commands::Transaction(cmd)) => {
            let storage = load_storage(&paths)?;
            handle_transaction_command(&storage, &settings, cmd, json)?;
            storage.save_all()?;
        }
        Some(Commands::Budget(cmd)) => {
            let storage = load_storage(&paths)?;
            handle_budget_command(&storage, &settings, cmd, json)?;
            storage.save_all()?;
        }
        Some(Commands::Analyze(cmd)) => {
            let storage = load_storage(&paths)?;
            handle_analyze_command(&storage, &settings, cmd, json)?;
        }
        Some(Commands::Simulate(cmd)) => {
            let storage = load_storage(&paths)?;
            handle_simulate_command(&storage, &settings, cmd, json)?;
            storage.save_all()?;
        }
        Some(Commands::Backup(cmd)) => {
            // Works on the files directly so data that fails to load can still be restored
            handle_backup_command(&paths, &settings, cmd, json)?;
        }
        Some(Commands::Init) => {
            if !first_run {
                println!(
                    "budget-lens is already initialized at: {}",
                    paths.base_dir().display()
                );
                return Ok(());
            }
            println!("Initializing budget-lens at: {}", paths.base_dir().display());
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Built-in budget templates: Conservative, Moderate, Aggressive");
            println!("Run 'budget-lens budget templates' to see them.");
        }
        Some(Commands::Config) => {
            if json {
                serde_json::to_writer_pretty(std::io::stdout().lock(), &settings)?;
                println!();
            } else {
                println!("budget-lens Configuration");
                println!("=========================");
                println!("Base directory:    {}", paths.base_dir().display());
                println!("Data directory:    {}", paths.data_dir().display());
                println!("Exports directory: {}", paths.exports_dir().display());
                println!("Backups directory: {}", paths.backup_dir().display());
                println!("Settings file:     {}", paths.settings_file().display());
                println!();
                println!("Settings:");
                println!("  Currency symbol:     {}", settings.currency_symbol);
                println!("  Default template:    {}", settings.default_template);
                println!(
                    "  Trend threshold:     {:.0}%",
                    settings.analytics.trend_threshold * 100.0
                );
                println!(
                    "  Near-budget margin:  {:.0}%",
                    settings.analytics.near_budget_margin * 100.0
                );
                println!(
                    "  Risk thresholds:     medium {}, high {}",
                    settings.simulation.medium_risk_threshold,
                    settings.simulation.high_risk_threshold
                );
                println!(
                    "  Backup retention:    newest {}, then {} days",
                    settings.backup_retention.keep_latest,
                    settings.backup_retention.max_age_days
                );
            }
        }
        None => {
            println!("budget-lens - budget and transaction analytics");
            println!();
            println!("Run 'budget-lens --help' for usage information.");
        }
    }

    Ok(())
}
