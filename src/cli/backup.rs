//! Backup CLI commands
//!
//! These run before the stores are loaded, so a data directory that no
//! longer loads can still be restored.

use clap::Subcommand;

use super::print_json;
use crate::backup::{BackupManager, RestoreManager};
use crate::config::paths::LensPaths;
use crate::config::settings::Settings;
use crate::display::{format_backup_list, format_size};
use crate::error::LensResult;

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Back up all data files
    Create {
        /// Tag added to the backup filename
        #[arg(short, long)]
        label: Option<String>,
    },

    /// List available backups, newest first
    List,

    /// Check that a backup loads and show what it holds
    Info {
        /// Backup filename, path, or 'latest'
        backup: String,
    },

    /// Replace all data with a backup
    Restore {
        /// Backup filename, path, or 'latest'
        backup: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Delete backups the retention policy no longer keeps
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a backup command
pub fn handle_backup_command(
    paths: &LensPaths,
    settings: &Settings,
    cmd: BackupCommands,
    json: bool,
) -> LensResult<()> {
    let retention = settings.backup_retention;
    let manager = BackupManager::new(paths.clone(), retention);

    match cmd {
        BackupCommands::Create { label } => {
            let (path, pruned) = manager.create_backup_with_retention(label.as_deref())?;
            if json {
                print_json(&serde_json::json!({ "path": path, "pruned": pruned }))?;
            } else {
                println!("Backup created: {}", path.display());
                if !pruned.is_empty() {
                    println!("Pruned {} old backup(s)", pruned.len());
                }
            }
        }

        BackupCommands::List => {
            let backups = manager.list_backups()?;
            if json {
                print_json(&backups)?;
            } else {
                print!("{}", format_backup_list(&backups, chrono::Utc::now()));
            }
        }

        BackupCommands::Info { backup } => {
            let path = manager.resolve(&backup)?;
            let validation = RestoreManager::new(paths.clone(), retention).validate_backup(&path)?;
            if json {
                print_json(&validation)?;
            } else {
                let size = std::fs::metadata(&path)?.len();
                println!("Backup Details");
                println!("==============");
                println!("File:     {}", path.display());
                println!("Size:     {}", format_size(size));
                println!(
                    "Created:  {}",
                    validation.backup_date.format("%Y-%m-%d %H:%M:%S UTC")
                );
                println!("Schema:   v{}", validation.schema_version);
                println!("Contents: {}", validation.summary());
                if !validation.is_complete() {
                    println!("Present:  {}", validation.sections.join(", "));
                }
            }
        }

        BackupCommands::Restore { backup, force } => {
            let path = manager.resolve(&backup)?;
            let restore = RestoreManager::new(paths.clone(), retention);

            if !force {
                let validation = restore.validate_backup(&path)?;
                println!("Backup: {}", path.display());
                println!("Contents: {}", validation.summary());
                println!();
                println!("WARNING: This will overwrite ALL current data!");
                println!("To proceed, run again with --force:");
                println!("  budget-lens backup restore {} --force", backup);
                return Ok(());
            }

            let result = restore.restore_from_file(&path)?;
            if json {
                print_json(&result)?;
            } else {
                if let Some(pre) = &result.pre_restore_backup {
                    println!("Previous data saved to: {}", pre.display());
                }
                println!("{}", result.summary());
            }
        }

        BackupCommands::Prune { force } => {
            let expired = manager.expired_backups(chrono::Utc::now())?;
            if expired.is_empty() {
                println!(
                    "No backups to prune (keeping the newest {} and anything under {} days old).",
                    retention.keep_latest, retention.max_age_days
                );
                return Ok(());
            }

            if !force {
                println!("{} backup(s) would be deleted:", expired.len());
                for backup in &expired {
                    println!("  {}", backup.filename);
                }
                println!("To delete them, run again with --force.");
                return Ok(());
            }

            let deleted = manager.enforce_retention()?;
            println!("Deleted {} backup(s).", deleted.len());
        }
    }

    Ok(())
}
