//! Backup system for budget-lens
//!
//! Point-in-time copies of every data file, stored as single JSON archives
//! under the `backups/` directory, with age-based pruning and a restore that
//! never leaves the data directory unloadable.
//!
//! # Archive format
//!
//! - `schema_version`: archive layout version
//! - `created_at`: when the backup was taken
//! - `app_version`: crate version that wrote it
//! - `transactions`, `budgets`, `templates`, `scenarios`: the snapshot files
//!   verbatim, or `null` when the file did not exist
//!
//! # Example
//!
//! ```rust,ignore
//! use budget_lens::backup::{BackupManager, RestoreManager};
//! use budget_lens::config::{BackupRetention, LensPaths};
//!
//! let paths = LensPaths::new()?;
//! let manager = BackupManager::new(paths.clone(), BackupRetention::default());
//! let backup = manager.create_backup(None)?;
//!
//! let result = RestoreManager::new(paths, BackupRetention::default())
//!     .restore_from_file(&backup)?;
//! println!("{}", result.summary());
//! ```

mod manager;
mod restore;

pub use manager::{BackupArchive, BackupInfo, BackupManager, BACKUP_SCHEMA_VERSION};
pub use restore::{ArchiveCounts, RestoreManager, RestoreResult, ValidationResult};
