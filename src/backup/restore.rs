//! Backup restoration
//!
//! An archive is first unpacked into a staging directory and loaded through
//! the normal stores. Only an archive that loads cleanly replaces the live
//! data files, after a `pre-restore` backup of the current state.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::paths::LensPaths;
use crate::config::settings::BackupRetention;
use crate::error::{LensError, LensResult};
use crate::storage::file_io::write_json_atomic;
use crate::storage::Storage;

use super::manager::{BackupArchive, BackupManager, BACKUP_SCHEMA_VERSION};

const STAGING_DIR: &str = ".restore-staging";

/// Record counts of a loadable archive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArchiveCounts {
    pub transactions: usize,
    pub budgets: usize,
    pub templates: usize,
    pub scenarios: usize,
}

/// Outcome of checking a backup without restoring it
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub schema_version: u32,
    pub backup_date: DateTime<Utc>,
    /// Sections present in the archive (`null` ones are missing)
    pub sections: Vec<&'static str>,
    pub counts: ArchiveCounts,
}

impl ValidationResult {
    pub fn is_complete(&self) -> bool {
        self.sections.len() == 4
    }

    pub fn summary(&self) -> String {
        format!(
            "{} transaction(s), {} budget(s), {} template(s), {} scenario(s)",
            self.counts.transactions,
            self.counts.budgets,
            self.counts.templates,
            self.counts.scenarios
        )
    }
}

/// Outcome of a restore
#[derive(Debug, Clone, Serialize)]
pub struct RestoreResult {
    pub restored_from: PathBuf,
    pub backup_date: DateTime<Utc>,
    /// Backup of the data as it was just before the restore
    pub pre_restore_backup: Option<PathBuf>,
    pub counts: ArchiveCounts,
}

impl RestoreResult {
    pub fn summary(&self) -> String {
        format!(
            "Restored {} transaction(s), {} budget(s), {} template(s), {} scenario(s)",
            self.counts.transactions,
            self.counts.budgets,
            self.counts.templates,
            self.counts.scenarios
        )
    }
}

/// Validates and restores backup archives
pub struct RestoreManager {
    paths: LensPaths,
    backups: BackupManager,
}

impl RestoreManager {
    pub fn new(paths: LensPaths, retention: BackupRetention) -> Self {
        Self {
            backups: BackupManager::new(paths.clone(), retention),
            paths,
        }
    }

    /// Check that a backup parses and loads, without touching live data
    pub fn validate_backup(&self, backup_path: &Path) -> LensResult<ValidationResult> {
        let archive = BackupArchive::read(backup_path)?;
        let counts = self.stage(&archive)?;

        Ok(ValidationResult {
            schema_version: archive.schema_version,
            backup_date: archive.created_at,
            sections: archive
                .sections(&self.paths)
                .into_iter()
                .filter(|(_, value, _)| !value.is_null())
                .map(|(name, _, _)| name)
                .collect(),
            counts,
        })
    }

    /// Replace the live data files with a backup's contents
    ///
    /// Sections that are `null` in the archive remove the corresponding
    /// file, so the data directory matches the backup exactly.
    pub fn restore_from_file(&self, backup_path: &Path) -> LensResult<RestoreResult> {
        let archive = BackupArchive::read(backup_path)?;
        let counts = self.stage(&archive)?;

        // Current data may itself be unreadable, which is often why we restore
        let pre_restore_backup = match self.backups.create_backup(Some("pre-restore")) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "could not back up current data before restore");
                None
            }
        };

        self.paths.ensure_directories()?;
        write_sections(&archive, &self.paths)?;

        info!(
            backup = %backup_path.display(),
            transactions = counts.transactions,
            "restored backup"
        );

        Ok(RestoreResult {
            restored_from: backup_path.to_path_buf(),
            backup_date: archive.created_at,
            pre_restore_backup,
            counts,
        })
    }

    /// Unpack into a scratch directory and load it through the stores
    fn stage(&self, archive: &BackupArchive) -> LensResult<ArchiveCounts> {
        if archive.schema_version > BACKUP_SCHEMA_VERSION {
            return Err(LensError::Validation(format!(
                "Backup schema version {} is newer than supported version {}",
                archive.schema_version, BACKUP_SCHEMA_VERSION
            )));
        }

        let staging_dir = self.paths.backup_dir().join(STAGING_DIR);
        remove_dir_if_present(&staging_dir)?;
        let staging = LensPaths::with_base_dir(staging_dir.clone());

        let loaded = write_sections(archive, &staging).and_then(|_| {
            let mut storage = Storage::new(staging)?;
            storage.load_all()?;
            Ok(ArchiveCounts {
                transactions: storage.transactions.count()?,
                budgets: storage.budgets.get_all()?.len(),
                templates: storage.budgets.list_templates()?.len(),
                scenarios: storage.scenarios.count()?,
            })
        });
        remove_dir_if_present(&staging_dir)?;

        loaded.map_err(|e| LensError::Validation(format!("Backup does not load: {}", e)))
    }
}

fn write_sections(archive: &BackupArchive, paths: &LensPaths) -> LensResult<()> {
    for (_, value, path) in archive.sections(paths) {
        if value.is_null() {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(LensError::Io(format!(
                        "Failed to remove {}: {}",
                        path.display(),
                        e
                    )))
                }
            }
        } else {
            write_json_atomic(&path, value)?;
        }
    }
    Ok(())
}

fn remove_dir_if_present(dir: &Path) -> LensResult<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(LensError::Io(format!(
            "Failed to clear {}: {}",
            dir.display(),
            e
        ))),
    }
}
