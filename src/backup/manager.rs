//! Backup creation, listing and pruning

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::paths::LensPaths;
use crate::config::settings::BackupRetention;
use crate::error::{LensError, LensResult};
use crate::storage::file_io::write_json_atomic;

/// Current archive layout version
pub const BACKUP_SCHEMA_VERSION: u32 = 1;

const PREFIX: &str = "backup-";
const STAMP_FORMAT: &str = "%Y%m%d-%H%M%S-%3f";
/// Length of a `YYYYMMDD-HHMMSS-mmm` stamp
const STAMP_LEN: usize = 19;

/// Metadata about a backup file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupInfo {
    pub filename: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub size_bytes: u64,
    /// Free-form tag from the filename, e.g. `pre-restore`
    pub label: Option<String>,
}

/// Everything needed to rebuild the data directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupArchive {
    pub schema_version: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub app_version: String,
    #[serde(default)]
    pub transactions: Value,
    #[serde(default)]
    pub budgets: Value,
    #[serde(default)]
    pub templates: Value,
    #[serde(default)]
    pub scenarios: Value,
}

impl BackupArchive {
    /// Snapshot the current data files
    pub fn capture(paths: &LensPaths, created_at: DateTime<Utc>) -> LensResult<Self> {
        Ok(Self {
            schema_version: BACKUP_SCHEMA_VERSION,
            created_at,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            transactions: read_json_value(&paths.transactions_file())?,
            budgets: read_json_value(&paths.budgets_file())?,
            templates: read_json_value(&paths.templates_file())?,
            scenarios: read_json_value(&paths.scenarios_file())?,
        })
    }

    /// Read and parse an archive file
    pub fn read(path: &Path) -> LensResult<Self> {
        let contents = fs::read(path).map_err(|e| {
            LensError::Io(format!("Failed to read backup '{}': {}", path.display(), e))
        })?;
        serde_json::from_slice(&contents).map_err(|e| {
            LensError::Parse(format!("Invalid backup file '{}': {}", path.display(), e))
        })
    }

    /// Each section paired with the data file it restores to
    pub(crate) fn sections(&self, paths: &LensPaths) -> [(&'static str, &Value, PathBuf); 4] {
        [
            ("transactions", &self.transactions, paths.transactions_file()),
            ("budgets", &self.budgets, paths.budgets_file()),
            ("templates", &self.templates, paths.templates_file()),
            ("scenarios", &self.scenarios, paths.scenarios_file()),
        ]
    }
}

/// Creates backups and applies the retention policy
pub struct BackupManager {
    paths: LensPaths,
    retention: BackupRetention,
}

impl BackupManager {
    pub fn new(paths: LensPaths, retention: BackupRetention) -> Self {
        Self { paths, retention }
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.paths.backup_dir()
    }

    /// Write a new archive of the current data files
    ///
    /// `label` is appended to the filename after sanitizing; returns the path
    /// of the new backup.
    pub fn create_backup(&self, label: Option<&str>) -> LensResult<PathBuf> {
        let backup_dir = self.backup_dir();
        fs::create_dir_all(&backup_dir)
            .map_err(|e| LensError::Io(format!("Failed to create backup directory: {}", e)))?;

        let label = label.map(sanitize_label).filter(|l| !l.is_empty());

        // Millisecond stamps; bump until the name is free
        let mut created_at = Utc::now();
        let mut path = backup_dir.join(backup_filename(created_at, label.as_deref()));
        while path.exists() {
            created_at += Duration::milliseconds(1);
            path = backup_dir.join(backup_filename(created_at, label.as_deref()));
        }

        let archive = BackupArchive::capture(&self.paths, created_at)?;
        write_json_atomic(&path, &archive)?;

        info!(path = %path.display(), "created backup");
        Ok(path)
    }

    /// All backups, newest first
    pub fn list_backups(&self) -> LensResult<Vec<BackupInfo>> {
        let backup_dir = self.backup_dir();
        if !backup_dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&backup_dir)
            .map_err(|e| LensError::Io(format!("Failed to read backup directory: {}", e)))?;

        let mut backups = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|e| LensError::Io(format!("Failed to read directory entry: {}", e)))?;
            if let Some(info) = parse_backup_info(&entry.path()) {
                backups.push(info);
            }
        }

        backups.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.filename.cmp(&a.filename))
        });
        Ok(backups)
    }

    pub fn get_latest_backup(&self) -> LensResult<Option<BackupInfo>> {
        Ok(self.list_backups()?.into_iter().next())
    }

    /// Resolve `latest`, a path, or a filename in the backup directory
    pub fn resolve(&self, backup: &str) -> LensResult<PathBuf> {
        if backup.eq_ignore_ascii_case("latest") {
            return self
                .get_latest_backup()?
                .map(|b| b.path)
                .ok_or_else(|| LensError::backup_not_found("latest"));
        }

        let path = PathBuf::from(backup);
        if path.is_file() {
            return Ok(path);
        }

        let backup_dir = self.backup_dir();
        [
            backup_dir.join(backup),
            backup_dir.join(format!("{}.json", backup)),
        ]
        .into_iter()
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| LensError::backup_not_found(backup))
    }

    /// Backups the retention policy would delete at `now`
    pub fn expired_backups(&self, now: DateTime<Utc>) -> LensResult<Vec<BackupInfo>> {
        let max_age = Duration::days(i64::from(self.retention.max_age_days));
        Ok(self
            .list_backups()?
            .into_iter()
            .skip(self.retention.keep_latest as usize)
            .filter(|b| now.signed_duration_since(b.created_at) > max_age)
            .collect())
    }

    /// Delete expired backups, returning their paths
    pub fn enforce_retention(&self) -> LensResult<Vec<PathBuf>> {
        self.enforce_retention_at(Utc::now())
    }

    pub fn enforce_retention_at(&self, now: DateTime<Utc>) -> LensResult<Vec<PathBuf>> {
        let mut deleted = Vec::new();
        for backup in self.expired_backups(now)? {
            fs::remove_file(&backup.path)
                .map_err(|e| LensError::Io(format!("Failed to delete old backup: {}", e)))?;
            debug!(path = %backup.path.display(), "pruned backup");
            deleted.push(backup.path);
        }
        if !deleted.is_empty() {
            info!(count = deleted.len(), "pruned old backups");
        }
        Ok(deleted)
    }

    /// Create a backup and then prune
    pub fn create_backup_with_retention(
        &self,
        label: Option<&str>,
    ) -> LensResult<(PathBuf, Vec<PathBuf>)> {
        let backup = self.create_backup(label)?;
        let deleted = self.enforce_retention()?;
        Ok((backup, deleted))
    }
}

fn backup_filename(created_at: DateTime<Utc>, label: Option<&str>) -> String {
    let stamp = created_at.format(STAMP_FORMAT);
    match label {
        Some(label) => format!("{}{}-{}.json", PREFIX, stamp, label),
        None => format!("{}{}.json", PREFIX, stamp),
    }
}

fn sanitize_label(label: &str) -> String {
    label
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

fn parse_backup_info(path: &Path) -> Option<BackupInfo> {
    let filename = path.file_name()?.to_str()?.to_string();
    let rest = filename.strip_prefix(PREFIX)?.strip_suffix(".json")?;

    let stamp = rest.get(..STAMP_LEN)?;
    let label = match rest.get(STAMP_LEN..)? {
        "" => None,
        tail => Some(tail.strip_prefix('-')?.to_string()),
    };
    let created_at = NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT)
        .ok()?
        .and_utc();

    let size_bytes = fs::metadata(path).ok()?.len();

    Some(BackupInfo {
        filename,
        path: path.to_path_buf(),
        created_at,
        size_bytes,
        label,
    })
}

/// A missing file is recorded as `null`
fn read_json_value(path: &Path) -> LensResult<Value> {
    match fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
            LensError::Storage(format!(
                "Failed to parse {} for backup: {}",
                path.display(),
                e
            ))
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Value::Null),
        Err(e) => Err(LensError::Io(format!(
            "Failed to read {} for backup: {}",
            path.display(),
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn create_test_manager(keep_latest: u32) -> (BackupManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LensPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();

        let retention = BackupRetention {
            keep_latest,
            max_age_days: 30,
        };
        (BackupManager::new(paths, retention), temp_dir)
    }

    fn plant(manager: &BackupManager, filename: &str) {
        fs::write(manager.backup_dir().join(filename), "{}").unwrap();
    }

    #[test]
    fn test_create_backup_captures_files() {
        let (manager, _temp) = create_test_manager(5);
        fs::write(
            manager.paths.transactions_file(),
            r#"{"transactions": []}"#,
        )
        .unwrap();

        let path = manager.create_backup(None).unwrap();
        assert!(path.exists());

        let archive = BackupArchive::read(&path).unwrap();
        assert_eq!(archive.schema_version, BACKUP_SCHEMA_VERSION);
        assert!(archive.transactions.is_object());
        assert!(archive.budgets.is_null());
    }

    #[test]
    fn test_same_millisecond_backups_do_not_collide() {
        let (manager, _temp) = create_test_manager(5);
        for _ in 0..3 {
            manager.create_backup(None).unwrap();
        }
        assert_eq!(manager.list_backups().unwrap().len(), 3);
    }

    #[test]
    fn test_list_newest_first_with_labels() {
        let (manager, _temp) = create_test_manager(5);
        plant(&manager, "backup-20250101-120000-000.json");
        plant(&manager, "backup-20250301-120000-000-pre-restore.json");
        plant(&manager, "notes.json");
        plant(&manager, "backup-garbage.json");

        let backups = manager.list_backups().unwrap();
        assert_eq!(backups.len(), 2);
        assert_eq!(backups[0].label.as_deref(), Some("pre-restore"));
        assert_eq!(
            backups[1].created_at,
            Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_label_is_sanitized() {
        let (manager, _temp) = create_test_manager(5);
        let path = manager.create_backup(Some("before import/2")).unwrap();
        let info = manager.get_latest_backup().unwrap().unwrap();
        assert_eq!(info.path, path);
        assert_eq!(info.label.as_deref(), Some("before-import-2"));
    }

    #[test]
    fn test_retention_keeps_latest_and_recent() {
        let (manager, _temp) = create_test_manager(1);
        for stamp in [
            "20250101-000000-000",
            "20250201-000000-000",
            "20250301-000000-000",
            "20250601-000000-000",
            "20250610-000000-000",
        ] {
            plant(&manager, &format!("backup-{}.json", stamp));
        }
        let now = Utc.with_ymd_and_hms(2025, 6, 20, 0, 0, 0).unwrap();

        // June 10 is kept by count, June 1 by age
        let deleted = manager.enforce_retention_at(now).unwrap();
        assert_eq!(deleted.len(), 3);

        let remaining: Vec<_> = manager
            .list_backups()
            .unwrap()
            .into_iter()
            .map(|b| b.filename)
            .collect();
        assert_eq!(
            remaining,
            vec![
                "backup-20250610-000000-000.json",
                "backup-20250601-000000-000.json"
            ]
        );
    }

    #[test]
    fn test_resolve() {
        let (manager, _temp) = create_test_manager(5);
        assert!(manager.resolve("latest").unwrap_err().is_not_found());

        plant(&manager, "backup-20250101-120000-000.json");
        let expected = manager.backup_dir().join("backup-20250101-120000-000.json");
        assert_eq!(manager.resolve("latest").unwrap(), expected);
        assert_eq!(manager.resolve("backup-20250101-120000-000").unwrap(), expected);
        assert_eq!(
            manager.resolve(expected.to_str().unwrap()).unwrap(),
            expected
        );
        assert!(manager.resolve("nope").unwrap_err().is_not_found());
    }
}
