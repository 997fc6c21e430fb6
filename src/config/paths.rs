//! Path management for budget-lens
//!
//! ## Path Resolution Order
//!
//! 1. `BUDGET_LENS_DATA_DIR` environment variable (if set)
//! 2. The platform config directory for `budget-lens`, as reported by the
//!    `directories` crate (`~/.config/budget-lens` on Linux)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::{LensError, LensResult};

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "BUDGET_LENS_DATA_DIR";

/// Manages all paths used by budget-lens
#[derive(Debug, Clone)]
pub struct LensPaths {
    base_dir: PathBuf,
}

impl LensPaths {
    /// Resolve the base directory from the environment or the platform default
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if no home directory can be determined.
    pub fn new() -> LensResult<Self> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) if !custom.trim().is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Use an explicit base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Directory holding the snapshot files
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Default destination for exports and reports
    pub fn exports_dir(&self) -> PathBuf {
        self.base_dir.join("exports")
    }

    /// Directory holding backup archives
    pub fn backup_dir(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn transactions_file(&self) -> PathBuf {
        self.data_dir().join("transactions.json")
    }

    pub fn budgets_file(&self) -> PathBuf {
        self.data_dir().join("budgets.json")
    }

    pub fn templates_file(&self) -> PathBuf {
        self.data_dir().join("templates.json")
    }

    pub fn scenarios_file(&self) -> PathBuf {
        self.data_dir().join("scenarios.json")
    }

    /// Ensure base, data, export and backup directories exist
    pub fn ensure_directories(&self) -> LensResult<()> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| LensError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| LensError::Io(format!("Failed to create data directory: {}", e)))?;

        std::fs::create_dir_all(self.exports_dir())
            .map_err(|e| LensError::Io(format!("Failed to create exports directory: {}", e)))?;

        std::fs::create_dir_all(self.backup_dir())
            .map_err(|e| LensError::Io(format!("Failed to create backup directory: {}", e)))?;

        Ok(())
    }

    /// Check if budget-lens has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

fn resolve_default_path() -> LensResult<PathBuf> {
    ProjectDirs::from("", "", "budget-lens")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| LensError::Config("Could not determine a home directory".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LensPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
        assert_eq!(paths.exports_dir(), temp_dir.path().join("exports"));
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LensPaths::with_base_dir(temp_dir.path().join("lens"));

        paths.ensure_directories().unwrap();

        assert!(paths.data_dir().exists());
        assert!(paths.exports_dir().exists());
        assert!(paths.backup_dir().exists());
        assert!(!paths.is_initialized());
    }

    #[test]
    fn test_file_paths() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LensPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(
            paths.templates_file(),
            temp_dir.path().join("data").join("templates.json")
        );
        assert_eq!(
            paths.scenarios_file(),
            temp_dir.path().join("data").join("scenarios.json")
        );
        assert_eq!(paths.backup_dir(), temp_dir.path().join("backups"));
    }
}
