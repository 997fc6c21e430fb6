//! Configuration module for budget-lens
//!
//! - Path resolution (environment override, platform default)
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::LensPaths;
pub use settings::{AnalyticsSettings, BackupRetention, Settings, SimulationSettings};
