//! User settings for budget-lens
//!
//! Thresholds for analytics and simulation, the currency symbol used for
//! display, and the keyword rules used to auto-categorize imports.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::paths::LensPaths;
use crate::error::{LensError, LensResult};
use crate::models::Money;

/// Thresholds used by the analytics engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSettings {
    /// Relative change between trend halves that counts as rising/falling
    #[serde(default = "default_trend_threshold")]
    pub trend_threshold: f64,

    /// Fraction below the ceiling at which a category counts as "near"
    #[serde(default = "default_near_budget_margin")]
    pub near_budget_margin: f64,
}

fn default_trend_threshold() -> f64 {
    0.10
}

fn default_near_budget_margin() -> f64 {
    0.10
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            trend_threshold: default_trend_threshold(),
            near_budget_margin: default_near_budget_margin(),
        }
    }
}

/// Risk thresholds for scenario impact, in currency units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    #[serde(default = "default_medium_risk")]
    pub medium_risk_threshold: Money,

    #[serde(default = "default_high_risk")]
    pub high_risk_threshold: Money,
}

fn default_medium_risk() -> Money {
    Money::from_units(10_000)
}

fn default_high_risk() -> Money {
    Money::from_units(50_000)
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            medium_risk_threshold: default_medium_risk(),
            high_risk_threshold: default_high_risk(),
        }
    }
}

/// Backup retention policy
///
/// The newest `keep_latest` backups are always kept. Older ones are pruned
/// once they are more than `max_age_days` old.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRetention {
    #[serde(default = "default_keep_latest")]
    pub keep_latest: u32,

    #[serde(default = "default_max_age_days")]
    pub max_age_days: u32,
}

fn default_keep_latest() -> u32 {
    5
}

fn default_max_age_days() -> u32 {
    30
}

impl Default for BackupRetention {
    fn default() -> Self {
        Self {
            keep_latest: default_keep_latest(),
            max_age_days: default_max_age_days(),
        }
    }
}

/// User settings for budget-lens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol used when printing amounts
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    #[serde(default)]
    pub analytics: AnalyticsSettings,

    #[serde(default)]
    pub simulation: SimulationSettings,

    #[serde(default)]
    pub backup_retention: BackupRetention,

    /// Category -> keywords matched against import descriptions
    #[serde(default = "default_category_keywords")]
    pub category_keywords: BTreeMap<String, Vec<String>>,

    /// Template applied by `budget apply-template` when none is named
    #[serde(default = "default_template")]
    pub default_template: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_template() -> String {
    "Conservative".to_string()
}

pub(crate) fn default_category_keywords() -> BTreeMap<String, Vec<String>> {
    let rules: [(&str, &[&str]); 7] = [
        ("Food", &["SWIGGY", "ZOMATO", "FOOD", "DELIVERY", "RESTAURANT", "GROCERY"]),
        ("Petrol", &["PETROL", "FUEL", "DIESEL", "PETROL PUMP"]),
        ("Shopping", &["SHOPPING", "AMAZON", "FLIPKART", "MALL", "STORE", "RETAIL"]),
        ("Subscriptions", &["NETFLIX", "PRIME", "HOTSTAR", "SPOTIFY", "SUBSCRIPTION"]),
        ("Health", &["HOSPITAL", "CLINIC", "MEDICAL", "DOCTOR", "PHARMACY"]),
        ("Investments", &["SIP", "MUTUAL FUND", "GOLD", "BITCOIN"]),
        ("Loans", &["EMI", "LOAN", "CREDIT CARD"]),
    ];

    rules
        .iter()
        .map(|(category, words)| {
            (
                category.to_string(),
                words.iter().map(|w| w.to_string()).collect(),
            )
        })
        .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            analytics: AnalyticsSettings::default(),
            simulation: SimulationSettings::default(),
            backup_retention: BackupRetention::default(),
            category_keywords: default_category_keywords(),
            default_template: default_template(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or default settings if the file doesn't exist
    pub fn load_or_create(paths: &LensPaths) -> LensResult<Self> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| LensError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                LensError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            settings.validate()?;
            Ok(settings)
        } else {
            // Not persisted until the caller decides to
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &LensPaths) -> LensResult<()> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| LensError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| LensError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Reject thresholds that make no sense
    pub fn validate(&self) -> LensResult<()> {
        let fractions = [
            ("analytics.trend_threshold", self.analytics.trend_threshold),
            ("analytics.near_budget_margin", self.analytics.near_budget_margin),
        ];
        for (name, value) in fractions {
            if !value.is_finite() || value < 0.0 {
                return Err(LensError::Config(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        let sim = &self.simulation;
        if sim.medium_risk_threshold.is_negative() || sim.high_risk_threshold.is_negative() {
            return Err(LensError::Config(
                "simulation risk thresholds must not be negative".into(),
            ));
        }
        if sim.medium_risk_threshold > sim.high_risk_threshold {
            return Err(LensError::Config(
                "simulation.medium_risk_threshold must not exceed high_risk_threshold".into(),
            ));
        }

        Ok(())
    }
}
