//! Transaction model
//!
//! A dated, categorized money movement. Positive amounts are expenses,
//! negative amounts are refunds or credits.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::TransactionId;
use super::money::Money;
use super::month::YearMonth;

/// Where a transaction came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionSource {
    /// Entered by hand
    #[default]
    Manual,
    /// Created by a file import
    Imported,
}

impl TransactionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Imported => "imported",
        }
    }
}

impl fmt::Display for TransactionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TransactionSource {
    type Err = TransactionValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "imported" => Ok(Self::Imported),
            other => Err(TransactionValidationError::UnknownSource(other.to_string())),
        }
    }
}

/// A financial transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier, assigned by the store on insert
    #[serde(default)]
    pub id: TransactionId,

    /// Transaction date
    pub date: NaiveDate,

    /// Free-form category label
    pub category: String,

    /// Amount (positive for expense, negative for refund/credit)
    pub amount: Money,

    /// Description / memo
    #[serde(default)]
    pub description: String,

    /// Origin of the record
    #[serde(default)]
    pub source: TransactionSource,

    /// When the transaction was created
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// When the transaction was last modified
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new manual transaction
    pub fn new(date: NaiveDate, category: impl Into<String>, amount: Money) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            date,
            category: category.into(),
            amount,
            description: String::new(),
            source: TransactionSource::Manual,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the source
    pub fn with_source(mut self, source: TransactionSource) -> Self {
        self.source = source;
        self
    }

    /// The month this transaction belongs to
    pub fn month(&self) -> YearMonth {
        YearMonth::from_date(self.date)
    }

    /// Check if this is an expense (positive amount)
    pub fn is_expense(&self) -> bool {
        self.amount.is_positive()
    }

    /// Check if this is a refund or credit (negative amount)
    pub fn is_refund(&self) -> bool {
        self.amount.is_negative()
    }

    /// Apply a patch, touching `updated_at`
    pub fn apply(&mut self, patch: &TransactionPatch) {
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(source) = patch.source {
            self.source = source;
        }
        self.updated_at = Utc::now();
    }

    /// Validate the transaction
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if self.category.trim().is_empty() {
            return Err(TransactionValidationError::EmptyCategory);
        }

        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.category,
            self.amount
        )
    }
}

/// Field replacements for an existing transaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionPatch {
    pub date: Option<NaiveDate>,
    pub category: Option<String>,
    pub amount: Option<Money>,
    pub description: Option<String>,
    pub source: Option<TransactionSource>,
}

impl TransactionPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn source(mut self, source: TransactionSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Check if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.category.is_none()
            && self.amount.is_none()
            && self.description.is_none()
            && self.source.is_none()
    }
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    EmptyCategory,
    InvalidDate(String),
    InvalidAmount(String),
    UnknownSource(String),
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCategory => write!(f, "Transaction category must not be empty"),
            Self::InvalidDate(s) => write!(f, "Invalid date '{}', expected YYYY-MM-DD", s),
            Self::InvalidAmount(s) => write!(f, "Invalid amount '{}'", s),
            Self::UnknownSource(s) => {
                write!(f, "Unknown source '{}', expected manual or imported", s)
            }
        }
    }
}

impl std::error::Error for TransactionValidationError {}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Result<NaiveDate, TransactionValidationError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| TransactionValidationError::InvalidDate(s.to_string()))
}
