//! Budget ceiling and template models
//!
//! A `Budget` is the ceiling for one category in one month. A
//! `BudgetTemplate` is a named preset used to fill a month in bulk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::money::Money;
use super::month::YearMonth;

/// A monthly budget ceiling for a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The month this ceiling applies to
    pub month: YearMonth,

    /// The category this ceiling applies to
    pub category: String,

    /// Ceiling amount (never negative)
    pub amount: Money,

    /// When this entry was last written
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    /// Create a new budget entry
    pub fn new(month: YearMonth, category: impl Into<String>, amount: Money) -> Self {
        Self {
            month,
            category: category.into(),
            amount,
            updated_at: Utc::now(),
        }
    }

    /// Validate the entry
    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        validate_budget_line(&self.category, self.amount)
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.month, self.category, self.amount)
    }
}

/// Named preset of default monthly amounts per category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetTemplate {
    pub name: String,
    pub amounts: BTreeMap<String, Money>,
}

impl BudgetTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amounts: BTreeMap::new(),
        }
    }

    /// Add a category amount (builder style)
    pub fn with(mut self, category: impl Into<String>, amount: Money) -> Self {
        self.amounts.insert(category.into(), amount);
        self
    }

    /// Sum of all amounts in the template
    pub fn total(&self) -> Money {
        self.amounts.values().sum()
    }

    /// Validate the template name and every line
    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        if self.name.trim().is_empty() {
            return Err(BudgetValidationError::EmptyTemplateName);
        }
        for (category, amount) in &self.amounts {
            validate_budget_line(category, *amount)?;
        }
        Ok(())
    }
}

fn validate_budget_line(category: &str, amount: Money) -> Result<(), BudgetValidationError> {
    if category.trim().is_empty() {
        return Err(BudgetValidationError::EmptyCategory);
    }
    if amount.is_negative() {
        return Err(BudgetValidationError::NegativeBudget {
            category: category.to_string(),
            amount,
        });
    }
    Ok(())
}

/// Validation errors for budgets and templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetValidationError {
    NegativeBudget { category: String, amount: Money },
    EmptyCategory,
    EmptyTemplateName,
}

impl fmt::Display for BudgetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeBudget { category, amount } => write!(
                f,
                "Budget amount cannot be negative ({} for '{}')",
                amount, category
            ),
            Self::EmptyCategory => write!(f, "Budget category must not be empty"),
            Self::EmptyTemplateName => write!(f, "Template name must not be empty"),
        }
    }
}

impl std::error::Error for BudgetValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn aug() -> YearMonth {
        YearMonth::parse("2025-08").unwrap()
    }

    #[test]
    fn test_budget_validation() {
        assert!(Budget::new(aug(), "Food", Money::from_units(3000)).validate().is_ok());
        assert!(Budget::new(aug(), "Food", Money::zero()).validate().is_ok());
        assert!(matches!(
            Budget::new(aug(), "Food", Money::from_units(-1)).validate(),
            Err(BudgetValidationError::NegativeBudget { .. })
        ));
        assert_eq!(
            Budget::new(aug(), "", Money::from_units(1)).validate(),
            Err(BudgetValidationError::EmptyCategory)
        );
    }

    #[test]
    fn test_template_total_and_validation() {
        let template = BudgetTemplate::new("Lean")
            .with("Food", Money::from_units(3000))
            .with("Petrol", Money::from_units(2500));
        assert_eq!(template.total(), Money::from_units(5500));
        assert!(template.validate().is_ok());

        let bad = template.clone().with("Shopping", Money::from_units(-5));
        assert!(bad.validate().is_err());

        assert_eq!(
            BudgetTemplate::new(" ").validate(),
            Err(BudgetValidationError::EmptyTemplateName)
        );
    }
}
