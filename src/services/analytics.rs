//! Analytics engine
//!
//! Read-only computations over the transaction and budget stores: spending
//! trends, per-category budget performance, adherence, and insights. Every
//! call re-reads the stores; nothing is cached.

use std::collections::BTreeMap;

use crate::config::AnalyticsSettings;
use crate::error::{LensError, LensResult};
use crate::models::{
    BudgetSuggestion, CategoryHistory, CategoryPerformance, Insight, InsightLevel, Money, PerformanceStatus,
    TrendDirection, TrendPoint, TrendResult, YearMonth,
};
use crate::storage::{BudgetStore, Storage, TransactionFilter, TransactionStore};

/// Adherence above this percentage is an overspending warning
const OVERSPEND_PCT: f64 = 110.0;
/// Adherence below this percentage earns a positive note
const UNDERSPEND_PCT: f64 = 90.0;
/// Per-category adherence above this percentage is flagged
const CATEGORY_ALERT_PCT: f64 = 120.0;
/// How many of the top spending categories are checked for alerts
const TOP_CATEGORIES: usize = 3;

/// Service for spending analytics
pub struct AnalyticsEngine<'a> {
    transactions: &'a TransactionStore,
    budgets: &'a BudgetStore,
    settings: AnalyticsSettings,
}

impl<'a> AnalyticsEngine<'a> {
    /// Create an engine over explicit stores
    pub fn new(
        transactions: &'a TransactionStore,
        budgets: &'a BudgetStore,
        settings: AnalyticsSettings,
    ) -> Self {
        Self {
            transactions,
            budgets,
            settings,
        }
    }

    /// Create an engine over both stores of a `Storage`
    pub fn from_storage(storage: &'a Storage, settings: AnalyticsSettings) -> Self {
        Self::new(&storage.transactions, &storage.budgets, settings)
    }

    pub fn settings(&self) -> &AnalyticsSettings {
        &self.settings
    }

    /// Spending per month, in the order given, with its overall direction
    pub fn spending_trend(
        &self,
        months: &[YearMonth],
        category: Option<&str>,
    ) -> LensResult<TrendResult> {
        if months.is_empty() {
            return Err(LensError::Validation(
                "At least one month is required for a trend".into(),
            ));
        }

        let mut periods = Vec::with_capacity(months.len());
        for &month in months {
            let mut filter = TransactionFilter::new().month(month);
            if let Some(category) = category {
                filter = filter.category(category);
            }
            let total = self.transactions.query(filter)?.total();
            periods.push(TrendPoint {
                period: month,
                total,
            });
        }

        let totals: Vec<Money> = periods.iter().map(|p| p.total).collect();
        let total: Money = totals.iter().sum();
        let average = Money::from_cents(
            (total.cents() as f64 / totals.len() as f64).round() as i64,
        );

        Ok(TrendResult {
            category: category.map(str::to_string),
            direction: trend_direction(&totals, self.settings.trend_threshold),
            average,
            total,
            min: totals.iter().copied().min().unwrap_or_default(),
            max: totals.iter().copied().max().unwrap_or_default(),
            periods,
        })
    }

    /// Budget vs. actual for every budgeted or active category in a month
    pub fn category_performance(&self, month: YearMonth) -> LensResult<Vec<CategoryPerformance>> {
        let spending = self.spending_by_category(month)?;
        let budgets = self.budgets.budget_map(month)?;
        Ok(compute_performance(&spending, &budgets, &self.settings))
    }

    /// Sum of every transaction amount in a month
    pub fn project_monthly_total(&self, month: YearMonth) -> LensResult<Money> {
        Ok(self
            .transactions
            .query(TransactionFilter::new().month(month))?
            .total())
    }

    /// Net spending per category in a month
    pub fn spending_by_category(&self, month: YearMonth) -> LensResult<BTreeMap<String, Money>> {
        let query = self
            .transactions
            .query(TransactionFilter::new().month(month))?;

        let mut spending: BTreeMap<String, Money> = BTreeMap::new();
        for txn in query.iter() {
            *spending.entry(txn.category.clone()).or_default() += txn.amount;
        }
        Ok(spending)
    }

    /// Total spending as a percentage of total budget; 0 when nothing is budgeted
    pub fn budget_adherence(&self, month: YearMonth) -> LensResult<f64> {
        let spent = self.project_monthly_total(month)?;
        let budgeted = self.budgets.total_budget(month)?;
        Ok(percent_of(spent, budgeted))
    }

    /// Budgeted categories whose spending exceeds the ceiling, by name
    pub fn over_budget_categories(&self, month: YearMonth) -> LensResult<Vec<String>> {
        let spending = self.spending_by_category(month)?;
        let budgets = self.budgets.budget_map(month)?;

        Ok(budgets
            .iter()
            .filter(|(category, ceiling)| {
                spending.get(*category).copied().unwrap_or_default() > **ceiling
            })
            .map(|(category, _)| category.clone())
            .collect())
    }

    /// A category's spending and budget record over its whole history
    ///
    /// Only months with positive net spending count. A month is over budget
    /// when it had a positive ceiling and spending exceeded it.
    pub fn analyze_category(&self, category: &str) -> LensResult<CategoryHistory> {
        let query = self
            .transactions
            .query(TransactionFilter::new().category(category))?;

        let mut by_month: BTreeMap<YearMonth, Money> = BTreeMap::new();
        for txn in query.iter() {
            *by_month.entry(YearMonth::from_date(txn.date)).or_default() += txn.amount;
        }
        drop(query);

        let mut months = Vec::new();
        let mut total_spent = Money::zero();
        let mut total_budget = Money::zero();
        let mut months_over_budget = 0;
        for (month, spent) in by_month {
            if !spent.is_positive() {
                continue;
            }
            months.push(month);
            total_spent += spent;

            if let Some(ceiling) = self.budgets.get_budget(month, category)? {
                if ceiling.is_positive() {
                    total_budget += ceiling;
                    if spent > ceiling {
                        months_over_budget += 1;
                    }
                }
            }
        }

        let average_monthly = if months.is_empty() {
            Money::zero()
        } else {
            Money::from_cents((total_spent.cents() as f64 / months.len() as f64).round() as i64)
        };

        Ok(CategoryHistory {
            category: category.to_string(),
            months_with_data: months.len(),
            months_over_budget,
            total_spent,
            total_budget,
            average_monthly,
            adherence_pct: percent_of(total_spent, total_budget),
            first_month: months.first().copied(),
            last_month: months.last().copied(),
        })
    }

    /// Propose new ceilings for categories far from their budget
    ///
    /// Spending above 120% of the ceiling suggests actual + 10%; spending
    /// below 50% suggests actual + 20%.
    pub fn suggest_budget_adjustments(
        &self,
        month: YearMonth,
    ) -> LensResult<Vec<BudgetSuggestion>> {
        let spending = self.spending_by_category(month)?;
        let budgets = self.budgets.budget_map(month)?;

        let mut suggestions = Vec::new();
        for (category, &current) in &budgets {
            let actual = spending.get(category).copied().unwrap_or_default();
            let suggested = if actual > current.scale(1.2) {
                actual.scale(1.1)
            } else if actual < current.scale(0.5) {
                actual.scale(1.2)
            } else {
                continue;
            };

            suggestions.push(BudgetSuggestion {
                category: category.clone(),
                current,
                actual,
                suggested,
            });
        }
        Ok(suggestions)
    }

    /// Short observations about spending across a set of months
    pub fn insights(&self, months: &[YearMonth]) -> LensResult<Vec<Insight>> {
        if months.is_empty() {
            return Err(LensError::Validation(
                "At least one month is required for insights".into(),
            ));
        }

        let mut spending: BTreeMap<String, Money> = BTreeMap::new();
        let mut budgets: BTreeMap<String, Money> = BTreeMap::new();
        for &month in months {
            for (category, amount) in self.spending_by_category(month)? {
                *spending.entry(category).or_default() += amount;
            }
            for (category, amount) in self.budgets.budget_map(month)? {
                *budgets.entry(category).or_default() += amount;
            }
        }

        let mut insights = Vec::new();

        let total_spent: Money = spending.values().sum();
        let total_budget: Money = budgets.values().sum();
        if total_budget.is_positive() {
            let adherence = percent_of(total_spent, total_budget);
            if adherence > OVERSPEND_PCT {
                insights.push(Insight {
                    level: InsightLevel::Warning,
                    category: None,
                    message: format!(
                        "Overall spending exceeds budget by more than 10% ({:.1}% of budget)",
                        adherence
                    ),
                });
            } else if adherence < UNDERSPEND_PCT {
                insights.push(Insight {
                    level: InsightLevel::Positive,
                    category: None,
                    message: format!(
                        "Spending is more than 10% under budget ({:.1}% of budget)",
                        adherence
                    ),
                });
            }
        }

        let mut top: Vec<(&String, Money)> = spending.iter().map(|(c, a)| (c, *a)).collect();
        top.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        for (category, actual) in top.into_iter().take(TOP_CATEGORIES) {
            let budget = budgets.get(category).copied().unwrap_or_default();
            if !budget.is_positive() {
                continue;
            }
            let adherence = percent_of(actual, budget);
            if adherence > CATEGORY_ALERT_PCT {
                insights.push(Insight {
                    level: InsightLevel::Warning,
                    category: Some(category.clone()),
                    message: format!(
                        "{} is significantly over budget ({:.1}% of budget)",
                        category, adherence
                    ),
                });
            }
        }

        Ok(insights)
    }
}

/// Score categories against their ceilings
///
/// Covers the union of budgeted categories and categories with spending.
/// Ordered by actual spending descending, then category name.
pub fn compute_performance(
    spending: &BTreeMap<String, Money>,
    budgets: &BTreeMap<String, Money>,
    settings: &AnalyticsSettings,
) -> Vec<CategoryPerformance> {
    let mut categories: Vec<&String> = budgets.keys().chain(spending.keys()).collect();
    categories.sort();
    categories.dedup();

    let mut results: Vec<CategoryPerformance> = categories
        .into_iter()
        .map(|category| {
            let budgeted = budgets.get(category).copied().unwrap_or_default();
            let actual = spending.get(category).copied().unwrap_or_default();
            score_category(category, budgeted, actual, settings.near_budget_margin)
        })
        .collect();

    results.sort_by(|a, b| {
        b.actual
            .cmp(&a.actual)
            .then_with(|| a.category.cmp(&b.category))
    });
    results
}

fn score_category(
    category: &str,
    budgeted: Money,
    actual: Money,
    near_margin: f64,
) -> CategoryPerformance {
    let variance = budgeted - actual;

    let variance_pct = if budgeted.is_positive() {
        round2(variance.cents() as f64 / budgeted.cents() as f64 * 100.0)
    } else if actual.is_positive() {
        -100.0
    } else {
        0.0
    };

    let status = if actual > budgeted {
        PerformanceStatus::Over
    } else if budgeted.is_positive() && actual >= budgeted.scale(1.0 - near_margin) {
        PerformanceStatus::Near
    } else {
        PerformanceStatus::Under
    };

    CategoryPerformance {
        category: category.to_string(),
        budgeted,
        actual,
        variance,
        variance_pct,
        status,
    }
}

/// Classify a series of period totals
///
/// The first and last `n / 2` periods are compared; the middle period of an
/// odd-length series is ignored. A relative change of exactly `threshold`
/// is stable.
pub fn trend_direction(totals: &[Money], threshold: f64) -> TrendDirection {
    let half = totals.len() / 2;
    if half == 0 {
        return TrendDirection::Stable;
    }

    let mean = |slice: &[Money]| {
        slice.iter().map(|m| m.cents() as f64).sum::<f64>() / slice.len() as f64
    };
    let first = mean(&totals[..half]);
    let second = mean(&totals[totals.len() - half..]);
    let delta = second - first;
    let base = first.abs();

    if base == 0.0 {
        return match delta {
            d if d > 0.0 => TrendDirection::Rising,
            d if d < 0.0 => TrendDirection::Falling,
            _ => TrendDirection::Stable,
        };
    }

    let change = delta / base;
    if change > threshold {
        TrendDirection::Rising
    } else if change < -threshold {
        TrendDirection::Falling
    } else {
        TrendDirection::Stable
    }
}

/// `part / whole * 100`, or 0 when `whole` is not positive
pub(crate) fn percent_of(part: Money, whole: Money) -> f64 {
    if whole.is_positive() {
        round2(part.cents() as f64 / whole.cents() as f64 * 100.0)
    } else {
        0.0
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
