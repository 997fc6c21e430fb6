//! What-if simulator
//!
//! Overlays hypothetical transactions and budget overrides on the real data
//! for one month and scores the result the same way the analytics engine
//! does. The stores are only ever read.

use std::collections::BTreeMap;

use tracing::info;

use crate::config::{AnalyticsSettings, Settings, SimulationSettings};
use crate::error::{LensError, LensResult};
use crate::models::{
    CategoryDelta, CategoryPerformance, ImpactDirection, Money, RiskLevel, Scenario,
    ScenarioImpact, ScenarioOutcome, Transaction, YearMonth,
};
use crate::storage::{BudgetStore, Storage, TransactionStore};

use super::analytics::{compute_performance, AnalyticsEngine};

/// Service for budget simulations
pub struct Simulator<'a> {
    transactions: &'a TransactionStore,
    budgets: &'a BudgetStore,
    analytics: AnalyticsSettings,
    simulation: SimulationSettings,
}

impl<'a> Simulator<'a> {
    pub fn new(
        transactions: &'a TransactionStore,
        budgets: &'a BudgetStore,
        analytics: AnalyticsSettings,
        simulation: SimulationSettings,
    ) -> Self {
        Self {
            transactions,
            budgets,
            analytics,
            simulation,
        }
    }

    pub fn from_storage(storage: &'a Storage, settings: &Settings) -> Self {
        Self::new(
            &storage.transactions,
            &storage.budgets,
            settings.analytics,
            settings.simulation,
        )
    }

    /// Category performance for `base_month` as if the hypotheticals were real
    ///
    /// Hypothetical transactions must be valid and dated inside `base_month`.
    /// Overrides replace (or add) ceilings and must not be negative.
    pub fn simulate(
        &self,
        base_month: YearMonth,
        hypothetical: &[Transaction],
        budget_overrides: &BTreeMap<String, Money>,
    ) -> LensResult<Vec<CategoryPerformance>> {
        validate_overlay(base_month, hypothetical, budget_overrides)?;

        let engine = AnalyticsEngine::new(self.transactions, self.budgets, self.analytics);
        let mut spending = engine.spending_by_category(base_month)?;
        for txn in hypothetical {
            *spending.entry(txn.category.clone()).or_default() += txn.amount;
        }

        let mut budgets = self.budgets.budget_map(base_month)?;
        for (category, amount) in budget_overrides {
            budgets.insert(category.clone(), *amount);
        }

        Ok(compute_performance(&spending, &budgets, &self.analytics))
    }

    /// Run a saved scenario against the current data
    pub fn run_scenario(&self, scenario: &Scenario) -> LensResult<ScenarioOutcome> {
        let baseline = self.simulate(scenario.base_month, &[], &BTreeMap::new())?;
        let simulated = self.simulate(
            scenario.base_month,
            &scenario.transactions,
            &scenario.budget_overrides,
        )?;
        let deltas = compare_scenarios(&baseline, &simulated);
        let impact = self.impact(&baseline, &simulated, &deltas);

        info!(
            scenario = %scenario.name,
            month = %scenario.base_month,
            risk = %impact.risk,
            "ran scenario"
        );

        Ok(ScenarioOutcome {
            name: scenario.name.clone(),
            month: scenario.base_month,
            baseline,
            simulated,
            deltas,
            impact,
        })
    }

    fn impact(
        &self,
        baseline: &[CategoryPerformance],
        simulated: &[CategoryPerformance],
        deltas: &[CategoryDelta],
    ) -> ScenarioImpact {
        let budgeted = |rows: &[CategoryPerformance]| rows.iter().map(|r| r.budgeted).sum::<Money>();
        let actual = |rows: &[CategoryPerformance]| rows.iter().map(|r| r.actual).sum::<Money>();

        let net_budget_change = budgeted(simulated) - budgeted(baseline);
        let net_spending_change = actual(simulated) - actual(baseline);

        let headline = if net_spending_change.is_zero() {
            net_budget_change
        } else {
            net_spending_change
        };
        let direction = if headline.is_positive() {
            ImpactDirection::Increase
        } else if headline.is_negative() {
            ImpactDirection::Decrease
        } else {
            ImpactDirection::Neutral
        };

        let magnitude = net_budget_change.abs().max(net_spending_change.abs());
        let (risk, recommendation) = if magnitude < self.simulation.medium_risk_threshold {
            (RiskLevel::Low, "Low impact scenario - manageable changes")
        } else if magnitude < self.simulation.high_risk_threshold {
            (RiskLevel::Medium, "Moderate impact - review budget allocations")
        } else {
            (
                RiskLevel::High,
                "High impact scenario - significant budget review required",
            )
        };

        let status_changes = deltas
            .iter()
            .filter(|d| d.status_before != d.status_after)
            .map(|d| d.category.clone())
            .collect();

        ScenarioImpact {
            net_budget_change,
            net_spending_change,
            direction,
            risk,
            status_changes,
            recommendation: recommendation.to_string(),
        }
    }
}

/// Check a scenario before it is saved, using the same rules as a run
pub fn validate_scenario(scenario: &Scenario) -> LensResult<()> {
    if scenario.name.trim().is_empty() {
        return Err(LensError::Validation(
            "Scenario name must not be empty".into(),
        ));
    }
    validate_overlay(
        scenario.base_month,
        &scenario.transactions,
        &scenario.budget_overrides,
    )
}

fn validate_overlay(
    base_month: YearMonth,
    hypothetical: &[Transaction],
    budget_overrides: &BTreeMap<String, Money>,
) -> LensResult<()> {
    for txn in hypothetical {
        txn.validate()
            .map_err(|e| LensError::Validation(e.to_string()))?;
        if !base_month.contains(txn.date) {
            return Err(LensError::Validation(format!(
                "Hypothetical transaction dated {} is outside {}",
                txn.date, base_month
            )));
        }
    }

    for (category, amount) in budget_overrides {
        if category.trim().is_empty() {
            return Err(LensError::Validation(
                "Budget override category must not be empty".into(),
            ));
        }
        if amount.is_negative() {
            return Err(LensError::Validation(format!(
                "Budget override for '{}' cannot be negative ({})",
                category, amount
            )));
        }
    }

    Ok(())
}

/// Per-category differences `after - before`, sorted by category
///
/// A category present on only one side counts as zeros on the other.
pub fn compare_scenarios(
    before: &[CategoryPerformance],
    after: &[CategoryPerformance],
) -> Vec<CategoryDelta> {
    let mut aligned: BTreeMap<&str, (Option<&CategoryPerformance>, Option<&CategoryPerformance>)> =
        BTreeMap::new();
    for row in before {
        aligned.entry(row.category.as_str()).or_default().0 = Some(row);
    }
    for row in after {
        aligned.entry(row.category.as_str()).or_default().1 = Some(row);
    }

    aligned
        .into_iter()
        .map(|(category, (a, b))| {
            let pct_b = b.map(|r| r.variance_pct).unwrap_or(0.0);
            let pct_a = a.map(|r| r.variance_pct).unwrap_or(0.0);

            CategoryDelta {
                category: category.to_string(),
                budgeted: field(b, |r| r.budgeted) - field(a, |r| r.budgeted),
                actual: field(b, |r| r.actual) - field(a, |r| r.actual),
                variance: field(b, |r| r.variance) - field(a, |r| r.variance),
                variance_pct: ((pct_b - pct_a) * 100.0).round() / 100.0,
                status_before: a.map(|r| r.status),
                status_after: b.map(|r| r.status),
            }
        })
        .collect()
}

fn field(row: Option<&CategoryPerformance>, get: fn(&CategoryPerformance) -> Money) -> Money {
    row.map(get).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LensPaths;
    use crate::models::PerformanceStatus;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LensPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        (temp_dir, storage)
    }

    fn aug() -> YearMonth {
        YearMonth::parse("2025-08").unwrap()
    }

    fn txn(date: &str, category: &str, units: i64) -> Transaction {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        Transaction::new(date, category, Money::from_units(units))
    }

    fn seeded() -> (TempDir, Storage) {
        let (dir, storage) = create_test_storage();
        storage
            .budgets
            .set_budget(aug(), "Food", Money::from_units(3000))
            .unwrap();
        storage
            .transactions
            .add(txn("2025-08-15", "Food", 1250))
            .unwrap();
        (dir, storage)
    }

    fn simulator(storage: &Storage) -> Simulator<'_> {
        Simulator::from_storage(storage, &Settings::default())
    }

    #[test]
    fn test_simulate_overlays_hypotheticals() {
        let (_dir, storage) = seeded();
        let result = simulator(&storage)
            .simulate(aug(), &[txn("2025-08-20", "Food", 2000)], &BTreeMap::new())
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].actual, Money::from_units(3250));
        assert_eq!(result[0].status, PerformanceStatus::Over);
    }

    #[test]
    fn test_simulate_applies_overrides() {
        let (_dir, storage) = seeded();
        let overrides = BTreeMap::from([
            ("Food".to_string(), Money::from_units(1300)),
            ("Petrol".to_string(), Money::from_units(500)),
        ]);
        let result = simulator(&storage).simulate(aug(), &[], &overrides).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].category, "Food");
        assert_eq!(result[0].status, PerformanceStatus::Near);
        assert_eq!(result[1].category, "Petrol");
    }

    #[test]
    fn test_simulate_never_mutates_stores() {
        let (_dir, storage) = seeded();
        let txn_before = storage.transactions.fingerprint().unwrap();
        let budget_before = storage.budgets.fingerprint().unwrap();

        let overrides = BTreeMap::from([("Food".to_string(), Money::from_units(10))]);
        simulator(&storage)
            .simulate(aug(), &[txn("2025-08-20", "Shopping", 900)], &overrides)
            .unwrap();

        assert_eq!(storage.transactions.fingerprint().unwrap(), txn_before);
        assert_eq!(storage.budgets.fingerprint().unwrap(), budget_before);
        assert_eq!(storage.transactions.count().unwrap(), 1);
    }

    #[test]
    fn test_simulate_rejects_bad_input() {
        let (_dir, storage) = seeded();
        let sim = simulator(&storage);

        let outside = sim.simulate(aug(), &[txn("2025-09-01", "Food", 1)], &BTreeMap::new());
        assert!(outside.unwrap_err().is_validation());

        let empty = sim.simulate(aug(), &[txn("2025-08-01", " ", 1)], &BTreeMap::new());
        assert!(empty.unwrap_err().is_validation());

        let negative = BTreeMap::from([("Food".to_string(), Money::from_units(-1))]);
        assert!(sim.simulate(aug(), &[], &negative).unwrap_err().is_validation());
    }

    #[test]
    fn test_compare_scenarios() {
        let (_dir, storage) = seeded();
        let sim = simulator(&storage);

        let a = sim.simulate(aug(), &[], &BTreeMap::new()).unwrap();
        let b = sim
            .simulate(
                aug(),
                &[
                    txn("2025-08-20", "Food", 250),
                    txn("2025-08-21", "Shopping", 400),
                ],
                &BTreeMap::new(),
            )
            .unwrap();

        let deltas = compare_scenarios(&a, &b);
        assert_eq!(deltas.len(), 2);

        assert_eq!(deltas[0].category, "Food");
        assert_eq!(deltas[0].actual, Money::from_units(250));
        assert_eq!(deltas[0].variance, Money::from_units(-250));
        assert_eq!(deltas[0].budgeted, Money::zero());

        assert_eq!(deltas[1].category, "Shopping");
        assert_eq!(deltas[1].actual, Money::from_units(400));
        assert_eq!(deltas[1].status_before, None);
        assert_eq!(deltas[1].status_after, Some(PerformanceStatus::Over));
    }

    #[test]
    fn test_run_scenario_impact() {
        let (_dir, storage) = seeded();
        let scenario = Scenario::new("Road trip", aug())
            .with_transaction(txn("2025-08-20", "Petrol", 4000))
            .with_override("Petrol", Money::from_units(6000));

        let outcome = simulator(&storage).run_scenario(&scenario).unwrap();

        assert_eq!(outcome.baseline.len(), 1);
        assert_eq!(outcome.simulated.len(), 2);
        assert_eq!(outcome.impact.net_spending_change, Money::from_units(4000));
        assert_eq!(outcome.impact.net_budget_change, Money::from_units(6000));
        assert_eq!(outcome.impact.direction, ImpactDirection::Increase);
        assert_eq!(outcome.impact.risk, RiskLevel::Low);
        assert_eq!(outcome.impact.status_changes, vec!["Petrol"]);
    }

    #[test]
    fn test_run_scenario_high_risk() {
        let (_dir, storage) = seeded();
        let scenario = Scenario::new("Renovation", aug())
            .with_transaction(txn("2025-08-05", "Home", 75_000));

        let outcome = simulator(&storage).run_scenario(&scenario).unwrap();
        assert_eq!(outcome.impact.risk, RiskLevel::High);
    }

    #[test]
    fn test_validate_scenario() {
        let ok = Scenario::new("Party", aug()).with_transaction(txn("2025-08-20", "Food", 2000));
        assert!(validate_scenario(&ok).is_ok());

        let unnamed = Scenario::new("", aug());
        assert!(validate_scenario(&unnamed).unwrap_err().is_validation());

        let wrong_month =
            Scenario::new("Late", aug()).with_transaction(txn("2025-09-02", "Food", 1));
        assert!(validate_scenario(&wrong_month).unwrap_err().is_validation());
    }
}
