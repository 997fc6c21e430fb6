//! Analytics and simulation display formatting

use crate::models::{
    BudgetSuggestion, CategoryDelta, CategoryHistory, CategoryPerformance, Insight, Money,
    PerformanceStatus, ScenarioOutcome, TrendResult,
};
use crate::storage::SavedScenario;

use super::report::{format_bar, format_percentage, format_title, separator};
use super::transaction::truncate;

const BAR_WIDTH: usize = 20;

/// Format a spending trend as a per-month bar chart
pub fn format_trend(trend: &TrendResult) -> String {
    let title = match &trend.category {
        Some(category) => format!("Spending trend: {}", category),
        None => "Spending trend: all categories".to_string(),
    };

    let mut output = format_title(&title);
    let max = trend.max.as_f64();

    for point in &trend.periods {
        output.push_str(&format!(
            "{}  {:>12}  {}\n",
            point.period,
            point.total,
            format_bar(point.total.as_f64(), max, BAR_WIDTH)
        ));
    }

    output.push_str(&separator(50));
    output.push('\n');
    output.push_str(&format!("Direction: {}\n", trend.direction));
    output.push_str(&format!(
        "Average: {}  Min: {}  Max: {}  Total: {}\n",
        trend.average, trend.min, trend.max, trend.total
    ));
    output
}

fn status_marker(status: PerformanceStatus) -> &'static str {
    match status {
        PerformanceStatus::Under => "   ",
        PerformanceStatus::Near => " ~ ",
        PerformanceStatus::Over => " ! ",
    }
}

/// Format budget vs. actual rows
pub fn format_performance(rows: &[CategoryPerformance]) -> String {
    if rows.is_empty() {
        return "No budgets or spending for this month.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:20} {:>12} {:>12} {:>12} {:>8}   {}\n",
        "Category", "Budgeted", "Actual", "Remaining", "Var %", "Status"
    ));
    output.push_str(&separator(76));
    output.push('\n');

    for row in rows {
        output.push_str(&format!(
            "{:20} {:>12} {:>12} {:>12} {:>8}{}{}\n",
            truncate(&row.category, 20),
            row.budgeted,
            row.actual,
            row.variance,
            format_percentage(row.variance_pct),
            status_marker(row.status),
            row.status
        ));
    }

    let budgeted: Money = rows.iter().map(|r| r.budgeted).sum();
    let actual: Money = rows.iter().map(|r| r.actual).sum();
    output.push_str(&separator(76));
    output.push('\n');
    output.push_str(&format!(
        "{:20} {:>12} {:>12} {:>12}\n",
        "Total",
        budgeted,
        actual,
        budgeted - actual
    ));
    output
}

/// Format a category's history summary
pub fn format_category_history(history: &CategoryHistory) -> String {
    let mut output = format_title(&format!("Category: {}", history.category));

    if history.months_with_data == 0 {
        output.push_str("No spending recorded.\n");
        return output;
    }

    if let (Some(first), Some(last)) = (history.first_month, history.last_month) {
        output.push_str(&format!("Period:             {} to {}\n", first, last));
    }
    output.push_str(&format!(
        "Months with data:   {}\n",
        history.months_with_data
    ));
    output.push_str(&format!(
        "Months over budget: {}\n",
        history.months_over_budget
    ));
    output.push_str(&format!("Total spent:        {}\n", history.total_spent));
    output.push_str(&format!("Total budgeted:     {}\n", history.total_budget));
    output.push_str(&format!("Monthly average:    {}\n", history.average_monthly));
    if history.total_budget.is_positive() {
        output.push_str(&format!(
            "Adherence:          {}\n",
            format_percentage(history.adherence_pct)
        ));
    }
    output
}

/// Format suggested budget changes
pub fn format_suggestions(suggestions: &[BudgetSuggestion]) -> String {
    if suggestions.is_empty() {
        return "No budget adjustments suggested.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:20} {:>12} {:>12} {:>12}\n",
        "Category", "Current", "Actual", "Suggested"
    ));
    output.push_str(&separator(59));
    output.push('\n');
    for s in suggestions {
        output.push_str(&format!(
            "{:20} {:>12} {:>12} {:>12}\n",
            truncate(&s.category, 20),
            s.current,
            s.actual,
            s.suggested
        ));
    }
    output
}

/// Format insight messages, one per line
pub fn format_insights(insights: &[Insight]) -> String {
    if insights.is_empty() {
        return "Spending is in line with budgets.\n".to_string();
    }
    insights.iter().map(|i| format!("{}\n", i)).collect()
}

/// Format per-category before/after differences
pub fn format_deltas(deltas: &[CategoryDelta]) -> String {
    if deltas.is_empty() {
        return "No differences.\n".to_string();
    }

    let status = |s: Option<PerformanceStatus>| match s {
        Some(s) => s.to_string(),
        None => "-".to_string(),
    };

    let mut output = String::new();
    output.push_str(&format!(
        "{:20} {:>12} {:>12} {:>12}  {}\n",
        "Category", "Budget Δ", "Actual Δ", "Remaining Δ", "Status"
    ));
    output.push_str(&separator(76));
    output.push('\n');
    for d in deltas {
        output.push_str(&format!(
            "{:20} {:>12} {:>12} {:>12}  {} -> {}\n",
            truncate(&d.category, 20),
            d.budgeted,
            d.actual,
            d.variance,
            status(d.status_before),
            status(d.status_after)
        ));
    }
    output
}

/// Format the saved scenario list
pub fn format_saved_scenarios(scenarios: &[SavedScenario]) -> String {
    if scenarios.is_empty() {
        return "No saved scenarios.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:24} {:8} {:>6} {:>9}  {}\n",
        "Name", "Month", "Txns", "Overrides", "Saved"
    ));
    output.push_str(&separator(70));
    output.push('\n');
    for saved in scenarios {
        let scenario = &saved.scenario;
        output.push_str(&format!(
            "{:24} {:8} {:>6} {:>9}  {}\n",
            truncate(&scenario.name, 24),
            scenario.base_month,
            scenario.transactions.len(),
            scenario.budget_overrides.len(),
            saved.saved_at.format("%Y-%m-%d %H:%M")
        ));
    }
    output
}

/// Format the full result of a simulation run
pub fn format_scenario_outcome(outcome: &ScenarioOutcome) -> String {
    let mut output = format_title(&format!("Scenario: {} ({})", outcome.name, outcome.month));

    output.push_str("\nSimulated\n");
    output.push_str(&format_performance(&outcome.simulated));
    output.push_str("\nChanges\n");
    output.push_str(&format_deltas(&outcome.deltas));

    let impact = &outcome.impact;
    output.push('\n');
    output.push_str(&format!("Budget change:   {}\n", impact.net_budget_change));
    output.push_str(&format!("Spending change: {}\n", impact.net_spending_change));
    output.push_str(&format!("Direction:       {}\n", impact.direction));
    output.push_str(&format!("Risk:            {}\n", impact.risk));
    if !impact.status_changes.is_empty() {
        output.push_str(&format!(
            "Status changed:  {}\n",
            impact.status_changes.join(", ")
        ));
    }
    output.push_str(&format!("Recommendation:  {}\n", impact.recommendation));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InsightLevel, Scenario, TrendDirection, TrendPoint, YearMonth};

    fn perf(
        category: &str,
        budgeted: i64,
        actual: i64,
        status: PerformanceStatus,
    ) -> CategoryPerformance {
        CategoryPerformance {
            category: category.into(),
            budgeted: Money::from_units(budgeted),
            actual: Money::from_units(actual),
            variance: Money::from_units(budgeted - actual),
            variance_pct: 0.0,
            status,
        }
    }

    #[test]
    fn test_performance_table() {
        let rows = vec![
            perf("Food", 3000, 3500, PerformanceStatus::Over),
            perf("Petrol", 2500, 1000, PerformanceStatus::Under),
        ];
        let out = format_performance(&rows);
        assert!(out.contains(" ! over"));
        assert!(out.contains("5500.00"));
        assert!(out.contains("4500.00"));
    }

    #[test]
    fn test_trend_chart() {
        let aug = YearMonth::parse("2025-08").unwrap();
        let trend = TrendResult {
            category: Some("Food".into()),
            periods: vec![
                TrendPoint {
                    period: aug.prev(),
                    total: Money::from_units(500),
                },
                TrendPoint {
                    period: aug,
                    total: Money::from_units(1000),
                },
            ],
            direction: TrendDirection::Rising,
            average: Money::from_units(750),
            total: Money::from_units(1500),
            min: Money::from_units(500),
            max: Money::from_units(1000),
        };
        let out = format_trend(&trend);
        assert!(out.starts_with("Spending trend: Food"));
        assert!(out.contains("2025-07"));
        assert!(out.contains("Direction: rising"));
    }

    #[test]
    fn test_insights_and_empty_states() {
        let insights = vec![Insight {
            level: InsightLevel::Warning,
            category: Some("Food".into()),
            message: "Food is over budget".into(),
        }];
        assert_eq!(format_insights(&insights), "[!] Food is over budget\n");
        assert_eq!(format_insights(&[]), "Spending is in line with budgets.\n");
        assert_eq!(format_suggestions(&[]), "No budget adjustments suggested.\n");
    }

    #[test]
    fn test_category_history() {
        let aug = YearMonth::parse("2025-08").unwrap();
        let history = CategoryHistory {
            category: "Food".into(),
            months_with_data: 2,
            months_over_budget: 1,
            total_spent: Money::from_units(3300),
            total_budget: Money::from_units(3000),
            average_monthly: Money::from_units(1650),
            adherence_pct: 110.0,
            first_month: Some(aug.prev()),
            last_month: Some(aug),
        };
        let out = format_category_history(&history);
        assert!(out.starts_with("Category: Food"));
        assert!(out.contains("Period:             2025-07 to 2025-08"));
        assert!(out.contains("Months over budget: 1"));
        assert!(out.contains("Adherence:          110.0%"));
    }

    #[test]
    fn test_saved_scenarios() {
        assert_eq!(format_saved_scenarios(&[]), "No saved scenarios.\n");

        let saved = SavedScenario {
            saved_at: chrono::Utc::now(),
            scenario: Scenario::new("Road trip", YearMonth::parse("2025-08").unwrap())
                .with_override("Petrol", Money::from_units(6000)),
        };
        let out = format_saved_scenarios(&[saved]);
        assert!(out.contains("Road trip"));
        assert!(out.contains("2025-08"));
    }
}
