//! Budget and template display formatting

use crate::models::{Budget, BudgetTemplate, Money, YearMonth};

use super::transaction::truncate;

/// Format the ceilings for a month
pub fn format_budget_list(month: YearMonth, budgets: &[Budget]) -> String {
    if budgets.is_empty() {
        return format!("No budgets set for {}.\n", month);
    }

    let mut output = String::new();
    output.push_str(&format!("Budgets for {}\n", month.label()));
    output.push_str(&"-".repeat(34));
    output.push('\n');

    for budget in budgets {
        output.push_str(&format!(
            "{:20} {:>13}\n",
            truncate(&budget.category, 20),
            budget.amount
        ));
    }

    let total: Money = budgets.iter().map(|b| b.amount).sum();
    output.push_str(&"-".repeat(34));
    output.push('\n');
    output.push_str(&format!("{:20} {:>13}\n", "Total", total));
    output
}

/// Format a template's lines
pub fn format_template(template: &BudgetTemplate) -> String {
    let mut output = format!("{} (total {})\n", template.name, template.total());
    for (category, amount) in &template.amounts {
        output.push_str(&format!("  {:20} {:>13}\n", truncate(category, 20), amount));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_list() {
        let aug = YearMonth::parse("2025-08").unwrap();
        let budgets = vec![
            Budget::new(aug, "Food", Money::from_units(3000)),
            Budget::new(aug, "Petrol", Money::from_units(2500)),
        ];
        let out = format_budget_list(aug, &budgets);
        assert!(out.starts_with("Budgets for August 2025"));
        assert!(out.contains("5500.00"));

        assert_eq!(format_budget_list(aug, &[]), "No budgets set for 2025-08.\n");
    }

    #[test]
    fn test_template() {
        let template = BudgetTemplate::new("Lean").with("Food", Money::from_units(10));
        let out = format_template(&template);
        assert!(out.starts_with("Lean (total 10.00)"));
    }
}
