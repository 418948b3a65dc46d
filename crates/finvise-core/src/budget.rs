//! Budget updater: keeps per-category spent totals in step with new expenses

use tracing::debug;

use crate::models::{Budget, Transaction};

/// Add an expense to the budget with the same category.
///
/// Income and categories without a budget row are a no-op. `spent` is allowed
/// to pass `limit`. Returns true when a budget was changed.
pub fn apply_expense(budgets: &mut [Budget], tx: &Transaction) -> bool {
    if !tx.is_expense() {
        return false;
    }

    match budgets.iter_mut().find(|b| b.category == tx.category) {
        Some(budget) => {
            budget.spent += tx.amount;
            debug!(
                category = %budget.category,
                spent = budget.spent,
                limit = budget.limit,
                "Budget updated"
            );
            true
        }
        None => {
            debug!(category = %tx.category, "No budget for category, skipping update");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, NewTransaction};
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 11, 7).unwrap()
    }

    #[test]
    fn test_expense_increments_matching_budget() {
        let mut budgets = vec![
            Budget::new(Category::Food, 400.0, 50.0),
            Budget::new(Category::Housing, 1300.0, 1200.0),
        ];
        let tx = NewTransaction::expense(100.0, Category::Food, "Dinner", day())
            .with_id("x".to_string());

        assert!(apply_expense(&mut budgets, &tx));
        assert_eq!(budgets[0].spent, 150.0);
        assert_eq!(budgets[0].limit, 400.0);
        assert_eq!(budgets[1].spent, 1200.0);
    }

    #[test]
    fn test_income_is_ignored() {
        let mut budgets = vec![Budget::new(Category::Other, 100.0, 0.0)];
        let tx = NewTransaction::income(500.0, Category::Other, "Bonus", day())
            .with_id("x".to_string());

        assert!(!apply_expense(&mut budgets, &tx));
        assert_eq!(budgets[0].spent, 0.0);
    }

    #[test]
    fn test_missing_budget_is_silent_noop() {
        let mut budgets = vec![Budget::new(Category::Food, 400.0, 0.0)];
        let tx = NewTransaction::expense(30.0, Category::Health, "Pharmacy", day())
            .with_id("x".to_string());

        assert!(!apply_expense(&mut budgets, &tx));
        assert_eq!(budgets[0].spent, 0.0);
    }

    #[test]
    fn test_spent_may_exceed_limit() {
        let mut budgets = vec![Budget::new(Category::Food, 10.0, 5.0)];
        let tx = NewTransaction::expense(100.0, Category::Food, "Feast", day())
            .with_id("x".to_string());

        apply_expense(&mut budgets, &tx);
        assert_eq!(budgets[0].spent, 105.0);
        assert!(budgets[0].is_over());
    }
}
