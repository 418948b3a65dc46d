//! Starter dataset used when nothing has been persisted yet

use chrono::NaiveDate;

use crate::models::{Budget, Category, SavingsGoal, Transaction, TransactionType};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn tx(
    id: &str,
    amount: f64,
    category: Category,
    description: &str,
    on: NaiveDate,
    kind: TransactionType,
) -> Transaction {
    Transaction {
        id: id.to_string(),
        amount,
        category,
        description: description.to_string(),
        date: on,
        kind,
    }
}

/// Seed transactions, in stored (insertion) order
pub fn transactions() -> Vec<Transaction> {
    use TransactionType::{Expense, Income};
    vec![
        tx("1", 3500.0, Category::Other, "Monthly Salary", date(2023, 11, 1), Income),
        tx("2", 1200.0, Category::Housing, "Rent Payment", date(2023, 11, 2), Expense),
        tx("3", 50.0, Category::Food, "Grocery Store", date(2023, 11, 3), Expense),
        tx("4", 15.0, Category::Transport, "Subway Ride", date(2023, 11, 4), Expense),
        tx("5", 80.0, Category::Shopping, "New Shoes", date(2023, 11, 5), Expense),
        tx("6", 45.0, Category::Entertainment, "Cinema", date(2023, 11, 6), Expense),
    ]
}

pub fn budgets() -> Vec<Budget> {
    vec![
        Budget::new(Category::Housing, 1300.0, 1200.0),
        Budget::new(Category::Food, 400.0, 50.0),
        Budget::new(Category::Transport, 200.0, 15.0),
        Budget::new(Category::Shopping, 300.0, 80.0),
        Budget::new(Category::Entertainment, 150.0, 45.0),
    ]
}

pub fn goals() -> Vec<SavingsGoal> {
    vec![
        SavingsGoal {
            id: "g1".to_string(),
            name: "Emergency Fund".to_string(),
            target: 5000.0,
            current: 2500.0,
            deadline: date(2024, 12, 31),
        },
        SavingsGoal {
            id: "g2".to_string(),
            name: "New Laptop".to_string(),
            target: 2000.0,
            current: 400.0,
            deadline: date(2024, 6, 30),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_budgets_match_seed_expenses() {
        let txs = transactions();
        for budget in budgets() {
            let spent: f64 = txs
                .iter()
                .filter(|t| t.is_expense() && t.category == budget.category)
                .map(|t| t.amount)
                .sum();
            assert_eq!(spent, budget.spent, "{}", budget.category);
        }
    }

    #[test]
    fn test_seed_sizes() {
        assert_eq!(transactions().len(), 6);
        assert_eq!(budgets().len(), 5);
        assert_eq!(goals().len(), 2);
    }
}
