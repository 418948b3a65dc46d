//! Derived dashboard views
//!
//! Pure functions over the current state; safe to recompute at any time.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Budget, Category, SavingsGoal, Transaction, TransactionType};
use crate::persistence::StateSnapshot;

/// Total spent on one day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Budget usage for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationEntry {
    pub category: Category,
    pub spent: f64,
    pub limit: f64,
}

fn total_of(transactions: &[Transaction], kind: TransactionType) -> f64 {
    transactions
        .iter()
        .filter(|t| t.kind == kind)
        .map(|t| t.amount)
        .sum()
}

pub fn total_income(transactions: &[Transaction]) -> f64 {
    total_of(transactions, TransactionType::Income)
}

pub fn total_expenses(transactions: &[Transaction]) -> f64 {
    total_of(transactions, TransactionType::Expense)
}

pub fn net_worth(transactions: &[Transaction]) -> f64 {
    total_income(transactions) - total_expenses(transactions)
}

/// Expense totals per date, oldest first. Days without expenses are omitted.
pub fn daily_trend(transactions: &[Transaction]) -> Vec<TrendPoint> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for tx in transactions.iter().filter(|t| t.is_expense()) {
        *by_date.entry(tx.date).or_insert(0.0) += tx.amount;
    }

    by_date
        .into_iter()
        .map(|(date, amount)| TrendPoint { date, amount })
        .collect()
}

/// One entry per budget, in budget order
pub fn allocation(budgets: &[Budget]) -> Vec<AllocationEntry> {
    budgets
        .iter()
        .map(|b| AllocationEntry {
            category: b.category,
            spent: b.spent,
            limit: b.limit,
        })
        .collect()
}

/// Transactions whose description contains `search` (case-insensitive) and,
/// when given, whose category matches. Storage order is kept.
pub fn filter_transactions<'a>(
    transactions: &'a [Transaction],
    search: Option<&str>,
    category: Option<Category>,
) -> Vec<&'a Transaction> {
    let needle = search.map(str::to_lowercase).unwrap_or_default();
    transactions
        .iter()
        .filter(|t| category.map_or(true, |c| t.category == c))
        .filter(|t| needle.is_empty() || t.description.to_lowercase().contains(&needle))
        .collect()
}

/// Progress toward one savings goal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub name: String,
    pub current: f64,
    pub target: f64,
    pub progress: f64,
    pub deadline: NaiveDate,
}

pub fn goal_progress(goals: &[SavingsGoal]) -> Vec<GoalProgress> {
    goals
        .iter()
        .map(|g| GoalProgress {
            name: g.name.clone(),
            current: g.current,
            target: g.target,
            progress: g.progress(),
            deadline: g.deadline,
        })
        .collect()
}

/// Everything the dashboard shows, computed in one pass over a snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_worth: f64,
    pub daily_trend: Vec<TrendPoint>,
    pub allocation: Vec<AllocationEntry>,
    pub goals: Vec<GoalProgress>,
    /// Categories whose spending has passed the limit
    pub over_budget: Vec<Category>,
}

impl DashboardSummary {
    pub fn from_snapshot(state: &StateSnapshot) -> Self {
        let total_income = total_income(&state.transactions);
        let total_expenses = total_expenses(&state.transactions);

        Self {
            total_income,
            total_expenses,
            net_worth: total_income - total_expenses,
            daily_trend: daily_trend(&state.transactions),
            allocation: allocation(&state.budgets),
            goals: goal_progress(&state.goals),
            over_budget: state
                .budgets
                .iter()
                .filter(|b| b.is_over())
                .map(|b| b.category)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTransaction;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 11, d).unwrap()
    }

    fn expense(amount: f64, d: u32) -> Transaction {
        NewTransaction::expense(amount, Category::Food, "x", day(d)).with_id(format!("e{}", d))
    }

    fn income(amount: f64, d: u32) -> Transaction {
        NewTransaction::income(amount, Category::Other, "x", day(d)).with_id(format!("i{}", d))
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(total_income(&[]), 0.0);
        assert_eq!(total_expenses(&[]), 0.0);
        assert_eq!(net_worth(&[]), 0.0);
        assert!(daily_trend(&[]).is_empty());
        assert!(allocation(&[]).is_empty());

        let summary = DashboardSummary::from_snapshot(&StateSnapshot::empty());
        assert_eq!(summary.net_worth, 0.0);
        assert!(summary.daily_trend.is_empty());
    }

    #[test]
    fn test_seed_totals() {
        let state = StateSnapshot::seeded();
        let summary = DashboardSummary::from_snapshot(&state);
        assert_eq!(summary.total_income, 3500.0);
        assert_eq!(summary.total_expenses, 1390.0);
        assert_eq!(summary.net_worth, 2110.0);
        assert_eq!(summary.allocation.len(), 5);
        assert_eq!(summary.allocation[0].category, Category::Housing);
        assert!(summary.over_budget.is_empty());
    }

    #[test]
    fn test_net_worth_identity() {
        let txs = vec![income(1000.0, 1), expense(250.5, 2), expense(100.0, 3), income(5.0, 4)];
        assert_eq!(net_worth(&txs), total_income(&txs) - total_expenses(&txs));
        assert_eq!(net_worth(&txs), 654.5);
    }

    #[test]
    fn test_daily_trend_groups_sorts_and_skips_income() {
        // Stored newest first, like the store keeps them
        let txs = vec![
            expense(5.0, 9),
            income(999.0, 5),
            expense(10.0, 3),
            expense(20.0, 9),
            expense(1.0, 1),
        ];

        let trend = daily_trend(&txs);
        assert_eq!(
            trend,
            vec![
                TrendPoint { date: day(1), amount: 1.0 },
                TrendPoint { date: day(3), amount: 10.0 },
                TrendPoint { date: day(9), amount: 25.0 },
            ]
        );
        assert!(trend.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_allocation_keeps_budget_order() {
        let budgets = vec![
            Budget::new(Category::Shopping, 300.0, 80.0),
            Budget::new(Category::Food, 400.0, 50.0),
        ];
        let alloc = allocation(&budgets);
        assert_eq!(alloc[0].category, Category::Shopping);
        assert_eq!(alloc[1].spent, 50.0);
        assert_eq!(alloc[1].limit, 400.0);
    }

    #[test]
    fn test_over_budget_listed() {
        let mut state = StateSnapshot::empty();
        state.budgets = vec![
            Budget::new(Category::Food, 100.0, 150.0),
            Budget::new(Category::Health, 100.0, 100.0),
        ];
        let summary = DashboardSummary::from_snapshot(&state);
        assert_eq!(summary.over_budget, vec![Category::Food]);
    }

    #[test]
    fn test_filter_by_search_ignores_case() {
        let state = StateSnapshot::seeded();
        let found = filter_transactions(&state.transactions, Some("SUBWAY"), None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].description, "Subway Ride");

        let found = filter_transactions(&state.transactions, Some("e"), None);
        let names: Vec<&str> = found.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(
            names,
            vec!["Rent Payment", "Grocery Store", "Subway Ride", "New Shoes", "Cinema"]
        );
    }

    #[test]
    fn test_filter_by_category() {
        let state = StateSnapshot::seeded();
        let found = filter_transactions(&state.transactions, None, Some(Category::Food));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "3");

        assert!(filter_transactions(&state.transactions, None, Some(Category::Health)).is_empty());
    }

    #[test]
    fn test_filter_combines_search_and_category() {
        let state = StateSnapshot::seeded();
        assert!(filter_transactions(&state.transactions, Some("rent"), Some(Category::Food)).is_empty());
        assert_eq!(
            filter_transactions(&state.transactions, Some("rent"), Some(Category::Housing)).len(),
            1
        );
    }

    #[test]
    fn test_filter_without_criteria_keeps_everything() {
        let state = StateSnapshot::seeded();
        assert_eq!(filter_transactions(&state.transactions, None, None).len(), 6);
        assert_eq!(filter_transactions(&state.transactions, Some(""), None).len(), 6);
        assert!(filter_transactions(&[], Some("x"), None).is_empty());
    }
}
