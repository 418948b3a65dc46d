//! Transaction command implementations

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use finvise_core::{
    filter_transactions, Category, Currency, NewTransaction, StateStore, Transaction,
    TransactionType,
};

use super::truncate;

/// Visible width of the amount column
const AMOUNT_WIDTH: usize = 12;

/// Signed amount right-aligned to `AMOUNT_WIDTH` visible columns, then coloured
pub fn amount_cell(tx: &Transaction, currency: Currency) -> String {
    if tx.is_expense() {
        let plain = format!("{:>AMOUNT_WIDTH$}", format!("-{}", currency.format(tx.amount)));
        format!("\x1b[31m{}\x1b[0m", plain) // Red for expenses
    } else {
        let plain = format!("{:>AMOUNT_WIDTH$}", format!("+{}", currency.format(tx.amount)));
        format!("\x1b[32m{}\x1b[0m", plain) // Green for income
    }
}

/// List transactions, newest first, optionally narrowed by a description
/// search and a category ("All" means no category filter)
pub fn cmd_transactions_list(
    store: &StateStore,
    limit: usize,
    search: Option<&str>,
    category: Option<&str>,
) -> Result<()> {
    let category = match category {
        None => None,
        Some(c) if c.trim().eq_ignore_ascii_case("all") => None,
        Some(c) => Some(c.parse::<Category>().map_err(|e: String| anyhow!(e))?),
    };

    if store.transactions().is_empty() {
        println!("No transactions found. Record one with:");
        println!("  finvise add --amount 12.50 --category Food --description Lunch");
        return Ok(());
    }

    let transactions = filter_transactions(store.transactions(), search, category);
    tracing::debug!(
        total = store.transactions().len(),
        matched = transactions.len(),
        "Filtered transactions"
    );

    if transactions.is_empty() {
        println!("No transactions match the given filters.");
        return Ok(());
    }

    let currency = store.profile().currency;

    println!();
    println!("📝 Recent Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions.iter().take(limit) {
        println!(
            "   {} │ {} │ {:<13} │ {}",
            tx.date,
            amount_cell(tx, currency),
            tx.category.as_str(),
            truncate(&tx.description, 40)
        );
    }

    if transactions.len() > limit {
        println!("   … {} more", transactions.len() - limit);
    }

    Ok(())
}

pub fn cmd_add(
    store: &mut StateStore,
    amount: f64,
    category: &str,
    description: &str,
    date: Option<&str>,
    kind: &str,
) -> Result<()> {
    let category: Category = category.parse().map_err(|e: String| anyhow!(e))?;
    let kind: TransactionType = kind.parse().map_err(|e: String| anyhow!(e))?;
    let date = match date {
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", d))?,
        None => Local::now().date_naive(),
    };

    let input = NewTransaction {
        amount,
        category,
        description: description.trim().to_string(),
        date,
        kind,
    };
    let tx = store
        .add_transaction(input)
        .context("Failed to record transaction")?;
    tracing::info!(id = %tx.id, "Recorded transaction from CLI");

    let currency = store.profile().currency;
    println!(
        "✅ Recorded {} {} for {} ({})",
        tx.kind,
        currency.format(tx.amount),
        tx.category,
        tx.description
    );

    if tx.is_expense() {
        if let Some(budget) = store.budgets().iter().find(|b| b.category == tx.category) {
            println!(
                "   {} budget: {} of {} used",
                budget.category,
                currency.format(budget.spent),
                currency.format(budget.limit)
            );
            if budget.is_over() {
                println!("   ⚠️  Over budget by {}", currency.format(-budget.remaining()));
            }
        }
    }

    Ok(())
}
