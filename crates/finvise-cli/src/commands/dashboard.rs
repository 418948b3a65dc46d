//! Dashboard, budgets and goals views

use anyhow::Result;
use finvise_core::{DashboardSummary, StateStore};

/// Width of the text bars
const BAR_WIDTH: usize = 20;

fn bar(fraction: f64) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

pub fn cmd_dashboard(store: &StateStore, json: bool) -> Result<()> {
    let summary = DashboardSummary::from_snapshot(store.state());

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let currency = store.profile().currency;

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│          💰 FinVise Dashboard           │");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Hello, {}", store.profile().name);
    println!();
    println!("  Income:     {:>14}", currency.format(summary.total_income));
    println!("  Expenses:   {:>14}", currency.format(summary.total_expenses));
    println!("  Net worth:  {:>14}", currency.format(summary.net_worth));
    println!();

    if !summary.daily_trend.is_empty() {
        let peak = summary
            .daily_trend
            .iter()
            .map(|p| p.amount)
            .fold(0.0_f64, f64::max);

        println!("  📈 Daily Spending");
        for point in &summary.daily_trend {
            let fraction = if peak > 0.0 { point.amount / peak } else { 0.0 };
            println!(
                "     {} │ {} {}",
                point.date,
                bar(fraction),
                currency.format(point.amount)
            );
        }
        println!();
    }

    if !summary.over_budget.is_empty() {
        let names: Vec<&str> = summary.over_budget.iter().map(|c| c.as_str()).collect();
        println!("  ⚠️  Over budget: {}", names.join(", "));
        println!();
    }

    println!("  Run 'finvise budgets' or 'finvise goals' for details.");

    Ok(())
}

pub fn cmd_budgets(store: &StateStore) -> Result<()> {
    if store.budgets().is_empty() {
        println!("No budgets set.");
        return Ok(());
    }

    let currency = store.profile().currency;

    println!();
    println!("📊 Budgets");
    println!("   ─────────────────────────────────────────────────────────────");

    for budget in store.budgets() {
        let marker = if budget.is_over() { " ⚠️" } else { "" };
        println!(
            "   {:<14} {} {:>10} / {:<10}{}",
            budget.category.as_str(),
            bar(budget.utilization()),
            currency.format(budget.spent),
            currency.format(budget.limit),
            marker
        );
    }

    Ok(())
}

pub fn cmd_goals(store: &StateStore) -> Result<()> {
    if store.goals().is_empty() {
        println!("No savings goals yet.");
        return Ok(());
    }

    let currency = store.profile().currency;

    println!();
    println!("🎯 Savings Goals");
    println!("   ─────────────────────────────────────────────────────────────");

    for goal in store.goals() {
        println!(
            "   {:<16} {} {:>3.0}%  {} of {} by {}",
            goal.name,
            bar(goal.progress()),
            goal.progress() * 100.0,
            currency.format(goal.current),
            currency.format(goal.target),
            goal.deadline
        );
    }

    Ok(())
}
