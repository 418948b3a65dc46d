//! FinVise CLI - Personal finance tracker with an AI advisor
//!
//! Usage:
//!   finvise dashboard                          Totals, trend and budgets
//!   finvise add -a 12.5 -c Food -d Lunch       Record an expense
//!   finvise insights                           Three AI insights
//!   finvise chat "Should I refinance?"         Ask the advisor

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref())?;
    let data_dir = cli.data_dir.as_deref();

    match cli.command {
        Commands::Dashboard { json } => {
            let store = commands::open_store(&config, data_dir)?;
            commands::cmd_dashboard(&store, json)
        }
        Commands::Transactions { action } => {
            let store = commands::open_store(&config, data_dir)?;
            match action {
                None => commands::cmd_transactions_list(&store, 20, None, None),
                Some(TransactionsAction::List {
                    limit,
                    search,
                    category,
                }) => commands::cmd_transactions_list(
                    &store,
                    limit,
                    search.as_deref(),
                    category.as_deref(),
                ),
            }
        }
        Commands::Add {
            amount,
            category,
            description,
            date,
            kind,
        } => {
            let mut store = commands::open_store(&config, data_dir)?;
            commands::cmd_add(
                &mut store,
                amount,
                &category,
                &description,
                date.as_deref(),
                &kind,
            )
        }
        Commands::Budgets => {
            let store = commands::open_store(&config, data_dir)?;
            commands::cmd_budgets(&store)
        }
        Commands::Goals => {
            let store = commands::open_store(&config, data_dir)?;
            commands::cmd_goals(&store)
        }
        Commands::Profile { name, currency } => {
            let mut store = commands::open_store(&config, data_dir)?;
            commands::cmd_profile(&mut store, name.as_deref(), currency.as_deref())
        }
        Commands::Insights => {
            let store = commands::open_store(&config, data_dir)?;
            let client = commands::require_client()?;
            commands::cmd_insights(&config, &store, client).await
        }
        Commands::Chat { message } => {
            let client = commands::require_client()?;
            commands::cmd_chat(&config, &client, &message).await?;
            Ok(())
        }
        Commands::Export { output } => {
            let store = commands::open_store(&config, data_dir)?;
            commands::cmd_export(&store, output.as_deref())
        }
        Commands::AiTest => commands::cmd_ai_test().await,
    }
}
