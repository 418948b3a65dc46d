//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// FinVise - Track spending and talk to an AI financial advisor
#[derive(Parser)]
#[command(name = "finvise")]
#[command(about = "Personal finance tracker with an AI advisor", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Data directory (overrides the config file)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Config file (defaults to ~/.local/share/finvise/config.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show totals, daily spending trend and budget usage
    Dashboard {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// List transactions
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Record a transaction
    Add {
        /// Amount (positive)
        #[arg(short, long)]
        amount: f64,

        /// Category: Housing, Food, Transport, Entertainment, Shopping, Health, Education, Other
        #[arg(short, long)]
        category: String,

        /// What it was for
        #[arg(short, long)]
        description: String,

        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// income or expense
        #[arg(short, long, default_value = "expense")]
        kind: String,
    },

    /// Show budget usage per category
    Budgets,

    /// Show savings goal progress
    Goals,

    /// Show or update the profile
    Profile {
        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Display currency (USD, EUR, GBP, JPY or a symbol)
        #[arg(long)]
        currency: Option<String>,
    },

    /// Ask the advisor for three insights on the current data
    Insights,

    /// Ask the advisor a question (Ctrl-C stops the reply)
    Chat {
        /// Your question
        message: String,
    },

    /// Export transactions as CSV
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Test the advisory backend connection
    AiTest,
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List recent transactions
    List {
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Only show transactions whose description contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Only show this category ("All" for every category)
        #[arg(short, long)]
        category: Option<String>,
    },
}
