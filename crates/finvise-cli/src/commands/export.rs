//! Export command implementation

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use finvise_core::{write_transactions_csv, StateStore};

pub fn cmd_export(store: &StateStore, output: Option<&Path>) -> Result<()> {
    let transactions = store.transactions();

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_transactions_csv(BufWriter::new(file), transactions)
                .context("Failed to write CSV")?;
            eprintln!(
                "✅ Exported {} transactions to {}",
                transactions.len(),
                path.display()
            );
        }
        None => {
            write_transactions_csv(io::stdout().lock(), transactions)
                .context("Failed to write CSV")?;
        }
    }

    Ok(())
}
