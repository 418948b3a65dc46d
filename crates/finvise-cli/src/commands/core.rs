//! Shared utilities for commands
//!
//! - `load_config` - Resolve the config file
//! - `open_store` - Open the file-backed state store
//! - `require_client` - Advisory backend from the environment

use std::path::Path;

use anyhow::{Context, Result};
use finvise_core::{AdvisorClient, AppConfig, FileStore, LoadOutcome, StateStore};

pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    AppConfig::load(path).context("Failed to load config")
}

/// Open the state store, restoring saved data if there is any
pub fn open_store(config: &AppConfig, data_dir: Option<&Path>) -> Result<StateStore> {
    let dir = match data_dir {
        Some(dir) => dir.to_path_buf(),
        None => config.data_dir()?,
    };

    let storage = FileStore::new(&dir)
        .with_context(|| format!("Failed to open data directory {}", dir.display()))?;
    let mut store = StateStore::new(Box::new(storage)).with_key(&config.storage_key);

    if store.load() == LoadOutcome::Discarded {
        println!("⚠️  Saved data was unreadable; starting from the sample data");
    }
    Ok(store)
}

/// Advisory backend selected by AI_BACKEND / OLLAMA_HOST / OPENAI_COMPATIBLE_HOST
pub fn require_client() -> Result<AdvisorClient> {
    AdvisorClient::from_env().context(
        "No advisory backend configured. Set OLLAMA_HOST (or AI_BACKEND=mock to try it out)",
    )
}
