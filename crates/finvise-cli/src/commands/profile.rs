//! Profile command implementation

use anyhow::{anyhow, bail, Context, Result};
use finvise_core::{Currency, StateStore};

/// Show the profile, or update the given fields
pub fn cmd_profile(store: &mut StateStore, name: Option<&str>, currency: Option<&str>) -> Result<()> {
    if name.is_none() && currency.is_none() {
        let profile = store.profile();
        println!();
        println!("👤 Profile");
        println!("   Name:     {}", profile.name);
        println!("   Currency: {}", profile.currency);
        return Ok(());
    }

    let mut profile = store.profile().clone();

    if let Some(name) = name {
        let name = name.trim();
        if name.is_empty() {
            bail!("Name cannot be empty");
        }
        profile.name = name.to_string();
    }
    if let Some(code) = currency {
        profile.currency = code.parse::<Currency>().map_err(|e| anyhow!(e))?;
    }

    store
        .update_profile(profile)
        .context("Failed to save profile")?;

    let profile = store.profile();
    println!("✅ Profile updated: {} · {}", profile.name, profile.currency);
    Ok(())
}
