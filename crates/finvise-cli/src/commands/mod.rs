//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (load_config, open_store, require_client)
//! - `advisor` - AI commands (insights, chat, ai-test)
//! - `dashboard` - Dashboard, budgets and goals views
//! - `export` - CSV export
//! - `profile` - Profile display and update
//! - `transactions` - Transaction commands (list, add)

pub mod advisor;
pub mod core;
pub mod dashboard;
pub mod export;
pub mod profile;
pub mod transactions;

// Re-export command functions for main.rs
pub use advisor::*;
pub use self::core::*;
pub use dashboard::*;
pub use export::*;
pub use profile::*;
pub use transactions::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
