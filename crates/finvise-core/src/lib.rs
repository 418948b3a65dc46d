//! FinVise Core Library
//!
//! Shared functionality for the FinVise personal finance advisor:
//! - State store with whole-aggregate persistence
//! - Derived dashboard views (totals, daily trend, budget allocation)
//! - Budget tracking on new expenses
//! - AI insights with last-trigger-wins refresh
//! - Streaming advisor chat with grounding sources
//! - Pluggable advisory backends (Ollama, OpenAI-compatible)

pub mod advice;
pub mod ai;
pub mod budget;
pub mod chat;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod persistence;
pub mod seed;
pub mod store;
pub mod summary;

/// Test utilities including a mock advisory server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use advice::{request_insights, AdviceSession};
pub use ai::{
    AdvisorBackend, AdvisorClient, BackendInfo, ChatChunk, MockBackend, MockReply, OllamaBackend,
    OpenAICompatibleBackend,
};
pub use chat::{CancelHandle, ChatOutcome, ChatSession, ChatState};
pub use config::AppConfig;
pub use error::{Error, Result};
pub use export::write_transactions_csv;
pub use models::{
    AIInsight, Budget, Category, ChatMessage, ChatRole, Currency, GroundingSource, Impact,
    NewTransaction, SavingsGoal, Transaction, TransactionType, UserProfile,
};
pub use persistence::{FileStore, KeyValueStore, MemoryStore, StateSnapshot, STATE_KEY};
pub use store::{LoadOutcome, StateStore};
pub use summary::{filter_transactions, DashboardSummary};
