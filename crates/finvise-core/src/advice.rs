//! AI-generated financial insights
//!
//! `request_insights` is the one-shot call. `AdviceSession` wraps it for
//! callers that refresh whenever the data changes: refreshes may overlap, and
//! only the most recently triggered one is allowed to publish its result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::ai::parsing::parse_insights;
use crate::ai::AdvisorBackend;
use crate::models::{AIInsight, Budget, SavingsGoal, Transaction};
use crate::persistence::StateSnapshot;

/// How many of the most recent transactions are sent as context
pub const DEFAULT_TRANSACTION_SAMPLE: usize = 20;

pub const INSIGHT_INSTRUCTION: &str = "\
Act as a senior personal finance expert. Analyze the user's financial situation.
Identify 3 highly specific, actionable insights.
Focus on:
1. A spending leak (where they are overspending).
2. A savings opportunity (how to reach a goal faster).
3. A budget health check.

Respond with only a JSON array of exactly 3 objects, each with the fields
\"title\" (string), \"advice\" (string) and \"impact\" (one of: low, medium, high).";

/// Build the insight prompt from a bounded view of the user's data.
///
/// Transactions are stored newest first, so the first `sample` are the most
/// recent.
pub fn build_insight_prompt(
    transactions: &[Transaction],
    budgets: &[Budget],
    goals: &[SavingsGoal],
    sample: usize,
) -> String {
    let recent = &transactions[..transactions.len().min(sample)];

    format!(
        "User Transactions: {}\nUser Budgets: {}\nUser Goals: {}\n\n{}",
        json!(recent),
        json!(budgets),
        json!(goals),
        INSIGHT_INSTRUCTION
    )
}

/// Ask the backend for three insights.
///
/// Never fails: a transport error or an unusable response yields an empty list.
pub async fn request_insights<B: AdvisorBackend + ?Sized>(
    backend: &B,
    transactions: &[Transaction],
    budgets: &[Budget],
    goals: &[SavingsGoal],
    sample: usize,
) -> Vec<AIInsight> {
    let prompt = build_insight_prompt(transactions, budgets, goals, sample);

    let response = match backend.complete_json(&prompt).await {
        Ok(response) => response,
        Err(e) => {
            warn!(model = backend.model(), error = %e, "Insight request failed");
            return Vec::new();
        }
    };

    match parse_insights(&response) {
        Ok(insights) => insights,
        Err(e) => {
            warn!(model = backend.model(), error = %e, "Discarding unusable insight response");
            Vec::new()
        }
    }
}

#[derive(Debug, Default)]
struct Published {
    ticket: u64,
    insights: Vec<AIInsight>,
}

/// Insight refresher with last-trigger-wins ordering
pub struct AdviceSession<B: AdvisorBackend> {
    backend: B,
    sample: usize,
    debounce: Duration,
    latest_ticket: AtomicU64,
    last_version: Mutex<Option<u64>>,
    published: Mutex<Published>,
}

impl<B: AdvisorBackend> AdviceSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            sample: DEFAULT_TRANSACTION_SAMPLE,
            debounce: Duration::ZERO,
            latest_ticket: AtomicU64::new(0),
            last_version: Mutex::new(None),
            published: Mutex::new(Published::default()),
        }
    }

    /// Send this many recent transactions as context
    pub fn with_sample(mut self, sample: usize) -> Self {
        self.sample = sample;
        self
    }

    /// Wait this long before requesting; a newer trigger in the meantime
    /// abandons the older one
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Most recently published insights
    pub fn insights(&self) -> Vec<AIInsight> {
        self.published
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insights
            .clone()
    }

    fn is_latest(&self, ticket: u64) -> bool {
        self.latest_ticket.load(Ordering::SeqCst) == ticket
    }

    /// Request fresh insights for `snapshot`.
    ///
    /// Returns the published list, or `None` if a newer refresh was
    /// triggered while this one was in flight.
    pub async fn refresh(&self, snapshot: &StateSnapshot) -> Option<Vec<AIInsight>> {
        let ticket = self.latest_ticket.fetch_add(1, Ordering::SeqCst) + 1;

        if !self.debounce.is_zero() {
            tokio::time::sleep(self.debounce).await;
            if !self.is_latest(ticket) {
                debug!(ticket, "Insight refresh superseded during debounce");
                return None;
            }
        }

        let insights = request_insights(
            &self.backend,
            &snapshot.transactions,
            &snapshot.budgets,
            &snapshot.goals,
            self.sample,
        )
        .await;

        let mut published = self.published.lock().unwrap_or_else(|e| e.into_inner());
        if !self.is_latest(ticket) || ticket <= published.ticket {
            debug!(ticket, "Discarding stale insight response");
            return None;
        }

        info!(ticket, count = insights.len(), "Published insights");
        published.ticket = ticket;
        published.insights = insights.clone();
        Some(insights)
    }

    /// Refresh only when `version` differs from the last one seen
    pub async fn refresh_if_changed(
        &self,
        version: u64,
        snapshot: &StateSnapshot,
    ) -> Option<Vec<AIInsight>> {
        {
            let mut last = self.last_version.lock().unwrap_or_else(|e| e.into_inner());
            if *last == Some(version) {
                return None;
            }
            *last = Some(version);
        }
        self.refresh(snapshot).await
    }
}
