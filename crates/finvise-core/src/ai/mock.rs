//! Mock backend for testing
//!
//! Provides configurable canned responses for both advisory calls.
//! Useful for unit tests and development without a running LLM server.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{Error, Result};

use super::types::ChatChunk;
use super::AdvisorBackend;

/// Canned insight reply used by the mock backend and mock server
pub const DEFAULT_INSIGHTS: &str = r#"[
  {"title": "Trim entertainment", "advice": "Entertainment is your fastest growing category. Cap cinema trips at two a month.", "impact": "medium"},
  {"title": "Boost the emergency fund", "advice": "Moving $200 a month from your surplus reaches the Emergency Fund target a year early.", "impact": "high"},
  {"title": "Housing is near its limit", "advice": "Rent uses over 90% of the housing budget. Leave headroom for utilities.", "impact": "low"}
]"#;

/// What the mock returns from `complete_json`
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this text verbatim
    Text(String),
    /// Fail as if the transport broke
    Fail,
}

/// Mock advisory backend
#[derive(Debug, Clone)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    /// Reply to insight requests
    pub insights: MockReply,
    /// Scripted chat fragments; None echoes the message back
    pub chat_script: Option<Vec<ChatChunk>>,
    /// Fail the chat stream after this many fragments
    pub fail_chat_after: Option<usize>,
    /// Pause before each reply and between fragments
    pub delay: Option<Duration>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend (healthy, canned insights, echo chat)
    pub fn new() -> Self {
        Self {
            healthy: true,
            insights: MockReply::Text(DEFAULT_INSIGHTS.to_string()),
            chat_script: None,
            fail_chat_after: None,
            delay: None,
        }
    }

    /// Create an unhealthy mock backend whose calls all fail
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            insights: MockReply::Fail,
            fail_chat_after: Some(0),
            ..Self::new()
        }
    }

    pub fn with_insights(mut self, reply: MockReply) -> Self {
        self.insights = reply;
        self
    }

    pub fn with_chat_script(mut self, chunks: Vec<ChatChunk>) -> Self {
        self.chat_script = Some(chunks);
        self
    }

    pub fn failing_chat_after(mut self, fragments: usize) -> Self {
        self.fail_chat_after = Some(fragments);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn script_for(&self, message: &str) -> Vec<ChatChunk> {
        if let Some(ref script) = self.chat_script {
            return script.clone();
        }

        // Echo in word-sized fragments, citing one source on the first
        let mut chunks: Vec<ChatChunk> = message
            .split_inclusive(' ')
            .map(ChatChunk::text)
            .collect();
        chunks.insert(0, ChatChunk::text("You asked: "));
        chunks.push(
            ChatChunk::text("\n(I am an AI, not a licensed advisor.)")
                .with_source("Mock Finance Daily", "https://mock.example/finance"),
        );
        chunks
    }
}

#[async_trait]
impl AdvisorBackend for MockBackend {
    async fn complete_json(&self, _prompt: &str) -> Result<String> {
        self.pause().await;
        match &self.insights {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::Fail => Err(Error::Backend("mock insights failure".into())),
        }
    }

    async fn stream_chat(
        &self,
        _system: &str,
        message: &str,
        chunks: mpsc::Sender<ChatChunk>,
    ) -> Result<()> {
        for (sent, chunk) in self.script_for(message).into_iter().enumerate() {
            if self.fail_chat_after == Some(sent) {
                return Err(Error::Backend("mock stream interrupted".into()));
            }
            self.pause().await;
            if chunks.send(chunk).await.is_err() {
                // Receiver went away (cancelled)
                return Ok(());
            }
        }

        // Script shorter than the failure point: fail at the end
        if self.fail_chat_after.is_some() {
            return Err(Error::Backend("mock stream interrupted".into()));
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
