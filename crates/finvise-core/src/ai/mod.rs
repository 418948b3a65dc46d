//! Pluggable advisory backend abstraction
//!
//! The advisory service is an opaque remote LLM. This module hides which one.
//!
//! # Architecture
//!
//! - `AdvisorBackend` trait: the two calls the advisor needs (structured
//!   completion and streamed chat)
//! - `AdvisorClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (ollama, openai_compatible, mock). Default: ollama
//! - `OLLAMA_HOST`: Ollama server URL (required for ollama backend)
//! - `OLLAMA_MODEL`: Default model name (default: llama3.2)
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required for openai_compatible backend)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-3.5-turbo)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

mod mock;
mod ollama;
mod openai_compatible;
pub mod parsing;
pub mod stream;
pub mod types;

pub use mock::{MockBackend, MockReply, DEFAULT_INSIGHTS};
pub use ollama::OllamaBackend;
pub use openai_compatible::OpenAICompatibleBackend;
pub use types::*;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;

/// Interface every advisory backend implements
#[async_trait]
pub trait AdvisorBackend: Send + Sync {
    /// One-shot completion; the reply is expected to contain JSON
    async fn complete_json(&self, prompt: &str) -> Result<String>;

    /// Stream a chat reply to `message` under the `system` instruction.
    ///
    /// Each normalized fragment is sent on `chunks` as it arrives. Returns
    /// once the stream is exhausted; an error means the transport failed.
    /// A closed receiver ends the stream early without error.
    async fn stream_chat(
        &self,
        system: &str,
        message: &str,
        chunks: mpsc::Sender<ChatChunk>,
    ) -> Result<()>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Get the model name
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete advisory client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AdvisorClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// OpenAI-compatible backend (vLLM, LocalAI, llama-server, hosted APIs)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AdvisorClient {
    /// Create an advisory client from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use. Returns None if
    /// the required environment variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "ollama".to_string());

        match backend.to_lowercase().as_str() {
            "ollama" => OllamaBackend::from_env().map(AdvisorClient::Ollama),
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                OpenAICompatibleBackend::from_env().map(AdvisorClient::OpenAICompatible)
            }
            "mock" => Some(AdvisorClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to ollama");
                OllamaBackend::from_env().map(AdvisorClient::Ollama)
            }
        }
    }

    /// Create an Ollama backend directly
    pub fn ollama(host: &str, model: &str) -> Self {
        AdvisorClient::Ollama(OllamaBackend::new(host, model))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AdvisorClient::Mock(MockBackend::new())
    }

    pub fn info(&self) -> BackendInfo {
        let kind = match self {
            AdvisorClient::Ollama(_) => "ollama",
            AdvisorClient::OpenAICompatible(_) => "openai_compatible",
            AdvisorClient::Mock(_) => "mock",
        };
        BackendInfo {
            kind,
            model: self.model().to_string(),
            host: self.host().to_string(),
        }
    }
}

// Implement AdvisorBackend for AdvisorClient by delegating to the inner backend
#[async_trait]
impl AdvisorBackend for AdvisorClient {
    async fn complete_json(&self, prompt: &str) -> Result<String> {
        match self {
            AdvisorClient::Ollama(b) => b.complete_json(prompt).await,
            AdvisorClient::OpenAICompatible(b) => b.complete_json(prompt).await,
            AdvisorClient::Mock(b) => b.complete_json(prompt).await,
        }
    }

    async fn stream_chat(
        &self,
        system: &str,
        message: &str,
        chunks: mpsc::Sender<ChatChunk>,
    ) -> Result<()> {
        match self {
            AdvisorClient::Ollama(b) => b.stream_chat(system, message, chunks).await,
            AdvisorClient::OpenAICompatible(b) => b.stream_chat(system, message, chunks).await,
            AdvisorClient::Mock(b) => b.stream_chat(system, message, chunks).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AdvisorClient::Ollama(b) => b.health_check().await,
            AdvisorClient::OpenAICompatible(b) => b.health_check().await,
            AdvisorClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AdvisorClient::Ollama(b) => b.model(),
            AdvisorClient::OpenAICompatible(b) => b.model(),
            AdvisorClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AdvisorClient::Ollama(b) => b.host(),
            AdvisorClient::OpenAICompatible(b) => b.host(),
            AdvisorClient::Mock(b) => b.host(),
        }
    }
}
