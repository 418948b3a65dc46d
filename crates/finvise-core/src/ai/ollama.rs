//! Ollama backend implementation
//!
//! HTTP client for the Ollama API:
//! - `POST /api/generate` with `format: "json"` for structured insights
//! - `POST /api/chat` with `stream: true` for the advisor chat (NDJSON body)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::{Error, Result};

use super::stream::LineBuffer;
use super::types::{sources_from_values, ChatChunk};
use super::AdvisorBackend;

/// Ollama backend
#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    model: String,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            model: model.to_string(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OLLAMA_HOST").ok()?;
        let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string());
        Some(Self::new(&host, &model))
    }
}

/// Request to the generate endpoint
#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
}

/// Response from the generate endpoint
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Request to the chat endpoint
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatRequestMessage>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatRequestMessage {
    role: String,
    content: String,
}

/// One NDJSON line of a streamed chat reply. Every field is optional.
#[derive(Debug, Default, Deserialize)]
struct ChatStreamLine {
    #[serde(default)]
    message: Option<ChatStreamMessage>,
    /// Citations some Ollama front-ends attach when web search is enabled
    #[serde(default)]
    sources: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatStreamMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatStreamLine {
    fn into_chunk(self) -> ChatChunk {
        ChatChunk {
            text: self.message.and_then(|m| m.content).unwrap_or_default(),
            sources: self
                .sources
                .map(|values| sources_from_values(&values))
                .unwrap_or_default(),
        }
    }
}

/// Outcome of handling one stream line
enum LineControl {
    Continue,
    Stop,
}

async fn forward_line(line: &str, chunks: &mpsc::Sender<ChatChunk>) -> Result<LineControl> {
    let parsed: ChatStreamLine = match serde_json::from_str(line) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "Skipping malformed Ollama stream line");
            return Ok(LineControl::Continue);
        }
    };

    if let Some(err) = parsed.error {
        return Err(Error::Backend(format!("Ollama stream error: {}", err)));
    }

    let done = parsed.done;
    let chunk = parsed.into_chunk();
    if !chunk.is_empty() && chunks.send(chunk).await.is_err() {
        return Ok(LineControl::Stop);
    }

    Ok(if done {
        LineControl::Stop
    } else {
        LineControl::Continue
    })
}

#[async_trait]
impl AdvisorBackend for OllamaBackend {
    async fn complete_json(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            format: Some("json".to_string()),
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let generated: GenerateResponse = response.json().await?;
        debug!("Ollama insights response: {}", generated.response);

        Ok(generated.response)
    }

    async fn stream_chat(
        &self,
        system: &str,
        message: &str,
        chunks: mpsc::Sender<ChatChunk>,
    ) -> Result<()> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatRequestMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatRequestMessage {
                    role: "user".to_string(),
                    content: message.to_string(),
                },
            ],
            stream: true,
        };

        let mut response = self
            .http_client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let mut lines = LineBuffer::new();
        while let Some(bytes) = response.chunk().await? {
            for line in lines.push(&bytes) {
                if let LineControl::Stop = forward_line(&line, &chunks).await? {
                    return Ok(());
                }
            }
        }

        if let Some(line) = lines.finish() {
            forward_line(&line, &chunks).await?;
        }

        Ok(())
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
