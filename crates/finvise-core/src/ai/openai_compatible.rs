//! OpenAI-compatible backend implementation
//!
//! Works with any server that implements the OpenAI chat completions API:
//! - vLLM (http://localhost:8000)
//! - LocalAI (http://localhost:8080)
//! - llama-server / llama.cpp (http://localhost:8080)
//! - hosted search-grounded APIs that add `citations` to each chunk
//!
//! # Configuration
//!
//! Environment variables:
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-3.5-turbo)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::{Error, Result};

use super::stream::{sse_data, LineBuffer};
use super::types::{sources_from_values, ChatChunk};
use super::AdvisorBackend;

/// Terminator of an OpenAI event stream
const DONE_MARKER: &str = "[DONE]";

/// OpenAI-compatible backend
///
/// ```rust,ignore
/// // vLLM
/// export OPENAI_COMPATIBLE_HOST="http://192.168.1.100:8000"
/// export OPENAI_COMPATIBLE_MODEL="meta-llama/Llama-3.2-3B-Instruct"
/// ```
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAICompatibleBackend {
    /// Create a new OpenAI-compatible backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
        }
    }

    /// Create with an API key
    pub fn with_api_key(base_url: &str, model: &str, api_key: &str) -> Self {
        let mut backend = Self::new(base_url, model);
        backend.api_key = Some(api_key.to_string());
        backend
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            model: model.to_string(),
            api_key: self.api_key.clone(),
        }
    }

    /// Create from environment variables
    ///
    /// Required: `OPENAI_COMPATIBLE_HOST`
    /// Optional: `OPENAI_COMPATIBLE_MODEL` (default: gpt-3.5-turbo)
    /// Optional: `OPENAI_COMPATIBLE_API_KEY`
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OPENAI_COMPATIBLE_HOST").ok()?;
        let model = std::env::var("OPENAI_COMPATIBLE_MODEL")
            .unwrap_or_else(|_| "gpt-3.5-turbo".to_string());
        let api_key = std::env::var("OPENAI_COMPATIBLE_API_KEY").ok();

        let mut backend = Self::new(&host, &model);
        backend.api_key = api_key;
        Some(backend)
    }

    fn completions_request(&self, request: &ChatCompletionRequest) -> RequestBuilder {
        let mut req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(request);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }
        req_builder
    }

    async fn send_checked(&self, request: &ChatCompletionRequest) -> Result<reqwest::Response> {
        let response = self.completions_request(request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Backend(format!(
                "OpenAI API error {}: {}",
                status, body
            )));
        }
        Ok(response)
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

/// Chat message
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// OpenAI chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// One `data:` event of a streamed completion
#[derive(Debug, Default, Deserialize)]
struct StreamEvent {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    /// Bare uri list used by search-grounded providers
    #[serde(default)]
    citations: Option<Vec<serde_json::Value>>,
    /// `{title, url}` objects used by search-grounded providers
    #[serde(default)]
    search_results: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

impl StreamEvent {
    fn into_chunk(self) -> ChatChunk {
        let text = self
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.delta.content)
            .unwrap_or_default();

        let mut sources = Vec::new();
        if let Some(results) = self.search_results {
            sources.extend(sources_from_values(&results));
        }
        if let Some(citations) = self.citations {
            sources.extend(sources_from_values(&citations));
        }

        ChatChunk { text, sources }
    }
}

enum EventControl {
    Continue,
    Stop,
}

async fn forward_event(line: &str, chunks: &mpsc::Sender<ChatChunk>) -> EventControl {
    let Some(data) = sse_data(line) else {
        return EventControl::Continue;
    };
    if data == DONE_MARKER {
        return EventControl::Stop;
    }

    let event: StreamEvent = match serde_json::from_str(data) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "Skipping malformed stream event");
            return EventControl::Continue;
        }
    };

    let chunk = event.into_chunk();
    if !chunk.is_empty() && chunks.send(chunk).await.is_err() {
        return EventControl::Stop;
    }
    EventControl::Continue
}

#[async_trait]
impl AdvisorBackend for OpenAICompatibleBackend {
    async fn complete_json(&self, prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: Some(0.2),
            stream: false,
        };

        let response = self.send_checked(&request).await?;
        let chat_response: ChatCompletionResponse = response.json().await?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Backend("No response from OpenAI API".into()))?;
        debug!("OpenAI-compatible insights response: {}", content);

        Ok(content)
    }

    async fn stream_chat(
        &self,
        system: &str,
        message: &str,
        chunks: mpsc::Sender<ChatChunk>,
    ) -> Result<()> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: message.to_string(),
                },
            ],
            temperature: None,
            stream: true,
        };

        let mut response = self.send_checked(&request).await?;

        let mut lines = LineBuffer::new();
        while let Some(bytes) = response.chunk().await? {
            for line in lines.push(&bytes) {
                if let EventControl::Stop = forward_event(&line, &chunks).await {
                    return Ok(());
                }
            }
        }

        if let Some(line) = lines.finish() {
            forward_event(&line, &chunks).await;
        }

        Ok(())
    }

    async fn health_check(&self) -> bool {
        // Try /v1/models first (standard OpenAI endpoint)
        if let Ok(resp) = self
            .http_client
            .get(format!("{}/v1/models", self.base_url))
            .send()
            .await
        {
            if resp.status().is_success() {
                return true;
            }
        }

        // Try /health (common for LocalAI, llama-server)
        if let Ok(resp) = self
            .http_client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
        {
            if resp.status().is_success() {
                return true;
            }
        }

        // Some servers return 200 on /
        if let Ok(resp) = self.http_client.get(&self.base_url).send().await {
            if resp.status().is_success() {
                return true;
            }
        }

        false
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::parsing::parse_insights;
    use crate::test_utils::{MockAdvisorServer, MOCK_SOURCE_URI};

    #[test]
    fn test_backend_new_trims_trailing_slash() {
        let backend = OpenAICompatibleBackend::new("http://localhost:8000/", "llama3.2");
        assert_eq!(backend.host(), "http://localhost:8000");
        assert_eq!(backend.model(), "llama3.2");
    }

    #[test]
    fn test_backend_with_api_key() {
        let backend =
            OpenAICompatibleBackend::with_api_key("http://localhost:8000", "gpt-4", "sk-test123");
        assert_eq!(backend.model(), "gpt-4");
        assert_eq!(backend.api_key, Some("sk-test123".to_string()));
        assert_eq!(backend.with_model("gpt-4o").api_key, backend.api_key);
    }

    #[tokio::test]
    async fn test_health_check_unreachable() {
        let backend = OpenAICompatibleBackend::new("http://127.0.0.1:1", "llama3.2");
        assert!(!backend.health_check().await);
    }

    #[test]
    fn test_chat_completion_request_serialization() {
        let request = ChatCompletionRequest {
            model: "llama3.2".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "Hello".to_string(),
            }],
            temperature: None,
            stream: true,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["content"], "Hello");
        assert_eq!(json["stream"], true);
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_completion_response_null_content() {
        let json = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert!(response.choices[0].message.content.is_none());
    }

    #[test]
    fn test_stream_event_text_and_citations() {
        let json = r#"{
            "choices": [{"index": 0, "delta": {"content": "Rates are "}}],
            "citations": ["https://rates.example/today"],
            "search_results": [{"title": "Fed", "url": "https://fed.example"}]
        }"#;
        let chunk = serde_json::from_str::<StreamEvent>(json).unwrap().into_chunk();
        assert_eq!(chunk.text, "Rates are ");
        assert_eq!(chunk.sources.len(), 2);
        assert_eq!(chunk.sources[0].title, "Fed");
        assert_eq!(chunk.sources[1].title, "Source");
    }

    #[test]
    fn test_stream_event_without_content() {
        let json = r#"{"choices": [{"delta": {"role": "assistant"}}]}"#;
        let chunk = serde_json::from_str::<StreamEvent>(json).unwrap().into_chunk();
        assert!(chunk.is_empty());

        let chunk = serde_json::from_str::<StreamEvent>("{}").unwrap().into_chunk();
        assert!(chunk.is_empty());
    }

    #[tokio::test]
    async fn test_forward_event_handles_done_and_noise() {
        let (tx, mut rx) = mpsc::channel(8);

        assert!(matches!(
            forward_event(": keep-alive", &tx).await,
            EventControl::Continue
        ));
        assert!(matches!(
            forward_event("data: {broken", &tx).await,
            EventControl::Continue
        ));
        assert!(matches!(
            forward_event(r#"data: {"choices":[{"delta":{"content":"Hi"}}]}"#, &tx).await,
            EventControl::Continue
        ));
        assert!(matches!(
            forward_event("data: [DONE]", &tx).await,
            EventControl::Stop
        ));

        drop(tx);
        assert_eq!(rx.recv().await.unwrap().text, "Hi");
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_against_mock_server() {
        let server = MockAdvisorServer::start().await;
        let backend = OpenAICompatibleBackend::with_api_key(&server.url(), "mock-model", "sk-x");

        assert!(backend.health_check().await);
        let insights = parse_insights(&backend.complete_json("advise").await.unwrap()).unwrap();
        assert_eq!(insights.len(), 3);

        let (tx, mut rx) = mpsc::channel(64);
        backend.stream_chat("system", "Should I buy bonds?", tx).await.unwrap();

        let mut text = String::new();
        let mut uris = Vec::new();
        while let Some(chunk) = rx.recv().await {
            text.push_str(&chunk.text);
            uris.extend(chunk.sources.into_iter().map(|s| s.uri));
        }
        assert_eq!(text, MockAdvisorServer::chat_reply("Should I buy bonds?"));
        assert_eq!(uris, vec![MOCK_SOURCE_URI.to_string()]);
    }

    #[tokio::test]
    async fn test_error_status_is_backend_error() {
        let server = MockAdvisorServer::start_failing().await;
        let backend = OpenAICompatibleBackend::new(&server.url(), "mock-model");

        assert!(!backend.health_check().await);
        let result = backend.complete_json("advise").await;
        assert!(matches!(result, Err(Error::Backend(msg)) if msg.contains("500")));
    }
}
