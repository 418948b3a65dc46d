//! Test utilities for finvise-core
//!
//! Provides a mock advisory server speaking both the Ollama and the
//! OpenAI-compatible dialects, for development and HTTP-level tests.

use axum::{
    extract::Json,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use tokio::sync::oneshot;

use crate::ai::DEFAULT_INSIGHTS;

/// Citation attached to every mock chat reply
pub const MOCK_SOURCE_TITLE: &str = "Mock Finance Daily";
pub const MOCK_SOURCE_URI: &str = "https://mock.example/finance";

/// Mock advisory server for testing and development
pub struct MockAdvisorServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockAdvisorServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate))
            .route("/api/chat", post(handle_chat))
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_completions));
        Self::serve(app).await
    }

    /// Start a server that answers every request with 500
    pub async fn start_failing() -> Self {
        let app = Router::new().fallback(|| async {
            (StatusCode::INTERNAL_SERVER_ERROR, "model crashed")
        });
        Self::serve(app).await
    }

    async fn serve(app: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// The full text the server streams back for `message`
    pub fn chat_reply(message: &str) -> String {
        reply_fragments(message).concat()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockAdvisorServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn reply_fragments(message: &str) -> Vec<String> {
    let mut fragments = vec!["You asked: ".to_string()];
    fragments.extend(message.split_inclusive(' ').map(str::to_string));
    fragments.push(". This is general information, not financial advice.".to_string());
    fragments
}

#[derive(Debug, Deserialize)]
struct IncomingMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct IncomingChat {
    messages: Vec<IncomingMessage>,
    #[serde(default)]
    stream: bool,
}

impl IncomingChat {
    fn user_message(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }
}

/// Ollama tags endpoint (health check)
async fn handle_tags() -> Json<serde_json::Value> {
    Json(json!({
        "models": [{"name": "llama3.2:latest", "size": 4_000_000_000u64}]
    }))
}

/// Ollama generate endpoint; always answers with insights
async fn handle_generate(Json(request): Json<serde_json::Value>) -> Json<serde_json::Value> {
    Json(json!({
        "model": request["model"],
        "response": DEFAULT_INSIGHTS,
        "done": true,
    }))
}

/// Ollama chat endpoint, streamed as NDJSON
async fn handle_chat(Json(request): Json<IncomingChat>) -> Response {
    let mut body = String::new();
    for fragment in reply_fragments(request.user_message()) {
        body.push_str(&json!({"message": {"role": "assistant", "content": fragment}, "done": false}).to_string());
        body.push('\n');
    }
    body.push_str(
        &json!({
            "message": {"role": "assistant", "content": ""},
            "sources": [{"title": MOCK_SOURCE_TITLE, "url": MOCK_SOURCE_URI}],
            "done": true,
        })
        .to_string(),
    );
    body.push('\n');

    ([(header::CONTENT_TYPE, "application/x-ndjson")], body).into_response()
}

/// OpenAI models endpoint (health check)
async fn handle_models() -> Json<serde_json::Value> {
    Json(json!({"object": "list", "data": [{"id": "mock-model", "object": "model"}]}))
}

/// OpenAI chat completions; SSE when `stream` is set
async fn handle_completions(Json(request): Json<IncomingChat>) -> Response {
    if !request.stream {
        return Json(json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": DEFAULT_INSIGHTS}}]
        }))
        .into_response();
    }

    let mut body = String::new();
    for fragment in reply_fragments(request.user_message()) {
        let event = json!({"choices": [{"index": 0, "delta": {"content": fragment}}]});
        body.push_str(&format!("data: {}\n\n", event));
    }
    let citation = json!({
        "choices": [{"index": 0, "delta": {}}],
        "citations": [MOCK_SOURCE_URI],
    });
    body.push_str(&format!("data: {}\n\n", citation));
    body.push_str("data: [DONE]\n\n");

    ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_reply_mentions_message() {
        let reply = MockAdvisorServer::chat_reply("Is gold safe?");
        assert!(reply.starts_with("You asked: Is gold safe?"));
        assert!(reply.ends_with("not financial advice."));
    }

    #[tokio::test]
    async fn test_server_starts_and_stops() {
        let mut server = MockAdvisorServer::start().await;
        let url = server.url();
        assert!(url.starts_with("http://127.0.0.1:"));
        server.stop();
        server.stop();
    }
}
