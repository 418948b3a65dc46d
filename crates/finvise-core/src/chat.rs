//! Streaming advisor chat
//!
//! A `ChatSession` owns the transcript and runs one exchange at a time:
//! the user message and an empty assistant entry are appended, then the
//! backend's fragments are folded into that entry as they arrive.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::ai::{AdvisorBackend, ChatChunk};
use crate::error::{Error, Result};
use crate::models::{ChatMessage, ChatRole};

pub const SYSTEM_INSTRUCTION: &str = "You are FinVise, a professional AI financial advisor. \
You may look up real-time information on the web. Provide expert, data-driven advice. \
When giving advice on markets or news, cite your sources. Disclaim that you are an AI.";

/// Shown in place of the reply when the stream fails
pub const DEFAULT_ERROR_MESSAGE: &str = "I encountered an error. Please try again.";

/// Fragments buffered between the backend task and the session
const CHUNK_BUFFER: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    /// Message appended, no fragment received yet
    Sending,
    Streaming,
}

/// How an exchange ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatOutcome {
    Completed,
    /// Transport failed; the reply holds the error message
    Failed,
    /// Stopped by a `CancelHandle`; the partial reply is kept
    Cancelled,
}

/// Stops the exchange in flight from another task
#[derive(Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

pub struct ChatSession {
    messages: Vec<ChatMessage>,
    state: ChatState,
    error_message: String,
    cancel_tx: Arc<watch::Sender<bool>>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        let (cancel_tx, _) = watch::channel(false);
        Self {
            messages: Vec::new(),
            state: ChatState::Idle,
            error_message: DEFAULT_ERROR_MESSAGE.to_string(),
            cancel_tx: Arc::new(cancel_tx),
        }
    }

    /// Replace the text shown when a stream fails
    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            tx: self.cancel_tx.clone(),
        }
    }

    /// Open an exchange: append the user message and an empty reply.
    ///
    /// Returns the trimmed message that should be sent to the backend.
    pub fn begin(&mut self, message: &str) -> Result<String> {
        let message = message.trim();
        if message.is_empty() {
            return Err(Error::InvalidData("Chat message is empty".into()));
        }
        if self.state != ChatState::Idle {
            return Err(Error::ChatBusy);
        }

        self.messages.push(ChatMessage::user(message));
        self.messages.push(ChatMessage::assistant_placeholder());
        self.state = ChatState::Sending;
        Ok(message.to_string())
    }

    /// Fold one fragment into the open reply. Ignored when no exchange is open.
    pub fn apply_chunk(&mut self, chunk: ChatChunk) {
        if self.state == ChatState::Idle {
            return;
        }
        self.state = ChatState::Streaming;

        if let Some(reply) = self.open_reply() {
            reply.content.push_str(&chunk.text);
            reply.merge_sources(chunk.sources);
        }
    }

    /// Close the exchange after the stream was exhausted
    pub fn finish(&mut self) -> ChatOutcome {
        self.state = ChatState::Idle;
        ChatOutcome::Completed
    }

    /// Close the exchange after a transport failure
    pub fn fail(&mut self, error: &Error) -> ChatOutcome {
        warn!(error = %error, "Chat stream failed");
        let message = self.error_message.clone();
        if let Some(reply) = self.open_reply() {
            reply.content = message;
        }
        self.state = ChatState::Idle;
        ChatOutcome::Failed
    }

    /// Close the exchange early, keeping whatever arrived
    pub fn abandon(&mut self) -> ChatOutcome {
        debug!("Chat stream cancelled");
        self.state = ChatState::Idle;
        ChatOutcome::Cancelled
    }

    fn open_reply(&mut self) -> Option<&mut ChatMessage> {
        self.messages
            .last_mut()
            .filter(|m| m.role == ChatRole::Assistant)
    }

    /// Send `message` and stream the reply into the transcript.
    ///
    /// Rejects an empty message and a send while another is in flight.
    /// Transport failures are reported in the transcript, not as an error.
    pub async fn send<B: AdvisorBackend + ?Sized>(
        &mut self,
        backend: &B,
        message: &str,
    ) -> Result<ChatOutcome> {
        self.send_with(backend, message, |_| {}).await
    }

    /// Like `send`, calling `on_chunk` with each fragment before it is applied
    pub async fn send_with<B, F>(
        &mut self,
        backend: &B,
        message: &str,
        mut on_chunk: F,
    ) -> Result<ChatOutcome>
    where
        B: AdvisorBackend + ?Sized,
        F: FnMut(&ChatChunk),
    {
        let message = self.begin(message)?;

        self.cancel_tx.send_replace(false);
        let mut cancel_rx = self.cancel_tx.subscribe();

        let (tx, mut rx) = mpsc::channel(CHUNK_BUFFER);
        let producer = backend.stream_chat(SYSTEM_INSTRUCTION, &message, tx);
        tokio::pin!(producer);
        let mut produced: Option<Result<()>> = None;

        let outcome = loop {
            tokio::select! {
                biased;

                changed = cancel_rx.changed() => {
                    if changed.is_ok() && *cancel_rx.borrow() {
                        break self.abandon();
                    }
                }
                chunk = rx.recv() => match chunk {
                    Some(chunk) => {
                        on_chunk(&chunk);
                        self.apply_chunk(chunk);
                    }
                    None => {
                        // Every sender is gone, so the producer is done
                        let result = match produced.take() {
                            Some(result) => result,
                            None => (&mut producer).await,
                        };
                        break match result {
                            Ok(()) => self.finish(),
                            Err(e) => self.fail(&e),
                        };
                    }
                },
                result = &mut producer, if produced.is_none() => {
                    produced = Some(result);
                }
            }
        };

        info!(?outcome, model = backend.model(), "Chat exchange ended");
        Ok(outcome)
    }
}
