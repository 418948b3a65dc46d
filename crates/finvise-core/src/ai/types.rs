//! Advisory backend types
//!
//! These types are backend-agnostic. Vendor stream payloads are normalized
//! into `ChatChunk` before they reach the chat session.

use serde::Deserialize;

use crate::models::GroundingSource;

/// Title used when a citation arrives without one
pub const UNTITLED_SOURCE: &str = "Source";

/// One increment of a streamed chat reply
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatChunk {
    pub text: String,
    pub sources: Vec<GroundingSource>,
}

impl ChatChunk {
    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            sources: Vec::new(),
        }
    }

    pub fn with_source(mut self, title: &str, uri: &str) -> Self {
        self.sources.push(GroundingSource {
            title: title.to_string(),
            uri: uri.to_string(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.sources.is_empty()
    }
}

/// A citation as a vendor might send it, every field optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSource {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl RawSource {
    /// Validate into a `GroundingSource`; a citation without a uri is dropped.
    ///
    /// `uri` wins over `url` when a vendor sends both.
    pub fn normalize(self) -> Option<GroundingSource> {
        let uri = [self.uri, self.url]
            .into_iter()
            .flatten()
            .map(|u| u.trim().to_string())
            .find(|u| !u.is_empty())?;
        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNTITLED_SOURCE.to_string());
        Some(GroundingSource { title, uri })
    }
}

/// Normalize citations given as bare uri strings or `{title, uri|url}` objects
pub fn sources_from_values(values: &[serde_json::Value]) -> Vec<GroundingSource> {
    values
        .iter()
        .filter_map(|v| match v {
            serde_json::Value::String(uri) => RawSource {
                uri: Some(uri.clone()),
                ..RawSource::default()
            }
            .normalize(),
            serde_json::Value::Object(_) => serde_json::from_value::<RawSource>(v.clone())
                .ok()
                .and_then(RawSource::normalize),
            _ => None,
        })
        .collect()
}

/// Backend identity for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendInfo {
    pub kind: &'static str,
    pub model: String,
    pub host: String,
}
