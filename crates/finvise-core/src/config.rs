//! Application configuration
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/finvise/config.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Fields missing from an override keep their default value.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::advice::DEFAULT_TRANSACTION_SAMPLE;
use crate::chat::DEFAULT_ERROR_MESSAGE;
use crate::error::{Error, Result};
use crate::persistence::STATE_KEY;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/finvise.toml");

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where saved state lives; None means the platform data directory
    pub data_dir: Option<PathBuf>,
    pub storage_key: String,
    pub advice: AdviceConfig,
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AdviceConfig {
    pub transaction_sample: usize,
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub error_message: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            storage_key: STATE_KEY.to_string(),
            advice: AdviceConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            transaction_sample: DEFAULT_TRANSACTION_SAMPLE,
            debounce_ms: 0,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            error_message: DEFAULT_ERROR_MESSAGE.to_string(),
        }
    }
}

impl AdviceConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl AppConfig {
    /// Load configuration (override first, then embedded default)
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let path = match override_path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::NotFound(format!(
                        "Config file {}",
                        path.display()
                    )));
                }
                Some(path.to_path_buf())
            }
            None => default_config_path().filter(|p| p.exists()),
        };

        match path {
            Some(path) => {
                debug!("Loading config from {}", path.display());
                let content = fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                Self::parse(&content)
            }
            None => Self::parse(DEFAULT_CONFIG),
        }
    }

    /// Parse config from TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        if config.storage_key.trim().is_empty() {
            return Err(Error::Config("storage_key must not be empty".into()));
        }
        Ok(config)
    }

    /// Directory for saved state: configured, else the platform default
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir().ok_or_else(|| {
                Error::Config("No platform data directory; set data_dir".into())
            }),
        }
    }
}

/// Platform data directory for FinVise
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("finvise"))
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    default_data_dir().map(|d| d.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_default_config() {
        let config = AppConfig::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.storage_key, "finvise_data_v3");
        assert_eq!(config.advice.transaction_sample, 20);
        assert_eq!(config.advice.debounce(), Duration::ZERO);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = AppConfig::parse(
            r#"
            data_dir = "/tmp/fv"
            [advice]
            debounce_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/tmp/fv"));
        assert_eq!(config.advice.debounce(), Duration::from_millis(250));
        assert_eq!(config.advice.transaction_sample, 20);
        assert_eq!(config.storage_key, STATE_KEY);
        assert_eq!(config.chat.error_message, DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(matches!(
            AppConfig::parse("storage_key = 5"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            AppConfig::parse("storage_key = \"  \""),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[chat]\nerror_message = \"Try later.\"\n").unwrap();

        let config = AppConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(config.chat.error_message, "Try later.");
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = TempDir::new().unwrap();
        let result = AppConfig::load(Some(dir.path().join("nope.toml").as_path()));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
