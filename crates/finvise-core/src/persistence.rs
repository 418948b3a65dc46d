//! Whole-state persistence
//!
//! The aggregate is stored as one JSON record under a fixed key. Storage is
//! pluggable through `KeyValueStore`:
//! - `FileStore`: one `<key>.json` file per key in a data directory
//! - `MemoryStore`: in-process map, for tests

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{Budget, SavingsGoal, Transaction, UserProfile};
use crate::seed;

/// Key the aggregate is persisted under
pub const STATE_KEY: &str = "finvise_data_v3";

/// The persisted aggregate
///
/// Older records used the short field names `txs`, `bgts` and `gls`; they are
/// still accepted on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    #[serde(alias = "txs")]
    pub transactions: Vec<Transaction>,
    #[serde(alias = "bgts")]
    pub budgets: Vec<Budget>,
    #[serde(alias = "gls")]
    pub goals: Vec<SavingsGoal>,
    #[serde(default)]
    pub profile: UserProfile,
}

impl StateSnapshot {
    /// The starter dataset
    pub fn seeded() -> Self {
        Self {
            transactions: seed::transactions(),
            budgets: seed::budgets(),
            goals: seed::goals(),
            profile: UserProfile::default(),
        }
    }

    /// An aggregate with no data at all
    pub fn empty() -> Self {
        Self {
            transactions: Vec::new(),
            budgets: Vec::new(),
            goals: Vec::new(),
            profile: UserProfile::default(),
        }
    }

    /// Check the aggregate invariants: at most one budget per category
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for budget in &self.budgets {
            if !seen.insert(budget.category) {
                return Err(Error::InvalidData(format!(
                    "Duplicate budget for category {}",
                    budget.category
                )));
            }
        }
        Ok(())
    }
}

impl Default for StateSnapshot {
    fn default() -> Self {
        Self::seeded()
    }
}

/// Opaque key-value persistence service
pub trait KeyValueStore: Send + Sync {
    /// Human-readable name of the store (for logging)
    fn name(&self) -> &str;

    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// File-backed store, one JSON file per key
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a file store rooted at `dir`, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();

        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| {
                Error::InvalidData(format!(
                    "Failed to create data directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
            info!("Created data directory: {}", dir.display());
        }

        Ok(Self { dir })
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl KeyValueStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        // Temp file in the same directory, then rename over the target
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.flush()?;
        let path = self.path_for(key);
        tmp.persist(&path).map_err(|e| Error::Io(e.error))?;
        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

/// In-memory store; clones share the same map
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove everything (simulates cleared storage)
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| Error::InvalidData("Failed to acquire memory store lock".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| Error::InvalidData("Failed to acquire memory store lock".into()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Serialize a snapshot into its persisted form
pub fn encode(snapshot: &StateSnapshot) -> Result<String> {
    Ok(serde_json::to_string(snapshot)?)
}

/// Parse and validate a persisted record
pub fn decode(raw: &str) -> Result<StateSnapshot> {
    let snapshot: StateSnapshot = serde_json::from_str(raw)?;
    snapshot.validate()?;
    Ok(snapshot)
}
