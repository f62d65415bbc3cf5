//! Simple key-value persistence for non-core page data.
//!
//! The recognition pipeline never touches this; it backs the usage log and
//! cached profile data behind the get/set/clear store the surrounding
//! pages expect.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store contents corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub trait KvStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError>;
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// JSON-file-backed store, loaded eagerly and rewritten on every set.
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, entries })
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(&self.entries)?)?;
        Ok(())
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        self.persist()
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.entries.clear();
        self.persist()
    }
}

/// Key of the rolling usage log.
pub const USAGE_LOG_KEY: &str = "emotisync_logs";
/// Only the most recent entries are kept.
const USAGE_LOG_CAP: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub action: String,
}

/// Prepend an action to the usage log, newest first, trimmed to the cap.
/// A corrupt log resets rather than failing the app.
pub fn record_usage<S: KvStore>(store: &mut S, action: &str) -> Result<(), StoreError> {
    let mut entries: Vec<UsageEntry> = store
        .get(USAGE_LOG_KEY)
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default();

    entries.insert(
        0,
        UsageEntry {
            timestamp: chrono::Utc::now(),
            action: action.to_string(),
        },
    );
    entries.truncate(USAGE_LOG_CAP);

    store.set(USAGE_LOG_KEY, serde_json::to_value(&entries)?)
}

/// Read the usage log, newest first.
pub fn usage_log<S: KvStore>(store: &S) -> Vec<UsageEntry> {
    store
        .get(USAGE_LOG_KEY)
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default()
}
