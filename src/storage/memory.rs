//! In-memory key/value store

use super::{KeyValueStore, StorageError};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory store
///
/// Clones share the same underlying map. An optional quota caps the total
/// stored bytes, mimicking browser storage limits.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects writes once keys and values exceed `limit` bytes
    pub fn with_quota(limit: usize) -> Self {
        Self {
            inner: Arc::default(),
            quota: Some(limit),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get_raw(&self, key: &str) -> Option<String> {
        let state = self.inner.read().unwrap_or_else(|e| e.into_inner());
        state.get(key).cloned()
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut state = self.inner.write().unwrap_or_else(|e| e.into_inner());

        if let Some(limit) = self.quota {
            let size: usize = state
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum::<usize>()
                + key.len()
                + value.len();
            if size > limit {
                return Err(StorageError::QuotaExceeded { size, limit });
            }
        }

        state.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut state = self.inner.write().unwrap_or_else(|e| e.into_inner());
        state.remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        let state = self.inner.read().unwrap_or_else(|e| e.into_inner());
        state.keys().cloned().collect()
    }
}
