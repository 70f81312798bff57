//! Persistence layer for small UI-state slices
//!
//! Values are JSON-encoded and stored under namespaced keys
//! (`rosa-console:<key>`). Reads never fail: a missing key, a value that is
//! not valid JSON, or a value of the wrong shape all resolve to the caller's
//! fallback. Writes are fire-and-forget; a backend failure is logged and
//! otherwise ignored because nothing stored here is critical.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Default key namespace
pub const KEY_NAMESPACE: &str = "rosa-console";

/// Errors raised by storage backends
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("storage quota exceeded ({size} bytes, limit {limit} bytes)")]
    QuotaExceeded { size: usize, limit: usize },
}

/// Raw string key/value backend (get/set/remove semantics)
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`
    fn get_raw(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value
    fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// All keys currently stored
    fn keys(&self) -> Vec<String>;
}

/// JSON view over a [`KeyValueStore`] with namespaced keys
#[derive(Clone)]
pub struct PersistenceLayer {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
}

impl PersistenceLayer {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_namespace(store, KEY_NAMESPACE)
    }

    pub fn with_namespace(store: Arc<dyn KeyValueStore>, namespace: &str) -> Self {
        Self {
            store,
            namespace: namespace.to_string(),
        }
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    /// Read and decode `key`, returning `fallback` when absent, corrupt or
    /// of the wrong shape
    pub fn get<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        let Some(value) = self.get_json(key) else {
            return fallback;
        };

        match serde_json::from_value(value) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::debug!("Stored value for '{}' has unexpected shape: {}", key, e);
                fallback
            }
        }
    }

    /// Read `key` as a set of strings
    ///
    /// Coerces best-effort: an array keeps its string elements and drops the
    /// rest; any other JSON value yields an empty set.
    pub fn get_string_set(&self, key: &str) -> BTreeSet<String> {
        match self.get_json(key) {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            Some(other) => {
                tracing::debug!(
                    "Stored value for '{}' is not an array ({}), using empty set",
                    key,
                    json_kind(&other)
                );
                BTreeSet::new()
            }
            None => BTreeSet::new(),
        }
    }

    /// Read `key` as a list of `T`
    ///
    /// Elements that fail to decode are dropped individually; a non-array
    /// value yields an empty list.
    pub fn get_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.get_json(key) {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match serde_json::from_value(item) {
                    Ok(decoded) => Some(decoded),
                    Err(e) => {
                        tracing::debug!("Dropping malformed element of '{}': {}", key, e);
                        None
                    }
                })
                .collect(),
            Some(other) => {
                tracing::debug!(
                    "Stored value for '{}' is not an array ({}), using empty list",
                    key,
                    json_kind(&other)
                );
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    /// Read `key` as untyped JSON
    pub fn get_json(&self, key: &str) -> Option<Value> {
        let raw = self.store.get_raw(&self.namespaced(key))?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring corrupt stored value for '{}': {}", key, e);
                None
            }
        }
    }

    /// Encode and store `value` under `key`
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!("Failed to encode value for '{}': {}", key, e);
                return;
            }
        };

        if let Err(e) = self.store.set_raw(&self.namespaced(key), &encoded) {
            tracing::warn!("Failed to persist '{}': {}", key, e);
        }
    }

    /// Remove `key`
    pub fn remove(&self, key: &str) {
        if let Err(e) = self.store.remove(&self.namespaced(key)) {
            tracing::warn!("Failed to remove '{}': {}", key, e);
        }
    }

    /// Keys stored in this layer's namespace, without the prefix
    pub fn keys(&self) -> Vec<String> {
        let prefix = format!("{}:", self.namespace);
        let mut keys: Vec<String> = self
            .store
            .keys()
            .into_iter()
            .filter_map(|k| k.strip_prefix(&prefix).map(str::to_string))
            .collect();
        keys.sort();
        keys
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer() -> (MemoryStore, PersistenceLayer) {
        let store = MemoryStore::new();
        let layer = PersistenceLayer::new(Arc::new(store.clone()));
        (store, layer)
    }

    #[test]
    fn test_get_missing_returns_fallback() {
        let (_, layer) = layer();
        assert_eq!(layer.get("darkMode", true), true);
    }

    #[test]
    fn test_set_then_get() {
        let (store, layer) = layer();
        layer.set("prefix", "dev");
        assert_eq!(store.get_raw("rosa-console:prefix").as_deref(), Some("\"dev\""));
        assert_eq!(layer.get("prefix", String::new()), "dev");
    }

    #[test]
    fn test_invalid_json_returns_fallback() {
        let (store, layer) = layer();
        store.set_raw("rosa-console:favorites", "not-json{").unwrap();
        let favorites: Vec<String> = layer.get("favorites", Vec::new());
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_wrong_shape_returns_fallback() {
        let (store, layer) = layer();
        store.set_raw("rosa-console:darkMode", "\"yes\"").unwrap();
        assert!(!layer.get("darkMode", false));
    }

    #[test]
    fn test_string_set_coercion() {
        let (store, layer) = layer();
        store
            .set_raw("rosa-console:favorites", r#"["check-components", 3, null, "enable-capi-capa"]"#)
            .unwrap();
        let set = layer.get_string_set("favorites");
        assert_eq!(set.len(), 2);
        assert!(set.contains("check-components"));

        store
            .set_raw("rosa-console:favorites", r#"{"check-components": true}"#)
            .unwrap();
        assert!(layer.get_string_set("favorites").is_empty());
    }

    #[test]
    fn test_list_drops_malformed_elements() {
        let (store, layer) = layer();
        store
            .set_raw("rosa-console:favorites", r#"["validate-mce", 7, "check-components"]"#)
            .unwrap();
        let items: Vec<String> = layer.get_list("favorites");
        assert_eq!(items, vec!["validate-mce", "check-components"]);

        store.set_raw("rosa-console:favorites", "\"validate-mce\"").unwrap();
        assert!(layer.get_list::<String>("favorites").is_empty());
    }

    #[test]
    fn test_quota_failure_is_swallowed() {
        let store = MemoryStore::with_quota(16);
        let layer = PersistenceLayer::new(Arc::new(store.clone()));
        layer.set("oidcConfigUrl", "https://oidc.example.com/a-very-long-path");
        assert!(store.get_raw("rosa-console:oidcConfigUrl").is_none());
    }

    #[test]
    fn test_keys_are_namespaced() {
        let (store, layer) = layer();
        layer.set("darkMode", &true);
        store.set_raw("other-app:darkMode", "false").unwrap();
        assert_eq!(layer.keys(), vec!["darkMode".to_string()]);

        layer.remove("darkMode");
        assert!(layer.keys().is_empty());
    }
}
