//! Persisted user preferences
//!
//! A typed façade over the [`PersistenceLayer`] for the handful of slices the
//! console keeps across sessions. Slices are read once by
//! [`PreferenceStore::hydrate`] and written back whenever they change.

pub mod validation;

pub use validation::{ClusterPrefix, OidcConfigUrl, SubnetPair, ValidationError};

use crate::operations::Operation;
use crate::storage::PersistenceLayer;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

/// Maximum entries kept in the recent operations list
pub const MAX_RECENT_OPERATIONS: usize = 5;

/// Storage keys for each slice
pub mod keys {
    pub const DARK_MODE: &str = "darkMode";
    pub const FAVORITES: &str = "favorites";
    pub const RECENT_OPERATIONS: &str = "recentOperations";
    pub const PREFIX: &str = "prefix";
    pub const SUBNETS: &str = "subnets";
    pub const OIDC_CONFIG_URL: &str = "oidcConfigUrl";

    pub const ALL: [&str; 6] = [
        DARK_MODE,
        FAVORITES,
        RECENT_OPERATIONS,
        PREFIX,
        SUBNETS,
        OIDC_CONFIG_URL,
    ];
}

/// One dispatched operation in the history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub operation: Operation,
    pub timestamp: DateTime<Utc>,
}

/// In-memory copy of every slice
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceSlices {
    pub dark_mode: bool,
    pub favorites: BTreeSet<String>,
    pub recent_operations: Vec<OperationRecord>,
    pub prefix: Option<String>,
    pub subnets: Option<SubnetPair>,
    pub oidc_config_url: Option<String>,
}

#[derive(Clone)]
pub struct PreferenceStore {
    persistence: PersistenceLayer,
    slices: Arc<RwLock<PreferenceSlices>>,
}

impl PreferenceStore {
    /// Load every slice from `persistence`
    ///
    /// Stored values that no longer pass validation are dropped.
    pub fn hydrate(persistence: PersistenceLayer) -> Self {
        let dark_mode = persistence.get(keys::DARK_MODE, false);
        let favorites = persistence.get_string_set(keys::FAVORITES);

        let mut seen = BTreeSet::new();
        let recent_operations: Vec<OperationRecord> = persistence
            .get_list::<OperationRecord>(keys::RECENT_OPERATIONS)
            .into_iter()
            .filter(|record| seen.insert(record.operation.id.clone()))
            .take(MAX_RECENT_OPERATIONS)
            .collect();

        let prefix = persistence
            .get::<Option<String>>(keys::PREFIX, None)
            .and_then(|raw| match ClusterPrefix::parse(&raw) {
                Ok(prefix) => Some(prefix.as_str().to_string()),
                Err(e) => {
                    tracing::warn!("Dropping stored prefix: {}", e);
                    None
                }
            });

        let subnets = persistence
            .get::<Option<SubnetPair>>(keys::SUBNETS, None)
            .and_then(|pair| match pair.validated() {
                Ok(pair) => Some(pair),
                Err(e) => {
                    tracing::warn!("Dropping stored subnets: {}", e);
                    None
                }
            });

        let oidc_config_url = persistence
            .get::<Option<String>>(keys::OIDC_CONFIG_URL, None)
            .and_then(|raw| match OidcConfigUrl::parse(&raw) {
                Ok(url) => Some(url.as_str().to_string()),
                Err(e) => {
                    tracing::warn!("Dropping stored OIDC config URL: {}", e);
                    None
                }
            });

        let slices = PreferenceSlices {
            dark_mode,
            favorites,
            recent_operations,
            prefix,
            subnets,
            oidc_config_url,
        };

        tracing::debug!(
            "Hydrated preferences: {} favorites, {} recent operations",
            slices.favorites.len(),
            slices.recent_operations.len()
        );

        Self {
            persistence,
            slices: Arc::new(RwLock::new(slices)),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, PreferenceSlices> {
        self.slices.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, PreferenceSlices> {
        self.slices.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> PreferenceSlices {
        self.read().clone()
    }

    pub fn dark_mode(&self) -> bool {
        self.read().dark_mode
    }

    pub fn set_dark_mode(&self, enabled: bool) {
        self.write().dark_mode = enabled;
        self.persistence.set(keys::DARK_MODE, &enabled);
    }

    pub fn favorites(&self) -> BTreeSet<String> {
        self.read().favorites.clone()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.read().favorites.contains(id)
    }

    /// Flip `id` in the favorites set; returns whether it is now a favorite
    pub fn toggle_favorite(&self, id: &str) -> bool {
        let mut slices = self.write();
        let now_favorite = if slices.favorites.remove(id) {
            false
        } else {
            slices.favorites.insert(id.to_string());
            true
        };
        self.persistence.set(keys::FAVORITES, &slices.favorites);
        now_favorite
    }

    /// History, newest first
    pub fn recent_operations(&self) -> Vec<OperationRecord> {
        self.read().recent_operations.clone()
    }

    /// Record that `op` was dispatched
    ///
    /// An existing entry with the same id moves to the front; the list keeps
    /// the [`MAX_RECENT_OPERATIONS`] newest entries.
    pub fn record_dispatch(&self, op: &Operation) {
        let mut slices = self.write();
        let recent = &mut slices.recent_operations;
        recent.retain(|record| record.operation.id != op.id);
        recent.insert(
            0,
            OperationRecord {
                operation: op.clone(),
                timestamp: Utc::now(),
            },
        );
        recent.truncate(MAX_RECENT_OPERATIONS);
        self.persistence.set(keys::RECENT_OPERATIONS, &*recent);
    }

    pub fn clear_recent_operations(&self) {
        self.write().recent_operations.clear();
        self.persistence.remove(keys::RECENT_OPERATIONS);
    }

    pub fn prefix(&self) -> Option<String> {
        self.read().prefix.clone()
    }

    pub fn set_prefix(&self, prefix: &ClusterPrefix) {
        self.write().prefix = Some(prefix.as_str().to_string());
        self.persistence.set(keys::PREFIX, prefix);
    }

    pub fn subnets(&self) -> Option<SubnetPair> {
        self.read().subnets.clone()
    }

    pub fn set_subnets(&self, subnets: &SubnetPair) {
        self.write().subnets = Some(subnets.clone());
        self.persistence.set(keys::SUBNETS, subnets);
    }

    pub fn oidc_config_url(&self) -> Option<String> {
        self.read().oidc_config_url.clone()
    }

    pub fn set_oidc_config_url(&self, url: &OidcConfigUrl) {
        self.write().oidc_config_url = Some(url.as_str().to_string());
        self.persistence.set(keys::OIDC_CONFIG_URL, url);
    }

    /// Current value of a slice as JSON
    pub fn get_value(&self, key: &str) -> Result<serde_json::Value> {
        let slices = self.read();
        let value = match key {
            keys::DARK_MODE => serde_json::to_value(slices.dark_mode),
            keys::FAVORITES => serde_json::to_value(&slices.favorites),
            keys::RECENT_OPERATIONS => serde_json::to_value(&slices.recent_operations),
            keys::PREFIX => serde_json::to_value(&slices.prefix),
            keys::SUBNETS => serde_json::to_value(&slices.subnets),
            keys::OIDC_CONFIG_URL => serde_json::to_value(&slices.oidc_config_url),
            _ => return Err(anyhow::anyhow!("Unknown preference key: {}", key)),
        };
        value.with_context(|| format!("Failed to encode preference {}", key))
    }

    /// Set a slice from text input, validating it first
    ///
    /// Subnets are given as `public,private`. Favorites toggle a single id.
    pub fn set_value(&self, key: &str, value: &str) -> Result<()> {
        match key {
            keys::DARK_MODE => {
                let enabled = value
                    .trim()
                    .parse()
                    .context("darkMode must be 'true' or 'false'")?;
                self.set_dark_mode(enabled);
            }
            keys::FAVORITES => {
                self.toggle_favorite(value.trim());
            }
            keys::PREFIX => {
                let prefix = ClusterPrefix::parse(value)?;
                self.set_prefix(&prefix);
            }
            keys::SUBNETS => {
                let (public, private) = value
                    .split_once(',')
                    .context("subnets must be given as 'public,private'")?;
                let pair = SubnetPair::parse(public, private)?;
                self.set_subnets(&pair);
            }
            keys::OIDC_CONFIG_URL => {
                let url = OidcConfigUrl::parse(value)?;
                self.set_oidc_config_url(&url);
            }
            keys::RECENT_OPERATIONS => {
                anyhow::bail!("recentOperations is recorded automatically and cannot be set")
            }
            _ => return Err(anyhow::anyhow!("Unknown preference key: {}", key)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};

    fn store() -> (MemoryStore, PreferenceStore) {
        let backend = MemoryStore::new();
        let prefs = PreferenceStore::hydrate(PersistenceLayer::new(Arc::new(backend.clone())));
        (backend, prefs)
    }

    fn op(n: usize) -> Operation {
        Operation::for_task(format!("op-{}", n), format!("Operation {}", n), "tasks/noop.yml")
    }

    #[test]
    fn test_defaults_when_empty() {
        let (_, prefs) = store();
        assert!(!prefs.dark_mode());
        assert!(prefs.favorites().is_empty());
        assert!(prefs.recent_operations().is_empty());
        assert!(prefs.prefix().is_none());
    }

    #[test]
    fn test_toggle_favorite_persists() {
        let (backend, prefs) = store();
        assert!(prefs.toggle_favorite("check-components"));
        assert!(prefs.is_favorite("check-components"));
        assert_eq!(
            backend.get_raw("rosa-console:favorites").as_deref(),
            Some(r#"["check-components"]"#)
        );

        assert!(!prefs.toggle_favorite("check-components"));
        assert_eq!(
            backend.get_raw("rosa-console:favorites").as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn test_record_dispatch_dedupes_and_truncates() {
        let (_, prefs) = store();
        for n in 1..=6 {
            prefs.record_dispatch(&op(n));
        }
        let ids: Vec<String> = prefs
            .recent_operations()
            .into_iter()
            .map(|r| r.operation.id)
            .collect();
        assert_eq!(ids, vec!["op-6", "op-5", "op-4", "op-3", "op-2"]);

        prefs.record_dispatch(&op(4));
        let ids: Vec<String> = prefs
            .recent_operations()
            .into_iter()
            .map(|r| r.operation.id)
            .collect();
        assert_eq!(ids, vec!["op-4", "op-6", "op-5", "op-3", "op-2"]);
    }

    #[test]
    fn test_hydrate_drops_invalid_prefix() {
        let backend = MemoryStore::new();
        backend.set_raw("rosa-console:prefix", "\"production\"").unwrap();
        let prefs = PreferenceStore::hydrate(PersistenceLayer::new(Arc::new(backend)));
        assert!(prefs.prefix().is_none());
    }

    #[test]
    fn test_set_value_validates() {
        let (_, prefs) = store();
        assert!(prefs.set_value("prefix", "produ").is_err());
        assert!(prefs.prefix().is_none());

        prefs.set_value("prefix", "prod").unwrap();
        assert_eq!(prefs.prefix().as_deref(), Some("prod"));

        prefs
            .set_value("subnets", "subnet-0a1b, subnet-0c2d")
            .unwrap();
        assert_eq!(prefs.subnets().unwrap().private_subnet, "subnet-0c2d");

        assert!(prefs.set_value("darkMode", "maybe").is_err());
        assert!(prefs.set_value("recentOperations", "[]").is_err());
        assert!(prefs.set_value("unknown", "x").is_err());
    }

    #[test]
    fn test_get_value() {
        let (_, prefs) = store();
        prefs.set_dark_mode(true);
        assert_eq!(prefs.get_value("darkMode").unwrap(), serde_json::json!(true));
        assert_eq!(prefs.get_value("prefix").unwrap(), serde_json::Value::Null);
        assert!(prefs.get_value("bogus").is_err());
    }
}
