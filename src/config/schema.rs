//! Configuration schema definitions
//!
//! Defines the structure of the configuration file using serde for
//! serialization.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleConfig {
    /// Base URL of the automation backend
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Timeout for each status request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Client-side timeout for task execution, in seconds (0 disables it)
    #[serde(default = "default_operation_timeout_secs")]
    pub operation_timeout_secs: u64,

    /// Default notification lifetime, in milliseconds
    #[serde(default = "default_notification_ttl_ms")]
    pub notification_ttl_ms: u64,

    /// Status polling interval, in seconds (0 disables polling)
    #[serde(default)]
    pub status_poll_secs: u64,

    /// Preference file location (defaults to the data directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_file: Option<PathBuf>,
}

// Default value functions
fn default_backend_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_operation_timeout_secs() -> u64 {
    300
}

fn default_notification_ttl_ms() -> u64 {
    5000
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            request_timeout_secs: default_request_timeout_secs(),
            operation_timeout_secs: default_operation_timeout_secs(),
            notification_ttl_ms: default_notification_ttl_ms(),
            status_poll_secs: 0,
            storage_file: None,
        }
    }
}

impl ConsoleConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn operation_timeout(&self) -> Option<Duration> {
        (self.operation_timeout_secs > 0).then(|| Duration::from_secs(self.operation_timeout_secs))
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }

    pub fn status_poll_interval(&self) -> Option<Duration> {
        (self.status_poll_secs > 0).then(|| Duration::from_secs(self.status_poll_secs))
    }

    /// Preference file, falling back to the platform data directory
    pub fn storage_path(&self) -> PathBuf {
        self.storage_file
            .clone()
            .unwrap_or_else(super::paths::default_storage_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
backendUrl: http://automation.internal:8000
operationTimeoutSecs: 0
"#;
        let config: ConsoleConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.backend_url, "http://automation.internal:8000");
        assert_eq!(config.operation_timeout(), None);
        assert_eq!(config.notification_ttl(), Duration::from_millis(5000));
        assert_eq!(config.status_poll_interval(), None);
    }

    #[test]
    fn test_storage_file_skipped_when_unset() {
        let yaml = serde_yaml::to_string(&ConsoleConfig::default()).unwrap();
        assert!(yaml.contains("backendUrl"));
        assert!(!yaml.contains("storageFile"));
    }
}
