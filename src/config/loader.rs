//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::{paths, schema::ConsoleConfig};
use anyhow::{Context, Result};
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Root config file
    /// 3. Built-in defaults
    pub fn load() -> Result<ConsoleConfig> {
        let root_path = paths::root_config_path();
        let config = if root_path.exists() {
            Self::load_file(&root_path)?
        } else {
            tracing::debug!("No config file at {}, using defaults", root_path.display());
            ConsoleConfig::default()
        };

        Ok(Self::apply_env_overrides(config))
    }

    /// Load configuration from a file
    ///
    /// Keys missing from the file keep their built-in defaults.
    pub fn load_file(path: &Path) -> Result<ConsoleConfig> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: ConsoleConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration by loading and checking for errors
    ///
    /// Fails on invalid YAML, invalid value types, an unparseable backend
    /// URL or a zero request timeout.
    pub fn validate() -> Result<()> {
        let config = Self::load().context("Failed to load merged configuration")?;
        Self::check(&config)
    }

    fn check(config: &ConsoleConfig) -> Result<()> {
        let url = url::Url::parse(&config.backend_url)
            .with_context(|| format!("backendUrl is not a valid URL: {}", config.backend_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(anyhow::anyhow!(
                "backendUrl must use http or https, got '{}'",
                url.scheme()
            ));
        }

        if config.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("requestTimeoutSecs must be greater than 0"));
        }

        Ok(())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: ConsoleConfig) -> ConsoleConfig {
        // ROSA_CONSOLE_BACKEND_URL override
        if let Ok(url) = std::env::var("ROSA_CONSOLE_BACKEND_URL") {
            config.backend_url = url;
        }

        // ROSA_CONSOLE_OPERATION_TIMEOUT override
        if let Ok(timeout) = std::env::var("ROSA_CONSOLE_OPERATION_TIMEOUT") {
            match timeout.parse::<u64>() {
                Ok(secs) => config.operation_timeout_secs = secs,
                Err(_) => tracing::warn!(
                    "Ignoring ROSA_CONSOLE_OPERATION_TIMEOUT='{}': not a number",
                    timeout
                ),
            }
        }

        // ROSA_CONSOLE_STORAGE_FILE override
        if let Ok(file) = std::env::var("ROSA_CONSOLE_STORAGE_FILE") {
            config.storage_file = Some(file.into());
        }

        config
    }

    /// Save configuration to a file
    pub fn save(config: &ConsoleConfig, path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Save root configuration
    pub fn save_root(config: &ConsoleConfig) -> Result<()> {
        Self::save(config, &paths::root_config_path())
    }
}
