//! Configuration system for rosa-console
//!
//! Layered configuration: built-in defaults, the root config file, then
//! environment variable overrides.

pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::ConsoleConfig;

/// Configuration keys accepted by `config get` and `config set`
pub const CONFIG_KEYS: &[&str] = &[
    "backendUrl",
    "requestTimeoutSecs",
    "operationTimeoutSecs",
    "notificationTtlMs",
    "statusPollSecs",
    "storageFile",
];

/// Get a configuration value by key
pub fn get_config_value(config: &ConsoleConfig, key: &str) -> anyhow::Result<String> {
    match key {
        "backendUrl" => Ok(config.backend_url.clone()),
        "requestTimeoutSecs" => Ok(config.request_timeout_secs.to_string()),
        "operationTimeoutSecs" => Ok(config.operation_timeout_secs.to_string()),
        "notificationTtlMs" => Ok(config.notification_ttl_ms.to_string()),
        "statusPollSecs" => Ok(config.status_poll_secs.to_string()),
        "storageFile" => Ok(config.storage_path().display().to_string()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key
pub fn set_config_value(config: &mut ConsoleConfig, key: &str, value: &str) -> anyhow::Result<()> {
    use anyhow::Context;
    match key {
        "backendUrl" => {
            url::Url::parse(value).context("backendUrl must be an absolute URL")?;
            config.backend_url = value.to_string();
        }
        "requestTimeoutSecs" => {
            config.request_timeout_secs = value
                .parse()
                .context("requestTimeoutSecs must be a number")?;
        }
        "operationTimeoutSecs" => {
            config.operation_timeout_secs = value
                .parse()
                .context("operationTimeoutSecs must be a number")?;
        }
        "notificationTtlMs" => {
            config.notification_ttl_ms = value
                .parse()
                .context("notificationTtlMs must be a number")?;
        }
        "statusPollSecs" => {
            config.status_poll_secs = value.parse().context("statusPollSecs must be a number")?;
        }
        "storageFile" => {
            if value.is_empty() {
                config.storage_file = None;
            } else {
                config.storage_file = Some(value.into());
            }
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_readable() {
        let config = ConsoleConfig::default();
        for key in CONFIG_KEYS {
            assert!(get_config_value(&config, key).is_ok(), "{}", key);
        }
        assert!(get_config_value(&config, "readOnly").is_err());
    }

    #[test]
    fn test_set_config_value() {
        let mut config = ConsoleConfig::default();
        set_config_value(&mut config, "operationTimeoutSecs", "60").unwrap();
        assert_eq!(config.operation_timeout_secs, 60);

        assert!(set_config_value(&mut config, "statusPollSecs", "often").is_err());
        assert!(set_config_value(&mut config, "backendUrl", "not a url").is_err());

        set_config_value(&mut config, "storageFile", "/tmp/prefs.json").unwrap();
        assert_eq!(
            get_config_value(&config, "storageFile").unwrap(),
            "/tmp/prefs.json"
        );
        set_config_value(&mut config, "storageFile", "").unwrap();
        assert_eq!(config.storage_file, None);
    }
}
