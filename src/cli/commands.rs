//! CLI command handlers for configuration and preferences

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::config::{self, ConfigLoader, paths};
use crate::preferences::{PreferenceStore, keys};

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get configuration value
    Get {
        /// Configuration key (e.g., "backendUrl", "operationTimeoutSecs")
        key: Option<String>,
    },
    /// Set configuration value
    Set {
        /// Configuration key (e.g., "backendUrl", "operationTimeoutSecs")
        key: String,
        /// Configuration value
        value: String,
    },
    /// List all configuration
    List,
    /// Show configuration file path
    Path,
    /// Validate configuration
    Validate,
}

/// Persisted preference subcommands
#[derive(Subcommand, Debug)]
pub enum PrefsSubcommand {
    /// Get a preference value as JSON
    Get {
        /// Preference key (e.g., "prefix", "subnets", "oidcConfigUrl")
        key: String,
    },
    /// Set a preference value
    Set {
        /// Preference key (e.g., "prefix", "subnets", "oidcConfigUrl")
        key: String,
        /// Value; subnets are given as "public,private"
        value: String,
    },
    /// List all preferences
    List,
}

/// Handle configuration subcommands
pub async fn handle_config_command(cmd: ConfigSubcommand) -> Result<()> {
    match cmd {
        ConfigSubcommand::Get { key } => {
            // Load config (will use defaults if no file exists)
            let config = ConfigLoader::load().context("Failed to load configuration")?;

            if let Some(key) = key {
                let value = config::get_config_value(&config, &key)?;
                println!("{}", value);
            } else {
                let yaml =
                    serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
                print!("{}", yaml);
            }
        }
        ConfigSubcommand::Set { key, value } => {
            // Start from the file alone so env overrides are not persisted
            let root_path = paths::root_config_path();
            let mut config = if root_path.exists() {
                ConfigLoader::load_file(&root_path)?
            } else {
                config::ConsoleConfig::default()
            };

            config::set_config_value(&mut config, &key, &value)
                .with_context(|| format!("Failed to set {} = {}", key, value))?;

            ConfigLoader::save_root(&config).context("Failed to save configuration")?;
            println!("Configuration saved");
        }
        ConfigSubcommand::List => {
            let config = ConfigLoader::load().context("Failed to load configuration")?;
            for key in config::CONFIG_KEYS {
                println!("{}: {}", key, config::get_config_value(&config, key)?);
            }
        }
        ConfigSubcommand::Path => {
            println!("{}", paths::root_config_path().display());
        }
        ConfigSubcommand::Validate => match ConfigLoader::validate() {
            Ok(()) => println!("Configuration is valid"),
            Err(e) => {
                eprintln!("Configuration validation failed: {:#}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

/// Handle preference subcommands
pub fn handle_prefs_command(preferences: &PreferenceStore, cmd: PrefsSubcommand) -> Result<()> {
    match cmd {
        PrefsSubcommand::Get { key } => {
            let value = preferences.get_value(&key)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        PrefsSubcommand::Set { key, value } => {
            preferences
                .set_value(&key, &value)
                .with_context(|| format!("Failed to set {} = {}", key, value))?;
            println!("Preference saved");
        }
        PrefsSubcommand::List => {
            for key in keys::ALL {
                let value = preferences.get_value(key)?;
                println!("{}: {}", key, value);
            }
        }
    }

    Ok(())
}
