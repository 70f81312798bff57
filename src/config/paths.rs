//! Cross-platform directory path resolution
//!
//! Resolves where the config file and the preference file live. Linux and
//! macOS follow the XDG base directory layout; Windows uses AppData.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "rosa-console";

/// Get the configuration directory path
///
/// `ROSA_CONSOLE_CONFIG_DIR` wins; otherwise `$XDG_CONFIG_HOME/rosa-console`
/// (default `~/.config/rosa-console`) on Unix and the roaming AppData
/// folder on Windows.
pub fn config_dir() -> PathBuf {
    resolve_dir("ROSA_CONSOLE_CONFIG_DIR", "XDG_CONFIG_HOME", &[".config"], |dirs| {
        dirs.config_dir().to_path_buf()
    })
}

/// Get the data directory path
///
/// `ROSA_CONSOLE_DATA_DIR` wins; otherwise `$XDG_DATA_HOME/rosa-console`
/// (default `~/.local/share/rosa-console`) on Unix and the local AppData
/// folder on Windows.
pub fn data_dir() -> PathBuf {
    resolve_dir("ROSA_CONSOLE_DATA_DIR", "XDG_DATA_HOME", &[".local", "share"], |dirs| {
        dirs.data_dir().to_path_buf()
    })
}

fn resolve_dir(
    override_var: &str,
    xdg_var: &str,
    home_relative: &[&str],
    project_dir: fn(&directories::ProjectDirs) -> PathBuf,
) -> PathBuf {
    if let Ok(dir) = std::env::var(override_var) {
        return PathBuf::from(dir);
    }

    #[cfg(not(windows))]
    let _ = project_dir;
    #[cfg(windows)]
    {
        if let Some(dirs) = directories::ProjectDirs::from("", "", APP_DIR) {
            return project_dir(&dirs);
        }
    }

    let base = std::env::var(xdg_var).map(PathBuf::from).unwrap_or_else(|_| {
        let home = directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        home_relative.iter().fold(home, |path, part| path.join(part))
    });
    base.join(APP_DIR)
}

/// Get the root configuration file path
pub fn root_config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

/// Get the default preference file path
pub fn default_storage_path() -> PathBuf {
    data_dir().join("preferences.json")
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
