//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod commands;
mod logging;
mod operations;
mod version;

pub use commands::{ConfigSubcommand, PrefsSubcommand, handle_config_command, handle_prefs_command};
pub use logging::*;
pub use operations::{
    list_operations, run_operation, show_history, show_status, toggle_favorite, watch_period,
    watch_status,
};
pub use version::display_version;
