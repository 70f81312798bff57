//! rosa-console - headless operator console for ROSA/CAPI automation
//!
//! Checks readiness against the automation backend and runs its tasks from
//! the command line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rosa_console::cli::{self, ConfigSubcommand, PrefsSubcommand};
use rosa_console::config::ConfigLoader;
use rosa_console::{Console, OperationCatalog};

/// rosa-console - operator console for ROSA/CAPI automation
#[derive(Parser, Debug)]
#[command(name = "rosa-console")]
#[command(about = "Operator console for ROSA/CAPI automation", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd')]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Show readiness status from every source
    Status,
    /// Refresh status periodically and print each summary
    Watch {
        /// Seconds between refreshes (overrides statusPollSecs)
        #[arg(long, short = 'i')]
        interval: Option<u64>,
    },
    /// List operations and whether each may run
    Ops,
    /// Run an operation
    Run {
        /// Operation id (see `ops`)
        id: String,
        /// Confirm destructive operations without prompting
        #[arg(long, short = 'y')]
        yes: bool,
        /// Abort after this many seconds (overrides operationTimeoutSecs)
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Toggle an operation as favorite
    Favorite {
        /// Operation id
        id: String,
    },
    /// Show recently dispatched operations
    History,
    /// Persisted preferences
    Prefs {
        #[command(subcommand)]
        subcommand: PrefsSubcommand,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging if debug flag is set
    if let Some(log_path) = cli::init_logging(args.debug) {
        eprintln!(
            "Debug logging enabled. Logs written to: {}",
            log_path.display()
        );
    }

    let command = match args.command {
        Command::Config { subcommand } => return cli::handle_config_command(subcommand).await,
        Command::Version => {
            cli::display_version();
            return Ok(());
        }
        command => command,
    };

    let config = ConfigLoader::load().context("Failed to load configuration")?;
    tracing::debug!(
        "Configuration loaded: backendUrl={}, operationTimeoutSecs={}",
        config.backend_url,
        config.operation_timeout_secs
    );

    let console = Console::from_config(&config)?;
    let catalog = OperationCatalog::new();

    let result = match command {
        Command::Status => cli::show_status(&console).await,
        Command::Watch { interval } => match cli::watch_period(&config, interval) {
            Ok(period) => cli::watch_status(&console, period, None, &mut std::io::stdout()).await,
            Err(e) => Err(e),
        },
        Command::Ops => cli::list_operations(&console, &catalog).await,
        Command::Run { id, yes, timeout } => {
            cli::run_operation(&console, &catalog, &id, yes, timeout).await
        }
        Command::Favorite { id } => cli::toggle_favorite(&console, &catalog, &id),
        Command::History => cli::show_history(&console),
        Command::Prefs { subcommand } => cli::handle_prefs_command(console.preferences(), subcommand),
        Command::Config { .. } | Command::Version => Ok(()),
    };

    console.shutdown();
    result
}
