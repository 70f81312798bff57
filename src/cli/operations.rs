//! CLI handlers for status, operations and history

use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::time::Duration;

use crate::config::ConsoleConfig;
use crate::console::{Console, DispatchOptions, DispatchOutcome};
use crate::notify::NotificationKind;
use crate::operations::{Decision, OperationCatalog, interpret};

/// Operations whose output describes component health
const HEALTH_CHECKS: [&str; 2] = ["check-components", "capi-capa-status"];

/// Refresh every status source and print the summary
pub async fn show_status(console: &Console) -> Result<()> {
    console.refresh_status().await;
    println!("{}", console.status().summary());

    let missing = console.status().missing_config_fields();
    if !missing.is_empty() {
        println!("missing configuration: {}", missing.join(", "));
        if console.snapshots().config.data.reported_without_values() {
            println!(
                "hint: the backend lists every required field but reports no values; \
                 it must include field values for configuration to count as complete"
            );
        }
    }

    let setup = console.snapshots().setup;
    if setup.is_available() {
        println!(
            "guided setup: step {} (next: {})",
            setup.data.current_step,
            setup.data.next_action.as_str()
        );
    }

    Ok(())
}

/// Polling period for `watch`: the flag wins, then `statusPollSecs`
pub fn watch_period(config: &ConsoleConfig, interval_secs: Option<u64>) -> Result<Duration> {
    match interval_secs {
        Some(0) => Err(anyhow::anyhow!("--interval must be at least 1 second")),
        Some(secs) => Ok(Duration::from_secs(secs)),
        None => config
            .status_poll_interval()
            .context("Status polling is disabled: set statusPollSecs or pass --interval"),
    }
}

/// Refresh and print the status summary every `period`
///
/// Runs until interrupted, or for `rounds` refreshes when given.
pub async fn watch_status(
    console: &Console,
    period: Duration,
    rounds: Option<usize>,
    out: &mut impl Write,
) -> Result<()> {
    tracing::debug!("Watching status every {:?}", period);
    let mut ticker = tokio::time::interval(period);
    let mut printed = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => break,
        }

        console.refresh_status().await;
        writeln!(out, "{}\n", console.status().summary()).context("Failed to write status")?;

        printed += 1;
        if rounds.is_some_and(|limit| printed >= limit) {
            break;
        }
    }

    Ok(())
}

/// List the catalog with the gate decision for each operation
pub async fn list_operations(console: &Console, catalog: &OperationCatalog) -> Result<()> {
    console.refresh_status().await;
    let favorites = console.preferences().favorites();

    for op in catalog.all() {
        let marker = if favorites.contains(&op.id) { "*" } else { " " };
        let decision = match console.evaluate_operation(op) {
            Decision::Allow => "ready".to_string(),
            Decision::RequiresConfirmation => "ready, needs confirmation".to_string(),
            Decision::Block(reason) => format!("blocked: {}", reason),
        };
        println!("{} {:<28} {:<28} [{}]", marker, op.id, op.title, decision);
    }

    Ok(())
}

/// Run one catalog operation to completion
pub async fn run_operation(
    console: &Console,
    catalog: &OperationCatalog,
    id: &str,
    yes: bool,
    timeout: Option<u64>,
) -> Result<()> {
    let op = catalog
        .get(id)
        .with_context(|| format!("Unknown operation: {}", id))?;

    console.refresh_status().await;

    let mut opts = DispatchOptions {
        confirmed: yes,
        ..DispatchOptions::default()
    };
    if let Some(secs) = timeout {
        opts = opts.with_timeout(Duration::from_secs(secs));
    }

    let mut outcome = console.run_operation(op, opts).await;
    if outcome == DispatchOutcome::NeedsConfirmation {
        if !confirm(&format!("{} is destructive. Proceed?", op.title))? {
            println!("Cancelled");
            return Ok(());
        }
        opts.confirmed = true;
        outcome = console.run_operation(op, opts).await;
    }

    print_notifications(console);

    match outcome {
        DispatchOutcome::Completed(result) => {
            if let Some(output) = result.output.as_deref().filter(|o| !o.is_empty()) {
                println!("{}", output);
            }
            if HEALTH_CHECKS.contains(&op.id.as_str()) {
                println!("component health: {}", interpret(&result).as_str());
            }
            if result.success {
                Ok(())
            } else {
                Err(anyhow::anyhow!(
                    "{}",
                    result.error.unwrap_or_else(|| "operation failed".to_string())
                ))
            }
        }
        DispatchOutcome::Blocked(reason) => Err(anyhow::anyhow!("{} blocked: {}", op.title, reason)),
        DispatchOutcome::AlreadyRunning => {
            Err(anyhow::anyhow!("{} is already running", op.title))
        }
        DispatchOutcome::NeedsConfirmation => {
            Err(anyhow::anyhow!("{} was not confirmed", op.title))
        }
    }
}

/// Toggle an operation in the favorites set
pub fn toggle_favorite(console: &Console, catalog: &OperationCatalog, id: &str) -> Result<()> {
    let op = catalog
        .get(id)
        .with_context(|| format!("Unknown operation: {}", id))?;

    if console.preferences().toggle_favorite(&op.id) {
        println!("Added {} to favorites", op.id);
    } else {
        println!("Removed {} from favorites", op.id);
    }
    Ok(())
}

/// Print recently dispatched operations, newest first
pub fn show_history(console: &Console) -> Result<()> {
    let recent = console.preferences().recent_operations();
    if recent.is_empty() {
        println!("No recent operations");
        return Ok(());
    }

    for record in recent {
        println!(
            "{}  {:<28} {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.operation.id,
            record.operation.title
        );
    }
    Ok(())
}

fn print_notifications(console: &Console) {
    for notification in console.notifications() {
        let label = match notification.kind {
            NotificationKind::Success => "ok",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
        };
        eprintln!("[{}] {}", label, notification.message);
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush().context("Failed to flush stdout")?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
