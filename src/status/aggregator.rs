//! Concurrent status refresh and readiness derivation

use super::readiness::ReadinessVerdict;
use super::snapshot::{
    AuthStatus, ConfigStatus, ConnectionStatus, SetupStatus, Snapshot, SourceId, SourceStatus,
};
use crate::backend::StatusClient;
use crate::scheduler::{Scheduler, TaskHandle};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Latest snapshot of every source
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshots {
    pub auth: Snapshot<AuthStatus>,
    pub config: Snapshot<ConfigStatus>,
    pub connection: Snapshot<ConnectionStatus>,
    pub setup: Snapshot<SetupStatus>,
}

impl Default for StatusSnapshots {
    fn default() -> Self {
        Self {
            auth: Snapshot::pending(SourceId::Auth),
            config: Snapshot::pending(SourceId::Config),
            connection: Snapshot::pending(SourceId::Connection),
            setup: Snapshot::pending(SourceId::Setup),
        }
    }
}

impl StatusSnapshots {
    /// `(source, ok, message)` for every source, in fixed order
    pub fn lines(&self) -> Vec<(SourceId, bool, &str)> {
        vec![
            (SourceId::Auth, self.auth.ok, self.auth.message.as_str()),
            (SourceId::Config, self.config.ok, self.config.message.as_str()),
            (
                SourceId::Connection,
                self.connection.ok,
                self.connection.message.as_str(),
            ),
            (SourceId::Setup, self.setup.ok, self.setup.message.as_str()),
        ]
    }
}

/// Fetches the four status sources and derives readiness
#[derive(Clone)]
pub struct StatusAggregator {
    client: Arc<dyn StatusClient>,
    snapshots: Arc<RwLock<StatusSnapshots>>,
}

impl StatusAggregator {
    pub fn new(client: Arc<dyn StatusClient>) -> Self {
        Self {
            client,
            snapshots: Arc::default(),
        }
    }

    /// Fetch all four sources concurrently
    ///
    /// A failed source gets a synthetic unavailable snapshot; the others are
    /// unaffected. All four are applied together once every fetch settled.
    pub async fn refresh(&self) {
        tracing::debug!("Refreshing status from all sources");

        let (auth, config, connection, setup) = tokio::join!(
            self.client.fetch_auth(),
            self.client.fetch_config(),
            self.client.fetch_connection(),
            self.client.fetch_setup(),
        );

        let next = StatusSnapshots {
            auth: settle(SourceId::Auth, auth),
            config: settle(SourceId::Config, config.map(ConfigStatus::normalized)),
            connection: settle(SourceId::Connection, connection),
            setup: settle(SourceId::Setup, setup),
        };

        let mut snapshots = self.snapshots.write().unwrap_or_else(|e| e.into_inner());
        *snapshots = next;

        tracing::debug!(
            "Status refreshed: auth={}, config={}, connection={}, setup={}",
            snapshots.auth.ok,
            snapshots.config.ok,
            snapshots.connection.ok,
            snapshots.setup.ok
        );
    }

    /// Copy of the latest snapshots
    pub fn snapshots(&self) -> StatusSnapshots {
        self.snapshots
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Readiness from the latest auth and config snapshots, recomputed on
    /// every call
    pub fn readiness(&self) -> ReadinessVerdict {
        let snapshots = self.snapshots.read().unwrap_or_else(|e| e.into_inner());
        ReadinessVerdict::evaluate(&snapshots.auth.data, &snapshots.config.data)
    }

    /// Required credentials that are missing or empty
    pub fn missing_config_fields(&self) -> Vec<&'static str> {
        let snapshots = self.snapshots.read().unwrap_or_else(|e| e.into_inner());
        snapshots.config.data.missing_fields()
    }

    /// One line per source followed by the readiness verdict
    pub fn summary(&self) -> String {
        let snapshots = self.snapshots();
        let mut lines: Vec<String> = snapshots
            .lines()
            .into_iter()
            .map(|(source, ok, message)| {
                format!("{}: {} - {}", source, if ok { "ok" } else { "FAIL" }, message)
            })
            .collect();

        let verdict = ReadinessVerdict::evaluate(&snapshots.auth.data, &snapshots.config.data);
        lines.push(match verdict.blocking_reason {
            None => "readiness: ready".to_string(),
            Some(reason) => format!("readiness: blocked ({})", reason),
        });
        lines.join("\n")
    }

    /// Refresh every `period` until the handle is cancelled
    pub fn start_polling(&self, scheduler: &Scheduler, period: Duration) -> TaskHandle {
        tracing::debug!("Polling status every {:?}", period);
        let aggregator = self.clone();
        scheduler.schedule_every(period, move || {
            let aggregator = aggregator.clone();
            async move { aggregator.refresh().await }
        })
    }
}

fn settle<T: SourceStatus + Default>(source: SourceId, result: anyhow::Result<T>) -> Snapshot<T> {
    match result {
        Ok(data) => Snapshot::observed(source, data),
        Err(e) => {
            tracing::warn!("Status source '{}' unavailable: {:#}", source, e);
            Snapshot::unavailable(source, &e)
        }
    }
}
