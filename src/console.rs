//! Console entry points
//!
//! Wires the status aggregator, operation gate, executor, notification
//! center and preference store together behind the calls a presentation
//! layer makes.

use crate::backend::{HttpBackend, StatusClient, TaskRunner};
use crate::config::ConsoleConfig;
use crate::notify::{DEFAULT_NOTIFICATION_TTL, Notification, NotificationCenter, NotificationKind};
use crate::operations::{
    Decision, ExecutionResult, Operation, OperationExecutor, OperationGate, RunOptions,
};
use crate::preferences::PreferenceStore;
use crate::scheduler::{Scheduler, TaskHandle};
use crate::status::{ReadinessVerdict, StatusAggregator, StatusSnapshots};
use crate::storage::{FileStore, PersistenceLayer};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

/// Tunables for a console instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleSettings {
    /// Timeout applied when a dispatch does not name its own
    pub default_timeout: Option<Duration>,
    pub notification_ttl: Duration,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            default_timeout: None,
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
        }
    }
}

impl From<&ConsoleConfig> for ConsoleSettings {
    fn from(config: &ConsoleConfig) -> Self {
        Self {
            default_timeout: config.operation_timeout(),
            notification_ttl: config.notification_ttl(),
        }
    }
}

/// Per-dispatch options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Overrides the console's default timeout
    pub timeout: Option<Duration>,
    /// The caller obtained explicit confirmation for a destructive operation
    pub confirmed: bool,
}

impl DispatchOptions {
    pub fn confirmed() -> Self {
        Self {
            confirmed: true,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// What happened to one dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Readiness blocked the operation; nothing ran
    Blocked(String),
    /// Destructive operation dispatched without confirmation; nothing ran
    NeedsConfirmation,
    /// The same operation id is still LOADING; nothing ran
    AlreadyRunning,
    Completed(ExecutionResult),
}

impl DispatchOutcome {
    pub fn result(&self) -> Option<&ExecutionResult> {
        match self {
            DispatchOutcome::Completed(result) => Some(result),
            _ => None,
        }
    }
}

pub struct Console {
    status: StatusAggregator,
    preferences: PreferenceStore,
    notifications: NotificationCenter,
    executor: OperationExecutor,
    scheduler: Scheduler,
    default_timeout: Option<Duration>,
}

impl Console {
    pub fn new(
        status_client: Arc<dyn StatusClient>,
        task_runner: Arc<dyn TaskRunner>,
        persistence: PersistenceLayer,
        settings: ConsoleSettings,
    ) -> Self {
        let scheduler = Scheduler::new();
        let notifications =
            NotificationCenter::with_default_ttl(scheduler.clone(), settings.notification_ttl);
        let executor = OperationExecutor::new(task_runner, notifications.clone());

        Self {
            status: StatusAggregator::new(status_client),
            preferences: PreferenceStore::hydrate(persistence),
            notifications,
            executor,
            scheduler,
            default_timeout: settings.default_timeout,
        }
    }

    /// Console backed by the HTTP backend and the configured preference file
    pub fn from_config(config: &ConsoleConfig) -> Result<Self> {
        let backend = Arc::new(HttpBackend::new(
            &config.backend_url,
            config.request_timeout(),
        )?);
        let store = Arc::new(FileStore::open(config.storage_path()));

        Ok(Self::new(
            backend.clone(),
            backend,
            PersistenceLayer::new(store),
            ConsoleSettings::from(config),
        ))
    }

    pub async fn refresh_status(&self) {
        self.status.refresh().await;
    }

    pub fn status(&self) -> &StatusAggregator {
        &self.status
    }

    pub fn snapshots(&self) -> StatusSnapshots {
        self.status.snapshots()
    }

    pub fn readiness(&self) -> ReadinessVerdict {
        self.status.readiness()
    }

    pub fn evaluate_operation(&self, op: &Operation) -> Decision {
        OperationGate::evaluate(op, &self.readiness())
    }

    /// Gate and run `op`
    ///
    /// A blocked attempt is reported as an error notification carrying the
    /// blocking reason. History is recorded when the run is dispatched, not
    /// when it completes.
    pub async fn run_operation(&self, op: &Operation, opts: DispatchOptions) -> DispatchOutcome {
        match self.evaluate_operation(op) {
            Decision::Block(reason) => {
                tracing::info!("{} blocked: {}", op.title, reason);
                self.notifications
                    .push_default(reason.clone(), NotificationKind::Error);
                return DispatchOutcome::Blocked(reason);
            }
            Decision::RequiresConfirmation if !opts.confirmed => {
                tracing::debug!("{} needs confirmation", op.title);
                return DispatchOutcome::NeedsConfirmation;
            }
            Decision::RequiresConfirmation | Decision::Allow => {}
        }

        let Some(guard) = self.executor.try_begin(&op.id) else {
            tracing::debug!("{} is already running", op.id);
            return DispatchOutcome::AlreadyRunning;
        };

        self.preferences.record_dispatch(op);

        let run = RunOptions {
            timeout: opts.timeout.or(self.default_timeout),
        };
        DispatchOutcome::Completed(self.executor.run_guarded(guard, op, run).await)
    }

    pub fn is_loading(&self, id: &str) -> bool {
        self.executor.is_loading(id)
    }

    pub fn loading_ids(&self) -> Vec<String> {
        self.executor.loading_ids()
    }

    /// Push a notification; `ttl` defaults to the console's notification ttl
    pub fn push_notification(
        &self,
        message: impl Into<String>,
        kind: NotificationKind,
        ttl: Option<Duration>,
    ) -> u64 {
        let ttl = ttl.unwrap_or_else(|| self.notifications.default_ttl());
        self.notifications.push(message, kind, ttl)
    }

    /// Active notifications, oldest first
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.active()
    }

    pub fn dismiss_notification(&self, id: u64) -> bool {
        self.notifications.dismiss(id)
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    pub fn start_status_polling(&self, period: Duration) -> TaskHandle {
        self.status.start_polling(&self.scheduler, period)
    }

    /// Cancel every scheduled task, including pending notification expiry
    pub fn shutdown(&self) {
        tracing::debug!("Shutting down console");
        self.scheduler.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MockStatusClient, MockTaskRunner, TaskResponse};
    use crate::status::{
        AUTH_REQUIRED_REASON, AuthStatus, ConfigStatus, ConfiguredField, ConnectionStatus,
        REQUIRED_CONFIG_FIELDS, SetupStatus,
    };
    use crate::storage::MemoryStore;

    fn status_client(authenticated: bool) -> MockStatusClient {
        let mut client = MockStatusClient::new();
        client.expect_fetch_auth().returning(move || {
            Ok(AuthStatus {
                authenticated,
                ..AuthStatus::default()
            })
        });
        client.expect_fetch_config().returning(|| {
            Ok(ConfigStatus::from_fields(
                REQUIRED_CONFIG_FIELDS
                    .iter()
                    .map(|f| ConfiguredField::new(*f, "set"))
                    .collect(),
            ))
        });
        client
            .expect_fetch_connection()
            .returning(|| Ok(ConnectionStatus::default()));
        client
            .expect_fetch_setup()
            .returning(|| Ok(SetupStatus::default()));
        client
    }

    fn console(authenticated: bool, runner: MockTaskRunner) -> Console {
        Console::new(
            Arc::new(status_client(authenticated)),
            Arc::new(runner),
            PersistenceLayer::new(Arc::new(MemoryStore::new())),
            ConsoleSettings::default(),
        )
    }

    fn delete_op() -> Operation {
        Operation::for_task(
            "delete-rosa-cluster",
            "Delete ROSA HCP cluster",
            "tasks/delete_rosa_hcp_cluster.yml",
        )
    }

    #[tokio::test]
    async fn test_blocked_dispatch_notifies_and_skips_runner() {
        let mut runner = MockTaskRunner::new();
        runner.expect_run_task().never();
        let console = console(false, runner);
        console.refresh_status().await;

        let op = Operation::for_task("check-components", "Check components", "tasks/x.yml");
        let outcome = console.run_operation(&op, DispatchOptions::default()).await;

        assert_eq!(
            outcome,
            DispatchOutcome::Blocked(AUTH_REQUIRED_REASON.to_string())
        );
        let active = console.notifications();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].message, AUTH_REQUIRED_REASON);
        assert_eq!(active[0].kind, NotificationKind::Error);
        assert!(console.preferences().recent_operations().is_empty());
    }

    #[tokio::test]
    async fn test_destructive_needs_confirmation() {
        let mut runner = MockTaskRunner::new();
        runner
            .expect_run_task()
            .times(1)
            .returning(|_| Ok(TaskResponse::succeeded("deleted")));
        let console = console(true, runner);
        console.refresh_status().await;

        let outcome = console
            .run_operation(&delete_op(), DispatchOptions::default())
            .await;
        assert_eq!(outcome, DispatchOutcome::NeedsConfirmation);
        assert!(console.notifications().is_empty());
        assert!(console.preferences().recent_operations().is_empty());

        let outcome = console
            .run_operation(&delete_op(), DispatchOptions::confirmed())
            .await;
        assert!(outcome.result().is_some_and(|r| r.success));
        assert_eq!(console.preferences().recent_operations().len(), 1);
    }

    #[tokio::test]
    async fn test_custom_notification_ttl() {
        let console = console(true, MockTaskRunner::new());
        let id = console.push_notification("hello", NotificationKind::Info, None);
        assert!(console.dismiss_notification(id));
        assert!(console.notifications().is_empty());
        console.shutdown();
    }
}
