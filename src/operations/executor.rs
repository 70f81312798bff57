//! Operation execution
//!
//! Runs one operation against the task collaborator, tracks its loading
//! state, applies the timeout policy and reports the outcome through the
//! notification center. Per operation id the lifecycle is
//! `IDLE -> LOADING -> (SUCCESS | FAILED | TIMED_OUT) -> IDLE`.

use super::Operation;
use crate::backend::{TaskResponse, TaskRunner};
use crate::notify::{NotificationCenter, NotificationKind};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Per-run options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Abort the backend call after this long
    pub timeout: Option<Duration>,
}

impl RunOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

/// Why a backend call did not produce a report
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    #[error("Request timed out")]
    TimedOut(Duration),

    #[error("{0}")]
    Failed(String),
}

/// Classified outcome of one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timed_out: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_code: Option<String>,
}

impl ExecutionResult {
    /// Classify a backend report or call failure
    ///
    /// Success is taken from the report's own `success` field: a report
    /// delivered without transport errors can still be a failure.
    pub fn classify(outcome: Result<TaskResponse, ExecutionError>) -> Self {
        match outcome {
            Ok(report) if report.success => Self {
                success: true,
                output: report.output,
                error: None,
                timed_out: false,
                result_code: report.result_code,
            },
            Ok(report) => {
                let error = non_empty(report.error)
                    .or_else(|| non_empty(report.message))
                    .unwrap_or_else(|| "Task reported failure".to_string());
                Self {
                    success: false,
                    output: report.output,
                    error: Some(error),
                    timed_out: false,
                    result_code: report.result_code,
                }
            }
            Err(e @ ExecutionError::TimedOut(_)) => Self {
                success: false,
                error: Some(e.to_string()),
                timed_out: true,
                ..Self::default()
            },
            Err(ExecutionError::Failed(message)) => Self {
                success: false,
                error: Some(message),
                ..Self::default()
            },
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

type LoadingTable = Arc<Mutex<HashMap<String, usize>>>;

/// Marks an operation id LOADING until dropped
pub struct LoadingGuard {
    loading: LoadingTable,
    id: String,
}

impl LoadingGuard {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let mut loading = self.loading.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(count) = loading.get_mut(&self.id) {
            *count -= 1;
            if *count == 0 {
                loading.remove(&self.id);
            }
        }
    }
}

#[derive(Clone)]
pub struct OperationExecutor {
    runner: Arc<dyn TaskRunner>,
    notifications: NotificationCenter,
    loading: LoadingTable,
}

impl OperationExecutor {
    pub fn new(runner: Arc<dyn TaskRunner>, notifications: NotificationCenter) -> Self {
        Self {
            runner,
            notifications,
            loading: Arc::default(),
        }
    }

    pub fn is_loading(&self, id: &str) -> bool {
        let loading = self.loading.lock().unwrap_or_else(|e| e.into_inner());
        loading.contains_key(id)
    }

    /// Ids currently LOADING, sorted
    pub fn loading_ids(&self) -> Vec<String> {
        let loading = self.loading.lock().unwrap_or_else(|e| e.into_inner());
        let mut ids: Vec<String> = loading.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Mark `id` LOADING unless it already is
    pub fn try_begin(&self, id: &str) -> Option<LoadingGuard> {
        let mut loading = self.loading.lock().unwrap_or_else(|e| e.into_inner());
        if loading.contains_key(id) {
            return None;
        }
        loading.insert(id.to_string(), 1);
        Some(LoadingGuard {
            loading: Arc::clone(&self.loading),
            id: id.to_string(),
        })
    }

    fn begin(&self, id: &str) -> LoadingGuard {
        let mut loading = self.loading.lock().unwrap_or_else(|e| e.into_inner());
        *loading.entry(id.to_string()).or_insert(0) += 1;
        LoadingGuard {
            loading: Arc::clone(&self.loading),
            id: id.to_string(),
        }
    }

    /// Run `op`
    ///
    /// Does not reject a second run of an id that is already LOADING; use
    /// [`OperationExecutor::try_begin`] with [`OperationExecutor::run_guarded`]
    /// for that.
    pub async fn run(&self, op: &Operation, opts: RunOptions) -> ExecutionResult {
        let guard = self.begin(&op.id);
        self.run_guarded(guard, op, opts).await
    }

    /// Run `op` under a guard obtained from [`OperationExecutor::try_begin`]
    pub async fn run_guarded(
        &self,
        guard: LoadingGuard,
        op: &Operation,
        opts: RunOptions,
    ) -> ExecutionResult {
        debug_assert_eq!(guard.id(), op.id);
        tracing::info!("Running {} ({})", op.title, op.task.task_id);

        let outcome = self.invoke(op, opts.timeout).await;
        let result = ExecutionResult::classify(outcome);
        drop(guard);

        if result.success {
            tracing::info!("{} succeeded", op.title);
        } else {
            tracing::warn!(
                "{} failed: {}",
                op.title,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }

        self.notify_outcome(op, &result, opts.timeout);
        result
    }

    async fn invoke(
        &self,
        op: &Operation,
        timeout: Option<Duration>,
    ) -> Result<TaskResponse, ExecutionError> {
        let call = self.runner.run_task(&op.task);

        let response = match timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(response) => response,
                // Dropping the call future aborts the in-flight request
                Err(_) => return Err(ExecutionError::TimedOut(limit)),
            },
            None => call.await,
        };

        response.map_err(|e| ExecutionError::Failed(format!("{:#}", e)))
    }

    fn notify_outcome(&self, op: &Operation, result: &ExecutionResult, timeout: Option<Duration>) {
        let (message, kind) = if result.success {
            (
                format!("{} completed successfully", op.title),
                NotificationKind::Success,
            )
        } else if result.timed_out {
            let message = match timeout {
                Some(limit) => format!("{} timed out after {}", op.title, format_duration(limit)),
                None => format!("{} timed out", op.title),
            };
            (message, NotificationKind::Error)
        } else {
            let message = match &result.error {
                Some(error) => format!("Failed to execute {}: {}", op.title, error),
                None => format!("Failed to execute {}", op.title),
            };
            (message, NotificationKind::Error)
        };

        self.notifications.push_default(message, kind);
    }
}

fn format_duration(d: Duration) -> String {
    if d.subsec_millis() == 0 {
        format!("{}s", d.as_secs())
    } else {
        format!("{}ms", d.as_millis())
    }
}
