//! Backend collaborator contracts
//!
//! The console core never talks to the automation backend directly. Status
//! sources and task execution are reached through these traits; the
//! [`HttpBackend`] implements both against the backend's REST API.

mod http;

pub use http::HttpBackend;

use crate::operations::TaskRequest;
use crate::status::{AuthStatus, ConfigStatus, ConnectionStatus, SetupStatus};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The four readiness status sources
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusClient: Send + Sync {
    /// ROSA CLI authentication status
    async fn fetch_auth(&self) -> Result<AuthStatus>;

    /// Credential configuration status
    async fn fetch_config(&self) -> Result<ConfigStatus>;

    /// OpenShift hub connection status
    async fn fetch_connection(&self) -> Result<ConnectionStatus>;

    /// Guided setup progress
    async fn fetch_setup(&self) -> Result<SetupStatus>;
}

/// Executes automation tasks on the backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRunner: Send + Sync {
    /// Run one task and return the backend's report
    ///
    /// Dropping the returned future cancels the request.
    async fn run_task(&self, request: &TaskRequest) -> Result<TaskResponse>;
}

/// Backend report for one task execution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Structured outcome code, when the task provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_code: Option<String>,
}

impl TaskResponse {
    pub fn succeeded(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: Some(output.into()),
            ..Self::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}
