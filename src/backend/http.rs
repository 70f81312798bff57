//! HTTP client for the automation backend

use super::{StatusClient, TaskResponse, TaskRunner};
use crate::operations::TaskRequest;
use crate::status::{AuthStatus, ConfigStatus, ConnectionStatus, SetupStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

const AUTH_STATUS_PATH: &str = "/api/rosa/status";
const CONFIG_STATUS_PATH: &str = "/api/config/status";
const CONNECTION_STATUS_PATH: &str = "/api/ocp/connection-status";
const SETUP_STATUS_PATH: &str = "/api/guided-setup/status";
const RUN_TASK_PATH: &str = "/api/ansible/run-task";

/// REST client implementing both status and task collaborators
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
    status_timeout: Duration,
}

impl HttpBackend {
    /// Create a client for the backend at `base_url`
    ///
    /// `status_timeout` bounds each status request. Task requests carry no
    /// client-side limit here; the operation executor owns that policy.
    pub fn new(base_url: &str, status_timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid backend URL: {}", base_url))?;

        let client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        tracing::debug!("Created backend client for: {}", base_url);

        Ok(Self {
            client,
            base_url,
            status_timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Invalid endpoint path: {}", path))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        tracing::debug!("Fetching status from: {}", url);

        let resp = self
            .client
            .get(url.clone())
            .timeout(self.status_timeout)
            .send()
            .await
            .with_context(|| format!("Failed to fetch from: {}", url))?;

        let resp = check_status(resp).await?;
        resp.json()
            .await
            .with_context(|| format!("Failed to parse JSON response from: {}", url))
    }
}

/// Turn a non-success HTTP status into an error carrying the backend detail
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let url = resp.url().clone();
    let body = resp.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or(body);

    if detail.is_empty() {
        anyhow::bail!("HTTP request failed: {} (status: {})", url, status)
    }
    anyhow::bail!("HTTP request failed: {} (status: {}): {}", url, status, detail)
}

#[async_trait]
impl StatusClient for HttpBackend {
    async fn fetch_auth(&self) -> Result<AuthStatus> {
        self.get_json(AUTH_STATUS_PATH).await
    }

    async fn fetch_config(&self) -> Result<ConfigStatus> {
        self.get_json(CONFIG_STATUS_PATH).await
    }

    async fn fetch_connection(&self) -> Result<ConnectionStatus> {
        self.get_json(CONNECTION_STATUS_PATH).await
    }

    async fn fetch_setup(&self) -> Result<SetupStatus> {
        self.get_json(SETUP_STATUS_PATH).await
    }
}

#[async_trait]
impl TaskRunner for HttpBackend {
    async fn run_task(&self, request: &TaskRequest) -> Result<TaskResponse> {
        let url = self.endpoint(RUN_TASK_PATH)?;
        tracing::debug!("Running task {} via {}", request.task_id, url);

        let resp = self
            .client
            .post(url.clone())
            .json(request)
            .send()
            .await
            .with_context(|| format!("Failed to reach: {}", url))?;

        let resp = check_status(resp).await?;
        let report: TaskResponse = resp
            .json()
            .await
            .context("Failed to parse task response")?;

        tracing::debug!(
            "Task {} finished (success: {})",
            request.task_id,
            report.success
        );

        Ok(report)
    }
}
