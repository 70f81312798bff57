//! Typed status snapshots for the four readiness sources
//!
//! Each payload type deserializes directly from the backend's JSON report.
//! Unknown fields are ignored and missing ones default, so a partially
//! populated report still produces a usable snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Credentials that must be configured before automation may run
pub const REQUIRED_CONFIG_FIELDS: [&str; 5] = [
    "AWS_REGION",
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "OCM_CLIENT_ID",
    "OCM_CLIENT_SECRET",
];

/// Identifies one status source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    Auth,
    Config,
    Connection,
    Setup,
}

impl SourceId {
    pub const ALL: [SourceId; 4] = [
        SourceId::Auth,
        SourceId::Config,
        SourceId::Connection,
        SourceId::Setup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Auth => "auth",
            SourceId::Config => "config",
            SourceId::Connection => "connection",
            SourceId::Setup => "setup",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source-specific view used to derive a snapshot's `ok` flag and message
pub trait SourceStatus {
    /// Whether the source reports a healthy state
    fn is_ok(&self) -> bool;

    /// Human-readable description of the state
    fn describe(&self) -> String;
}

/// Latest known state of one status source
///
/// Always replaced wholesale on refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot<T> {
    pub source: SourceId,
    pub fetched_at: DateTime<Utc>,
    pub ok: bool,
    pub message: String,
    /// Set when the fetch itself failed and `data` is a placeholder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub data: T,
}

impl<T: SourceStatus + Default> Snapshot<T> {
    /// Snapshot built from a successful fetch
    pub fn observed(source: SourceId, data: T) -> Self {
        Self {
            source,
            fetched_at: Utc::now(),
            ok: data.is_ok(),
            message: data.describe(),
            error: None,
            data,
        }
    }

    /// Synthetic snapshot for a failed fetch
    pub fn unavailable(source: SourceId, cause: &anyhow::Error) -> Self {
        let message = format!("{:#}", cause);
        Self {
            source,
            fetched_at: Utc::now(),
            ok: false,
            message: message.clone(),
            error: Some(message),
            data: T::default(),
        }
    }

    /// Placeholder used before the first refresh
    pub fn pending(source: SourceId) -> Self {
        Self {
            source,
            fetched_at: Utc::now(),
            ok: false,
            message: "Not checked yet".to_string(),
            error: None,
            data: T::default(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.error.is_none()
    }
}

/// ROSA CLI authentication state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStatus {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_command: Option<String>,
}

impl SourceStatus for AuthStatus {
    fn is_ok(&self) -> bool {
        self.authenticated
    }

    fn describe(&self) -> String {
        if !self.message.is_empty() {
            self.message.clone()
        } else if self.authenticated {
            "ROSA CLI is authenticated".to_string()
        } else {
            "ROSA CLI is not authenticated".to_string()
        }
    }
}

/// One credential reported as configured
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfiguredField {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ConfiguredField {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: Some(value.into()),
            description: None,
        }
    }

    /// Whether the field carries a non-blank value
    pub fn has_value(&self) -> bool {
        self.value
            .as_deref()
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Credential configuration state (vars/user_vars.yml)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigStatus {
    #[serde(default)]
    pub configured: bool,
    #[serde(default)]
    pub configured_fields: Vec<ConfiguredField>,
    #[serde(default)]
    pub total_configured: usize,
    #[serde(default)]
    pub total_required: usize,
    #[serde(default)]
    pub message: String,
}

impl ConfigStatus {
    /// Build a status from the reported fields, deriving the counters
    pub fn from_fields(configured_fields: Vec<ConfiguredField>) -> Self {
        Self {
            configured_fields,
            ..Self::default()
        }
        .normalized()
    }

    /// Recompute `configured` and the counters from `configured_fields`
    ///
    /// The backend's own `configured` flag is not trusted: only a required
    /// field present with a non-empty value counts.
    pub fn normalized(mut self) -> Self {
        let configured = {
            let present = self.present_fields();
            REQUIRED_CONFIG_FIELDS
                .iter()
                .filter(|f| present.contains(**f))
                .count()
        };
        self.total_required = REQUIRED_CONFIG_FIELDS.len();
        self.total_configured = configured;
        self.configured = self.total_configured == self.total_required;
        self
    }

    /// Field names reported with a non-empty value
    pub fn present_fields(&self) -> BTreeSet<&str> {
        self.configured_fields
            .iter()
            .filter(|f| f.has_value())
            .map(|f| f.field.as_str())
            .collect()
    }

    /// Required fields that are absent or empty, in declaration order
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let present = self.present_fields();
        REQUIRED_CONFIG_FIELDS
            .iter()
            .copied()
            .filter(|f| !present.contains(f))
            .collect()
    }

    /// Every required field is listed but none carries a value
    ///
    /// Backends that only report field names look like this; the strict
    /// predicate treats them as unconfigured.
    pub fn reported_without_values(&self) -> bool {
        let listed: BTreeSet<&str> = self
            .configured_fields
            .iter()
            .map(|f| f.field.as_str())
            .collect();
        REQUIRED_CONFIG_FIELDS.iter().all(|f| listed.contains(f))
            && self.configured_fields.iter().all(|f| f.value.is_none())
    }

    /// Strict configured predicate (presence AND non-empty value)
    pub fn is_configured(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

impl SourceStatus for ConfigStatus {
    fn is_ok(&self) -> bool {
        self.is_configured()
    }

    fn describe(&self) -> String {
        let missing = self.missing_fields();
        if missing.is_empty() {
            "All required credentials are configured".to_string()
        } else {
            format!(
                "{}/{} credentials configured (missing: {})",
                REQUIRED_CONFIG_FIELDS.len() - missing.len(),
                REQUIRED_CONFIG_FIELDS.len(),
                missing.join(", ")
            )
        }
    }
}

/// OpenShift hub connection state (informational only)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    #[serde(default)]
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl SourceStatus for ConnectionStatus {
    fn is_ok(&self) -> bool {
        self.connected
    }

    fn describe(&self) -> String {
        if !self.message.is_empty() {
            return self.message.clone();
        }
        match (&self.api_url, self.connected) {
            (Some(url), true) => format!("Connected to {}", url),
            (_, true) => "Connected".to_string(),
            (_, false) => "Not connected".to_string(),
        }
    }
}

/// Next guided-setup action reported by the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    RosaLogin,
    ConfigureVars,
    AwsCredentials,
    OcpConnection,
    Ready,
    Error,
    #[default]
    #[serde(other)]
    Unknown,
}

impl NextAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            NextAction::RosaLogin => "rosa_login",
            NextAction::ConfigureVars => "configure_vars",
            NextAction::AwsCredentials => "aws_credentials",
            NextAction::OcpConnection => "ocp_connection",
            NextAction::Ready => "ready",
            NextAction::Error => "error",
            NextAction::Unknown => "unknown",
        }
    }
}

/// Guided setup progress
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupStatus {
    #[serde(default)]
    pub current_step: u32,
    #[serde(default)]
    pub next_action: NextAction,
    #[serde(default)]
    pub all_prerequisites_met: bool,
}

impl SourceStatus for SetupStatus {
    fn is_ok(&self) -> bool {
        self.next_action == NextAction::Ready
    }

    fn describe(&self) -> String {
        format!(
            "step {}, next action: {}",
            self.current_step,
            self.next_action.as_str()
        )
    }
}
