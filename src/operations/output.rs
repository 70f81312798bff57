//! Interpretation of task results into component health
//!
//! Tasks that report a structured `result_code` are mapped directly. Older
//! playbooks only print free text, so a substring fallback scans the
//! captured output. The marker lists are a boundary adapter and will go away
//! once every task emits a result code.

use super::ExecutionResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentHealth {
    Healthy,
    Degraded,
    NotInstalled,
    Unknown,
}

impl ComponentHealth {
    /// Map a structured result code
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "healthy" | "ok" | "ready" => Some(ComponentHealth::Healthy),
            "degraded" | "disabled" => Some(ComponentHealth::Degraded),
            "not_installed" | "missing" => Some(ComponentHealth::NotInstalled),
            "unknown" => Some(ComponentHealth::Unknown),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentHealth::Healthy => "healthy",
            ComponentHealth::Degraded => "degraded",
            ComponentHealth::NotInstalled => "not installed",
            ComponentHealth::Unknown => "unknown",
        }
    }
}

const NOT_INSTALLED_MARKERS: [&str; 3] = ["no clue", "not installed", "could not find"];
const DEGRADED_MARKERS: [&str; 2] = ["disabled", "not enabled"];
const HEALTHY_MARKERS: [&str; 2] = ["you're all set", "all components are enabled"];

/// Derive component health from a run's result
pub fn interpret(result: &ExecutionResult) -> ComponentHealth {
    if let Some(health) = result.result_code.as_deref().and_then(ComponentHealth::from_code) {
        return health;
    }

    if result.timed_out {
        return ComponentHealth::Unknown;
    }

    let output = result.output.as_deref().unwrap_or_default().to_lowercase();
    let contains_any = |markers: &[&str]| markers.iter().any(|m| output.contains(m));

    if contains_any(&NOT_INSTALLED_MARKERS) {
        ComponentHealth::NotInstalled
    } else if contains_any(&DEGRADED_MARKERS) || !result.success {
        ComponentHealth::Degraded
    } else if contains_any(&HEALTHY_MARKERS) {
        ComponentHealth::Healthy
    } else {
        ComponentHealth::Unknown
    }
}
