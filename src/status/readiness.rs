//! Readiness verdict derived from authentication and configuration state

use super::snapshot::{AuthStatus, ConfigStatus};

pub const AUTH_REQUIRED_REASON: &str = "ROSA staging authentication required";
pub const CONFIG_INCOMPLETE_REASON: &str = "Configuration incomplete";

/// Whether automation may proceed, and why not if it may not
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessVerdict {
    pub ready: bool,
    pub blocking_reason: Option<String>,
}

impl ReadinessVerdict {
    pub fn ready() -> Self {
        Self {
            ready: true,
            blocking_reason: None,
        }
    }

    pub fn blocked(reason: impl Into<String>) -> Self {
        Self {
            ready: false,
            blocking_reason: Some(reason.into()),
        }
    }

    /// Compute the verdict
    ///
    /// Authentication is checked first and short-circuits. Connection state
    /// is deliberately not an input.
    pub fn evaluate(auth: &AuthStatus, config: &ConfigStatus) -> Self {
        if !auth.authenticated {
            Self::blocked(AUTH_REQUIRED_REASON)
        } else if !config.is_configured() {
            Self::blocked(CONFIG_INCOMPLETE_REASON)
        } else {
            Self::ready()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::snapshot::{ConfiguredField, REQUIRED_CONFIG_FIELDS};

    fn configured() -> ConfigStatus {
        ConfigStatus::from_fields(
            REQUIRED_CONFIG_FIELDS
                .iter()
                .map(|f| ConfiguredField::new(*f, "x"))
                .collect(),
        )
    }

    fn authenticated(value: bool) -> AuthStatus {
        AuthStatus {
            authenticated: value,
            ..AuthStatus::default()
        }
    }

    #[test]
    fn test_auth_checked_first() {
        let verdict = ReadinessVerdict::evaluate(&authenticated(false), &ConfigStatus::default());
        assert_eq!(verdict, ReadinessVerdict::blocked(AUTH_REQUIRED_REASON));
    }

    #[test]
    fn test_config_incomplete() {
        let verdict = ReadinessVerdict::evaluate(&authenticated(true), &ConfigStatus::default());
        assert!(!verdict.ready);
        assert_eq!(verdict.blocking_reason.as_deref(), Some(CONFIG_INCOMPLETE_REASON));
    }

    #[test]
    fn test_ready() {
        let verdict = ReadinessVerdict::evaluate(&authenticated(true), &configured());
        assert!(verdict.ready);
        assert!(verdict.blocking_reason.is_none());
    }
}
