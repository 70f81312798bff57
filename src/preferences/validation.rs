//! Input validation for user-supplied preference values
//!
//! Setters on the preference store only accept these validated types, so
//! unvalidated input can never be persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a cluster name prefix
pub const MAX_PREFIX_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("prefix must not be empty")]
    EmptyPrefix,

    #[error("prefix '{0}' is longer than 4 characters")]
    PrefixTooLong(String),

    #[error("prefix '{0}' must be lowercase letters and digits, starting with a letter")]
    PrefixCharset(String),

    #[error("'{0}' is not a valid subnet id (expected subnet-<hex>)")]
    SubnetId(String),

    #[error("public and private subnet must differ")]
    SubnetPairSame,

    #[error("invalid OIDC config URL '{url}': {reason}")]
    OidcUrl { url: String, reason: String },
}

/// Cluster name prefix of at most [`MAX_PREFIX_LEN`] characters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClusterPrefix(String);

impl ClusterPrefix {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let value = input.trim();
        if value.is_empty() {
            return Err(ValidationError::EmptyPrefix);
        }
        if value.chars().count() > MAX_PREFIX_LEN {
            return Err(ValidationError::PrefixTooLong(value.to_string()));
        }

        let mut chars = value.chars();
        let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_lowercase());
        let rest_valid = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
        if !starts_with_letter || !rest_valid {
            return Err(ValidationError::PrefixCharset(value.to_string()));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClusterPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validate an AWS subnet id (`subnet-` followed by hex digits)
pub fn validate_subnet_id(input: &str) -> Result<String, ValidationError> {
    let value = input.trim();
    let valid = value
        .strip_prefix("subnet-")
        .is_some_and(|hex| !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()));
    if valid {
        Ok(value.to_ascii_lowercase())
    } else {
        Err(ValidationError::SubnetId(value.to_string()))
    }
}

/// Public/private subnet pair for ROSA network provisioning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetPair {
    pub public_subnet: String,
    pub private_subnet: String,
}

impl SubnetPair {
    pub fn parse(public: &str, private: &str) -> Result<Self, ValidationError> {
        let public_subnet = validate_subnet_id(public)?;
        let private_subnet = validate_subnet_id(private)?;
        if public_subnet == private_subnet {
            return Err(ValidationError::SubnetPairSame);
        }
        Ok(Self {
            public_subnet,
            private_subnet,
        })
    }

    /// Re-validate a pair loaded from storage
    pub fn validated(self) -> Result<Self, ValidationError> {
        Self::parse(&self.public_subnet, &self.private_subnet)
    }
}

/// Absolute https URL of an OIDC configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OidcConfigUrl(String);

impl OidcConfigUrl {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let value = input.trim();
        let invalid = |reason: &str| ValidationError::OidcUrl {
            url: value.to_string(),
            reason: reason.to_string(),
        };

        let url = url::Url::parse(value).map_err(|e| invalid(&e.to_string()))?;
        if url.scheme() != "https" {
            return Err(invalid("scheme must be https"));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host"));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
