//! Readiness status
//!
//! Four independent sources (authentication, configuration, hub connection,
//! guided setup) are fetched concurrently and reduced to a single readiness
//! verdict.

mod aggregator;
mod readiness;
mod snapshot;

pub use aggregator::{StatusAggregator, StatusSnapshots};
pub use readiness::{AUTH_REQUIRED_REASON, CONFIG_INCOMPLETE_REASON, ReadinessVerdict};
pub use snapshot::{
    AuthStatus, ConfigStatus, ConfiguredField, ConnectionStatus, NextAction,
    REQUIRED_CONFIG_FIELDS, SetupStatus, Snapshot, SourceId, SourceStatus,
};
