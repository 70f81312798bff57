//! ROSA operator console core
//!
//! Aggregates readiness status from the automation backend, gates and runs
//! operations against it, and keeps transient notifications and persisted
//! preferences. The `rosa-console` binary is a thin CLI over [`Console`].

pub mod backend;
pub mod cli;
pub mod config;
pub mod console;
pub mod notify;
pub mod operations;
pub mod preferences;
pub mod scheduler;
pub mod status;
pub mod storage;

// Re-export commonly used types for convenience
pub use console::{Console, ConsoleSettings, DispatchOptions, DispatchOutcome};
pub use notify::{Notification, NotificationCenter, NotificationKind};
pub use operations::{Decision, ExecutionResult, Operation, OperationCatalog};
pub use status::{ReadinessVerdict, StatusAggregator};
