//! Console operations
//!
//! Descriptors for user-triggered operations, the readiness gate that decides
//! whether one may start, and the executor that runs it.

pub mod catalog;
mod descriptor;
pub mod executor;
mod gate;
pub mod output;

pub use catalog::OperationCatalog;
pub use descriptor::{DESTRUCTIVE_KEYWORDS, Operation, TaskRequest, is_destructive_title};
pub use executor::{ExecutionError, ExecutionResult, LoadingGuard, OperationExecutor, RunOptions};
pub use gate::{Decision, OperationGate};
pub use output::{ComponentHealth, interpret};
