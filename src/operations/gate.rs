//! Gating of operations against the readiness verdict

use super::Operation;
use crate::status::ReadinessVerdict;

/// Outcome of gating one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Block(String),
    /// Destructive operation; the caller must obtain explicit confirmation
    RequiresConfirmation,
}

pub struct OperationGate;

impl OperationGate {
    /// Decide whether `op` may start
    ///
    /// Readiness is checked before destructiveness, so a blocked console
    /// blocks destructive operations too.
    pub fn evaluate(op: &Operation, readiness: &ReadinessVerdict) -> Decision {
        if !readiness.ready {
            let reason = readiness
                .blocking_reason
                .clone()
                .unwrap_or_else(|| "Automation is not ready".to_string());
            tracing::debug!("Blocking {}: {}", op.id, reason);
            return Decision::Block(reason);
        }

        if op.is_destructive() {
            Decision::RequiresConfirmation
        } else {
            Decision::Allow
        }
    }
}
