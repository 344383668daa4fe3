//! The error taxonomy the orchestrator pattern-matches on to decide
//! between local recovery and task termination.

use thiserror::Error;

use crate::geometry::Point;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("no path found from {from:?} towards {to:?}")]
    Planning { from: Point, to: Point },

    #[error("loop signature detected, forcing escape turn")]
    LoopDetected,

    #[error("transport closed or returned no message")]
    Transport,

    #[error("coverage/time budget exceeded")]
    BudgetExceeded,

    #[error("sensor read returned no data")]
    SensorUnavailable,
}

impl CoreError {
    /// Whether this error should terminate the orchestrator task, per
    /// spec.md's propagation policy: only `Transport` crosses that
    /// boundary, everything else is local and recoverable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CoreError::Transport)
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_is_fatal() {
        assert!(CoreError::Transport.is_fatal());
        assert!(!CoreError::LoopDetected.is_fatal());
        assert!(!CoreError::BudgetExceeded.is_fatal());
        assert!(!CoreError::SensorUnavailable.is_fatal());
        assert!(!CoreError::Validation("x".into()).is_fatal());
        assert!(
            !CoreError::Planning {
                from: Point::new(0, 0),
                to: Point::new(1, 1),
            }
            .is_fatal()
        );
    }
}
