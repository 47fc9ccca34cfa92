// Error types for task offloading

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Result type alias for offload operations
pub type Result<T> = std::result::Result<T, TaskError>;

/// Errors that can occur while dispatching or awaiting a task
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskError {
    /// No unit is registered under the requested name
    #[error("Unknown computation unit: '{0}'")]
    UnknownUnit(String),

    /// Input could not be serialized or does not match the unit's input type
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Too many tasks are already waiting for a slot
    #[error("Worker pool saturated: {queued} tasks already waiting")]
    PoolSaturated { queued: usize },

    /// The execution context could not be started
    #[error("Failed to start computation unit: {0}")]
    SpawnFailed(String),

    /// The unit reported a failure
    #[error("Computation unit failed: {0}")]
    UnitFailed(String),

    /// The unit went away without sending a response
    #[error("Computation unit terminated without producing a result")]
    NoResult,

    /// No response arrived within the configured bound
    #[error("Computation unit did not respond within {0:?}")]
    TimedOut(Duration),

    /// The response could not be decoded into the expected output type
    #[error("Invalid output: {0}")]
    InvalidOutput(String),

    /// A message broke the single-shot protocol
    #[error("Protocol violation: {0}")]
    Protocol(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TaskError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        TaskError::InvalidInput(msg.into())
    }

    /// Create a unit failure error
    pub fn unit_failed(msg: impl Into<String>) -> Self {
        TaskError::UnitFailed(msg.into())
    }

    /// Create a protocol violation error
    pub fn protocol(msg: impl Into<String>) -> Self {
        TaskError::Protocol(msg.into())
    }

    /// True for errors raised synchronously at dispatch, before anything is spawned
    pub fn is_rejected_at_dispatch(&self) -> bool {
        matches!(
            self,
            TaskError::UnknownUnit(_) | TaskError::InvalidInput(_) | TaskError::PoolSaturated { .. }
        )
    }

    /// True for errors caused by the caller's input
    pub fn is_validation(&self) -> bool {
        matches!(self, TaskError::InvalidInput(_))
    }
}

/// Failure reported by a computation unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Error)]
#[error("{message}")]
pub struct UnitError {
    /// Error message
    pub message: String,
}

impl UnitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for UnitError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}
