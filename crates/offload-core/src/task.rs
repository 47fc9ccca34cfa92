// Task and message types
//
// Two messages cross the boundary between the pool and a unit: one input,
// then at most one response. Both are plain serde types so any payload that
// round-trips through JSON can be offloaded.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{TaskError, UnitError};

/// Task identifier (UUID v7, ordered by creation time)
pub type TaskId = Uuid;

/// A single offload request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: TaskId,
    /// Name of the registered unit to run
    pub unit: String,
    pub input: Value,
}

impl Task {
    pub fn new(unit: impl Into<String>, input: Value) -> Self {
        Self {
            id: Uuid::now_v7(),
            unit: unit.into(),
            input,
        }
    }
}

/// Caller -> unit, sent exactly once right after spawn
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputMessage {
    pub task_id: TaskId,
    pub payload: Value,
}

/// Result of a task as carried on the wire
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Outcome {
    Success(Value),
    Failure(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Convert into the caller-facing result
    pub fn into_result(self) -> Result<Value, TaskError> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(reason) => Err(TaskError::UnitFailed(reason)),
        }
    }
}

impl From<Result<Value, UnitError>> for Outcome {
    fn from(result: Result<Value, UnitError>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(e) => Outcome::Failure(e.message),
        }
    }
}

/// Unit -> caller, sent at most once
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseMessage {
    pub task_id: TaskId,
    pub outcome: Outcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_ids_are_unique() {
        let a = Task::new("sqrt-sum", json!(1));
        let b = Task::new("sqrt-sum", json!(1));
        assert_ne!(a.id, b.id);
        assert_eq!(a.unit, "sqrt-sum");
    }

    #[test]
    fn test_outcome_wire_format() {
        let success = serde_json::to_value(Outcome::Success(json!(6.5))).unwrap();
        assert_eq!(success, json!({"status": "success", "value": 6.5}));

        let failure = serde_json::to_value(Outcome::Failure("boom".into())).unwrap();
        assert_eq!(failure, json!({"status": "failure", "value": "boom"}));
    }

    #[test]
    fn test_outcome_into_result() {
        assert_eq!(Outcome::Success(json!(1)).into_result(), Ok(json!(1)));
        assert_eq!(
            Outcome::Failure("bad".into()).into_result(),
            Err(TaskError::UnitFailed("bad".into()))
        );
    }

    #[test]
    fn test_outcome_from_unit_result() {
        let outcome: Outcome = Err::<Value, _>(UnitError::new("nope")).into();
        assert!(!outcome.is_success());
        let outcome: Outcome = Ok::<_, UnitError>(json!(2)).into();
        assert!(outcome.is_success());
    }
}
