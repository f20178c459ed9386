use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const WORKER_ARGUMENTS_KEY: &str = "worker_arguments";

/// A single entry of `worker_arguments`.
///
/// Clients split a command line on whitespace and send strings, but JSON
/// integers are accepted too and treated as their decimal text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum WorkerArgument {
    Text(String),
    Integer(i64),
}

impl WorkerArgument {
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Integer(value) => value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkerEvent {
    pub worker_arguments: Vec<WorkerArgument>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl WorkerEvent {
    pub fn argument(&self, index: usize) -> Option<String> {
        self.worker_arguments.get(index).map(WorkerArgument::as_text)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ComputeStatus {
    Success,
    Failure,
}

impl ComputeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Failure => "Failure",
        }
    }
}

/// Response returned to the grid agent. Every value is a string on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkerResponse {
    pub result: ComputeStatus,
    pub compute_time_ms: String,
    pub check: String,
}

impl WorkerResponse {
    pub fn new(result: ComputeStatus, compute_time: Duration, check: impl ToString) -> Self {
        Self {
            result,
            compute_time_ms: compute_time.as_millis().to_string(),
            check: check.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn parse_worker_event(event: Value) -> Result<WorkerEvent, ValidationError> {
    let Some(object) = event.as_object() else {
        return Err(ValidationError::new("Worker event must be a JSON object"));
    };

    match object.get(WORKER_ARGUMENTS_KEY) {
        None => {
            return Err(ValidationError::new(format!(
                "Worker event is missing '{WORKER_ARGUMENTS_KEY}'"
            )));
        }
        Some(Value::Array(values)) if values.is_empty() => {
            return Err(ValidationError::new(format!(
                "'{WORKER_ARGUMENTS_KEY}' must contain at least one argument"
            )));
        }
        Some(Value::Array(_)) => {}
        Some(_) => {
            return Err(ValidationError::new(format!(
                "'{WORKER_ARGUMENTS_KEY}' must be a list"
            )));
        }
    }

    serde_json::from_value(event)
        .map_err(|error| ValidationError::new(format!("Malformed worker event: {error}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_string_and_integer_arguments() {
        let event = parse_worker_event(json!({
            "worker_arguments": ["1000", 1, " 2 "],
            "task_id": "task-7",
        }))
        .expect("event should parse");

        assert_eq!(event.argument(0).as_deref(), Some("1000"));
        assert_eq!(event.argument(1).as_deref(), Some("1"));
        assert_eq!(event.argument(2).as_deref(), Some(" 2 "));
        assert_eq!(event.argument(3), None);
        assert_eq!(event.extra.get("task_id"), Some(&json!("task-7")));
    }

    #[test]
    fn rejects_missing_worker_arguments() {
        let error = parse_worker_event(json!({"task_id": "task-7"}))
            .expect_err("missing arguments should fail");
        assert_eq!(error.message(), "Worker event is missing 'worker_arguments'");
    }

    #[test]
    fn rejects_empty_or_non_list_arguments() {
        let empty = parse_worker_event(json!({"worker_arguments": []}))
            .expect_err("empty arguments should fail");
        assert!(empty.message().contains("at least one argument"));

        let scalar = parse_worker_event(json!({"worker_arguments": "1000"}))
            .expect_err("scalar arguments should fail");
        assert!(scalar.message().contains("must be a list"));

        let not_object =
            parse_worker_event(json!(["1000"])).expect_err("array event should fail");
        assert_eq!(not_object.message(), "Worker event must be a JSON object");
    }

    #[test]
    fn rejects_arguments_of_unsupported_type() {
        let error = parse_worker_event(json!({"worker_arguments": [{"ms": 5}]}))
            .expect_err("object argument should fail");
        assert!(error.message().starts_with("Malformed worker event"));
    }

    #[test]
    fn response_serializes_every_field_as_string() {
        let response =
            WorkerResponse::new(ComputeStatus::Success, Duration::from_millis(1_203), 1_200u64);
        let value = serde_json::to_value(&response).expect("response should serialize");

        assert_eq!(
            value,
            json!({
                "result": "Success",
                "compute_time_ms": "1203",
                "check": "1200",
            })
        );
    }
}
