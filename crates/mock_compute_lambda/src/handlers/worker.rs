use std::time::{Duration, Instant};

use mock_compute_core::contract::{parse_worker_event, ComputeStatus, WorkerResponse};
use mock_compute_core::counter::InvocationCounter;
use mock_compute_core::workload::{plan_workload, run_compute_workload, Workload};
use serde_json::{json, Value};

use crate::adapters::suspend::Suspender;
use crate::config::WorkerConfig;
use crate::logging::{log_error, log_info};

const COMPONENT: &str = "worker_handler";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerHandlerConfig {
    pub log_event: bool,
}

impl Default for WorkerHandlerConfig {
    fn default() -> Self {
        Self { log_event: true }
    }
}

/// Per-invocation facts supplied by the hosting runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationContext {
    pub request_id: String,
    pub budget: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerHandlerError {
    pub message: String,
}

/// Handles one invocation.
///
/// Malformed events are returned as errors. An interrupted suspension is not
/// an error: it produces a `Failure` response.
pub fn handle_worker_event(
    event: Value,
    config: &WorkerHandlerConfig,
    invocation: &InvocationContext,
    counter: &InvocationCounter,
    suspender: &impl Suspender,
) -> Result<WorkerResponse, WorkerHandlerError> {
    let started_at = Instant::now();
    let event_details = if config.log_event {
        event.clone()
    } else {
        Value::Null
    };
    log_info(
        COMPONENT,
        "invocation_received",
        json!({
            "request_id": invocation.request_id.clone(),
            "budget_ms": invocation.budget.map(|budget| budget.as_millis()),
            "event": event_details,
        }),
    );

    let worker_event = parse_worker_event(event).map_err(|error| WorkerHandlerError {
        message: format!("invalid worker event: {error}"),
    })?;
    let workload = plan_workload(&worker_event).map_err(|error| WorkerHandlerError {
        message: format!("invalid worker arguments: {error}"),
    })?;

    let (result, check) = match workload {
        Workload::Sleep { duration_ms } => {
            let duration = Duration::from_millis(duration_ms);
            match suspender.suspend(duration, invocation.budget) {
                Ok(()) => {
                    counter.record();
                    (ComputeStatus::Success, duration_ms.to_string())
                }
                Err(interruption) => {
                    log_error(
                        COMPONENT,
                        "invocation_interrupted",
                        json!({
                            "request_id": invocation.request_id.clone(),
                            "requested_ms": duration_ms,
                            "elapsed_ms": started_at.elapsed().as_millis(),
                            "reason": interruption.to_string(),
                        }),
                    );
                    (ComputeStatus::Failure, duration_ms.to_string())
                }
            }
        }
        Workload::Compute {
            ram_limit_gb,
            iter_limit_millions,
        } => {
            let value = run_compute_workload(ram_limit_gb, iter_limit_millions);
            counter.record();
            (ComputeStatus::Success, value.to_string())
        }
    };

    let response = WorkerResponse::new(result, started_at.elapsed(), check);
    log_info(
        COMPONENT,
        "invocation_completed",
        json!({
            "request_id": invocation.request_id.clone(),
            "result": result.as_str(),
            "workload": workload,
            "compute_time_ms": response.compute_time_ms.clone(),
            "invocation_count": counter.current(),
        }),
    );
    Ok(response)
}

/// Sleep budget for one invocation: the real time left before the deadline.
///
/// `None` when deadline enforcement is off or the runtime reported no
/// deadline (zero).
pub fn invocation_budget(
    config: &WorkerConfig,
    deadline_epoch_ms: u64,
    now_epoch_ms: i64,
) -> Option<Duration> {
    if !config.enforce_deadline {
        return None;
    }
    remaining_budget(deadline_epoch_ms, now_epoch_ms)
}

pub fn remaining_budget(deadline_epoch_ms: u64, now_epoch_ms: i64) -> Option<Duration> {
    if deadline_epoch_ms == 0 {
        return None;
    }
    let now_epoch_ms = u64::try_from(now_epoch_ms).unwrap_or(0);
    Some(Duration::from_millis(
        deadline_epoch_ms.saturating_sub(now_epoch_ms),
    ))
}
