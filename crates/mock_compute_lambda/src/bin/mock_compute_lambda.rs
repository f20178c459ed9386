use std::sync::Arc;

use chrono::Utc;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use mock_compute_core::contract::WorkerResponse;
use mock_compute_core::counter::InvocationCounter;
use mock_compute_lambda::adapters::suspend::InterruptibleSleeper;
use mock_compute_lambda::config::WorkerConfig;
use mock_compute_lambda::handlers::worker::{
    handle_worker_event, invocation_budget, InvocationContext,
};
use mock_compute_lambda::logging::log_info;
use serde_json::{json, Value};

struct WorkerRuntime {
    config: WorkerConfig,
    counter: InvocationCounter,
    sleeper: InterruptibleSleeper,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    runtime: Arc<WorkerRuntime>,
) -> Result<WorkerResponse, Error> {
    let LambdaEvent { payload, context } = event;

    let invocation = InvocationContext {
        request_id: context.request_id,
        budget: invocation_budget(
            &runtime.config,
            context.deadline,
            Utc::now().timestamp_millis(),
        ),
    };
    let handler_config = runtime.config.handler_config();

    let outcome = tokio::task::spawn_blocking(move || {
        handle_worker_event(
            payload,
            &handler_config,
            &invocation,
            &runtime.counter,
            &runtime.sleeper,
        )
    })
    .await
    .map_err(|error| Error::from(format!("worker handler task failed: {error}")))?;

    outcome.map_err(|error| Error::from(error.message))
}

/// Wakes suspensions in flight when SIGTERM arrives so their `Failure`
/// response is posted before the host kills the process. Later invocations
/// run normally; exiting is left to the host.
#[cfg(unix)]
fn spawn_shutdown_listener(runtime: Arc<WorkerRuntime>) -> Result<(), Error> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::spawn(async move {
        while terminate.recv().await.is_some() {
            log_info(
                "worker_runtime",
                "shutdown_signal_received",
                json!({ "invocation_count": runtime.counter.current() }),
            );
            runtime.sleeper.interrupt();
        }
    });
    Ok(())
}

#[cfg(not(unix))]
fn spawn_shutdown_listener(_runtime: Arc<WorkerRuntime>) -> Result<(), Error> {
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = WorkerConfig::from_env().map_err(Error::from)?;
    log_info(
        "worker_runtime",
        "runtime_started",
        json!({
            "enforce_deadline": config.enforce_deadline,
            "log_event": config.log_event,
        }),
    );

    let runtime = Arc::new(WorkerRuntime {
        config,
        counter: InvocationCounter::new(),
        sleeper: InterruptibleSleeper::new(),
    });
    spawn_shutdown_listener(Arc::clone(&runtime))?;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        handle_request(event, Arc::clone(&runtime))
    }))
    .await
}
