//! Workload planning for a single invocation.
//!
//! `worker_arguments` follows the mock engine command line:
//! `<forced_delay_ms> [ram_limit_gb] [iter_limit_millions]`. A non-negative
//! delay means "sleep for that long"; a negative delay switches to the
//! synthetic computation bounded by the remaining two arguments.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::contract::{ValidationError, WorkerEvent};

const BYTES_PER_GB: u64 = 1_000_000_000;
const ITERATIONS_PER_MILLION: u64 = 1_000_000;
const VALUE_MODULUS: i64 = 1_000_000_000;

/// Compute mode runs to completion and ignores interrupts, so its inputs are
/// capped: at most 8 GB of ring and 1e9 iterations.
pub const MAX_RAM_LIMIT_GB: u64 = 8;
pub const MAX_ITER_LIMIT_MILLIONS: u64 = 1_000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Workload {
    Sleep {
        duration_ms: u64,
    },
    Compute {
        ram_limit_gb: u64,
        iter_limit_millions: u64,
    },
}

impl Workload {
    pub fn sleep_duration(&self) -> Option<Duration> {
        match self {
            Self::Sleep { duration_ms } => Some(Duration::from_millis(*duration_ms)),
            Self::Compute { .. } => None,
        }
    }
}

pub fn plan_workload(event: &WorkerEvent) -> Result<Workload, ValidationError> {
    let Some(raw_delay) = event.argument(0) else {
        return Err(ValidationError::new("Forced delay argument is required"));
    };
    let forced_delay_ms = raw_delay.parse::<i64>().map_err(|_| {
        ValidationError::new(format!(
            "Forced delay '{raw_delay}' must be an integer number of milliseconds"
        ))
    })?;

    if let Ok(duration_ms) = u64::try_from(forced_delay_ms) {
        return Ok(Workload::Sleep { duration_ms });
    }

    let ram_limit_gb = required_u64(event, 1, "ram_limit_gb")?;
    if ram_limit_gb == 0 {
        return Err(ValidationError::new(
            "ram_limit_gb must be a positive integer",
        ));
    }
    if ram_limit_gb > MAX_RAM_LIMIT_GB {
        return Err(ValidationError::new(format!(
            "ram_limit_gb must be at most {MAX_RAM_LIMIT_GB}"
        )));
    }
    let iter_limit_millions = required_u64(event, 2, "iter_limit_millions")?;
    if iter_limit_millions > MAX_ITER_LIMIT_MILLIONS {
        return Err(ValidationError::new(format!(
            "iter_limit_millions must be at most {MAX_ITER_LIMIT_MILLIONS}"
        )));
    }

    Ok(Workload::Compute {
        ram_limit_gb,
        iter_limit_millions,
    })
}

fn required_u64(event: &WorkerEvent, index: usize, name: &str) -> Result<u64, ValidationError> {
    let Some(raw) = event.argument(index) else {
        return Err(ValidationError::new(format!(
            "Argument {index} ({name}) is required when the forced delay is negative"
        )));
    };
    raw.parse::<u64>().map_err(|_| {
        ValidationError::new(format!(
            "Argument {index} ({name}) must be a non-negative integer, got '{raw}'"
        ))
    })
}

/// Runs the compute-mode workload described by the mock engine arguments.
pub fn run_compute_workload(ram_limit_gb: u64, iter_limit_millions: u64) -> i64 {
    let slots = ram_limit_gb.saturating_mul(BYTES_PER_GB) / std::mem::size_of::<i64>() as u64;
    let ring_capacity = usize::try_from(slots).unwrap_or(usize::MAX).max(1);
    let iterations = iter_limit_millions.saturating_mul(ITERATIONS_PER_MILLION);
    run_synthetic_computation(ring_capacity, iterations)
}

/// Fibonacci sequence modulo 1e9 kept in a ring of `ring_capacity` slots.
///
/// Memory grows with `min(ring_capacity, iterations)`, CPU with `iterations`.
/// Returns 123 when fewer than three iterations are requested.
pub fn run_synthetic_computation(ring_capacity: usize, iterations: u64) -> i64 {
    let capacity = ring_capacity.max(1) as u64;
    let mut ring: Vec<i64> = vec![0, 1];

    let mut value = 123;
    for i in 2..iterations {
        let first = ((i - 2) % capacity) as usize;
        let second = ((i - 1) % capacity) as usize;
        value = (ring[first] + ring[second]) % VALUE_MODULUS;
        if i < capacity {
            ring.push(value);
        } else {
            ring[(i % capacity) as usize] = value;
        }
    }

    value
}
