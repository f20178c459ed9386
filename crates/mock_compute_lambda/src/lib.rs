//! Lambda-oriented adapters and handlers for the mock compute worker.
//!
//! This crate owns runtime integration details (the Lambda handler, the
//! interruptible suspension adapter and environment configuration). Contract
//! and workload primitives live in `mock_compute_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod logging;
