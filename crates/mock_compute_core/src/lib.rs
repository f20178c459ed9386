//! Shared mock compute worker primitives.
//!
//! This crate owns the invocation contract, workload planning and the
//! synthetic computation. It intentionally excludes Lambda runtime and tokio
//! concerns so the handler logic can be exercised without a runtime.

pub mod contract;
pub mod counter;
pub mod workload;
