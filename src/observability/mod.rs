//! Observability.
//!
//! - logging.rs: subscriber setup for binaries
//! - metrics.rs: reload and mutation counters

pub mod logging;
pub mod metrics;
