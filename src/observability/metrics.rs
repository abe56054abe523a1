//! Configuration metrics.
//!
//! # Metrics
//! - `config_reloads_total` (counter): successful reloads by trigger
//! - `config_reload_failures_total` (counter): failed reloads by trigger
//! - `config_mutations_total` (counter): programmatic changes by operation
//! - `config_properties` (gauge): keys in the live snapshot
//!
//! Recorded through the `metrics` facade; without an installed recorder
//! every call is a no-op.

use metrics::{counter, gauge};

pub fn record_reload(trigger: &'static str) {
    counter!("config_reloads_total", "trigger" => trigger).increment(1);
}

pub fn record_reload_failure(trigger: &'static str) {
    counter!("config_reload_failures_total", "trigger" => trigger).increment(1);
}

pub fn record_mutation(op: &'static str) {
    counter!("config_mutations_total", "op" => op).increment(1);
}

pub fn record_property_count(count: usize) {
    gauge!("config_properties").set(count as f64);
}
