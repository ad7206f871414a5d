//! Metric counters for store activity
//!
//! Uses the `metrics` facade; wiring an exporter is up to the host process.

use metrics::{counter, describe_counter};

/// Register metric descriptions. Safe to call more than once.
pub fn describe_metrics() {
    describe_counter!(
        "correlog_entries_inserted_total",
        "Total log entries inserted"
    );
    describe_counter!(
        "correlog_entries_deleted_total",
        "Total log entries deleted individually"
    );
    describe_counter!(
        "correlog_entries_cleaned_total",
        "Total log entries removed by retention cleanup"
    );
    describe_counter!(
        "correlog_record_failures_total",
        "Log entries dropped because the store was unavailable"
    );
}

pub fn record_insert(operation_type: &str, severity: &str) {
    counter!(
        "correlog_entries_inserted_total",
        "operation_type" => operation_type.to_string(),
        "severity" => severity.to_string(),
    )
    .increment(1);
}

pub fn record_delete(count: u64) {
    counter!("correlog_entries_deleted_total").increment(count);
}

pub fn record_cleanup(count: u64) {
    counter!("correlog_entries_cleaned_total").increment(count);
}

pub fn record_dropped_entry() {
    counter!("correlog_record_failures_total").increment(1);
}
