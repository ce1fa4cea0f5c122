//! Store metrics for observability.
//!
//! Metrics are recorded through the [`metrics`] facade. Nothing is exported
//! unless the application installs a recorder; without one every call is a
//! no-op.
//!
//! # Example
//!
//! ```
//! use statestore_runtime::metrics::{describe_metrics, StoreMetrics};
//! use std::time::Duration;
//!
//! describe_metrics();
//! StoreMetrics::record_action(Duration::from_micros(3));
//! ```

use metrics::{describe_counter, describe_histogram};
use std::time::Duration;

// Re-export metrics macros for use in other modules
pub use metrics::{counter, histogram};

/// Register all metric descriptions with the installed recorder.
pub fn describe_metrics() {
    describe_counter!(
        "store_actions_processed_total",
        "Total number of actions applied to the store state"
    );
    describe_counter!(
        "store_actions_rejected_total",
        "Total number of actions rejected by the reducer or the store"
    );
    describe_counter!(
        "store_actions_queued_total",
        "Total number of actions queued by a dispatch issued during notification"
    );
    describe_counter!(
        "store_listeners_notified_total",
        "Total number of listener invocations"
    );
    describe_histogram!(
        "store_reducer_duration_seconds",
        "Time taken to run the root reducer"
    );
}

/// Store metrics recorder.
pub struct StoreMetrics;

impl StoreMetrics {
    /// Record an action applied to state.
    pub fn record_action(duration: Duration) {
        counter!("store_actions_processed_total").increment(1);
        histogram!("store_reducer_duration_seconds").record(duration.as_secs_f64());
    }

    /// Record a rejected action.
    pub fn record_rejection() {
        counter!("store_actions_rejected_total").increment(1);
    }

    /// Record an action queued behind an in-progress dispatch.
    pub fn record_queued() {
        counter!("store_actions_queued_total").increment(1);
    }

    /// Record a notification round.
    pub fn record_notified(listeners: usize) {
        counter!("store_listeners_notified_total").increment(listeners as u64);
    }
}
