//! Metric names and descriptions for the Store runtime.
//!
//! The runtime records through the [`metrics`] facade only. Whether anything
//! is collected depends on the recorder the host application installs; with
//! no recorder every call is a no-op.
//!
//! # Example
//!
//! ```rust
//! use tablekeeper_runtime::metrics::{register_metrics, STORE_COMMANDS_TOTAL};
//!
//! register_metrics();
//! assert_eq!(STORE_COMMANDS_TOTAL, "store.commands.total");
//! ```

use metrics::{describe_counter, describe_histogram};

// Re-export metrics macros for use in other modules
pub use metrics::{counter, histogram};

/// Actions accepted by `Store::send`
pub const STORE_COMMANDS_TOTAL: &str = "store.commands.total";
/// Effects started, labelled by `type`
pub const STORE_EFFECTS_EXECUTED: &str = "store.effects.executed";
/// Registered work aborted by `Effect::Cancel`, replacement or shutdown
pub const STORE_TIMERS_CANCELLED: &str = "store.timers.cancelled";
/// Time spent inside the reducer
pub const STORE_REDUCER_DURATION: &str = "store.reducer.duration_seconds";
/// Shutdowns started
pub const STORE_SHUTDOWN_INITIATED: &str = "store.shutdown.initiated";
/// Shutdowns that drained every effect in time
pub const STORE_SHUTDOWN_COMPLETED: &str = "store.shutdown.completed";
/// Shutdowns that gave up waiting
pub const STORE_SHUTDOWN_TIMEOUT: &str = "store.shutdown.timeout";
/// Actions refused because the store was shutting down
pub const STORE_SHUTDOWN_REJECTED: &str = "store.shutdown.rejected_actions";

/// Register all metric descriptions.
///
/// Call once after installing a recorder so exporters can show help text.
pub fn register_metrics() {
    describe_counter!(
        STORE_COMMANDS_TOTAL,
        "Total number of actions processed by the store"
    );
    describe_counter!(
        STORE_EFFECTS_EXECUTED,
        "Total number of effects executed, by effect type"
    );
    describe_counter!(
        STORE_TIMERS_CANCELLED,
        "Total number of registered timers aborted before completion"
    );
    describe_histogram!(
        STORE_REDUCER_DURATION,
        "Time taken to execute the reducer for one action"
    );
    describe_counter!(STORE_SHUTDOWN_INITIATED, "Total number of shutdowns started");
    describe_counter!(
        STORE_SHUTDOWN_COMPLETED,
        "Total number of shutdowns that completed within their timeout"
    );
    describe_counter!(
        STORE_SHUTDOWN_TIMEOUT,
        "Total number of shutdowns that timed out with effects still running"
    );
    describe_counter!(
        STORE_SHUTDOWN_REJECTED,
        "Total number of actions rejected during shutdown"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_without_recorder_is_noop() {
        register_metrics();
        counter!(STORE_COMMANDS_TOTAL).increment(1);
    }
}
