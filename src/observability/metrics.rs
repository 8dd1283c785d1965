//! Metrics collection.
//!
//! # Metrics
//! - `authorizer_lock_wait_seconds` (histogram): time spent blocked in `acquire`
//! - `authorizer_signatures_total` (counter): signatures produced, by kind
//! - `authorizer_keyfile_operations_total` (counter): key file loads and
//!   generations, by outcome

use std::time::Instant;

/// Record how long a caller waited for a credential lock.
pub fn record_lock_wait(start: Instant) {
    ::metrics::histogram!("authorizer_lock_wait_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a successful signature of the given kind (`hash`, `message`, `transaction`).
pub fn record_signature(kind: &'static str) {
    ::metrics::counter!("authorizer_signatures_total", "kind" => kind).increment(1);
}

/// Record a key file operation (`load`, `generate`).
pub fn record_keyfile_operation(operation: &'static str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    ::metrics::counter!(
        "authorizer_keyfile_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}
