//! Scheduler-facing metrics operations.

use std::time::Duration;

/// Sink consuming per-publish outcomes and per-batch throughput samples.
///
/// One sink instance is shared between the publish loop and the uptime task,
/// so implementations must tolerate concurrent access. Methods default to
/// no-ops so that test doubles only override what they assert on.
#[allow(unused_variables)]
pub trait MetricsSink: Send + Sync {
    /// Record one successfully published message and its sizes in bytes.
    fn inc_sent(&self, payload_bytes: usize, topic_bytes: usize) {}

    /// Record one failed publish attempt.
    fn inc_error(&self) {}

    /// Record the round-trip latency of one successful publish.
    fn observe_latency(&self, latency: Duration) {}

    /// Push the most recent per-batch throughput observation.
    fn set_throughput(&self, msgs_per_second: f64) {}

    /// Number of successful publishes so far.
    fn sent_count(&self) -> u64 {
        0
    }

    /// Number of failed publish attempts so far.
    fn error_count(&self) -> u64 {
        0
    }
}
