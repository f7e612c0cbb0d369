//! Burst pacing: back-to-back batches separated by a fixed sleep.

use std::sync::Arc;
use std::time::Duration;

use bench_generator::Message;
use bench_metrics::MetricsSink;
use tokio::time::Instant;
use tracing::info;

use super::executor::PublishExecutor;

/// Elapsed times at or below this threshold are treated as too small to
/// produce a meaningful throughput sample.
const MIN_BURST_ELAPSED_SEC: f64 = 0.001;

/// Publishes bursts of `burst_size` messages with nothing but executor
/// latency between the messages of one burst, then sleeps
/// `burst_interval_ms` before the next burst. The sleep never follows the
/// final burst.
pub struct BurstPacer {
    burst_size: usize,
    burst_interval: Duration,
    metrics: Arc<dyn MetricsSink>,
}

impl BurstPacer {
    pub fn new(burst_size: usize, burst_interval_ms: u64, metrics: Arc<dyn MetricsSink>) -> Self {
        Self {
            burst_size: burst_size.max(1),
            burst_interval: Duration::from_millis(burst_interval_ms),
            metrics,
        }
    }

    /// Publish every message in bursts, in sequence order.
    pub async fn run(&self, executor: &mut PublishExecutor, messages: &[Message]) {
        let mut sent = 0;

        while sent < messages.len() {
            let batch_start = Instant::now();
            let end_idx = (sent + self.burst_size).min(messages.len());

            for message in &messages[sent..end_idx] {
                executor.publish(message).await;
            }
            let batch_size = end_idx - sent;
            sent = end_idx;

            // The configured burst size is the throughput numerator even for
            // the clipped final burst, matching the per-burst target.
            let elapsed = batch_start.elapsed().as_secs_f64();
            if elapsed > MIN_BURST_ELAPSED_SEC {
                self.metrics
                    .set_throughput(self.burst_size as f64 / elapsed);
            }

            info!("Published burst of {} messages", batch_size);
            if sent < messages.len() {
                tokio::time::sleep(self.burst_interval).await;
            }
        }
    }
}
