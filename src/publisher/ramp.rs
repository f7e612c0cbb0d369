//! Ramp-up pacing: batch size follows a linearly interpolated target rate.

use std::sync::Arc;
use std::time::Duration;

use bench_generator::Message;
use bench_metrics::MetricsSink;
use tokio::time::Instant;
use tracing::info;

use super::executor::PublishExecutor;

/// Publishes batches whose size equals a target rate interpolated linearly
/// from `start_rate` to `end_rate` over `ramp_duration_sec`, then pinned at
/// `end_rate`.
///
/// After each batch the pacer sleeps off any positive drift: the difference
/// between the time the batch should have taken at the target rate and the
/// time it actually took. Running behind schedule is never compensated;
/// there is no catch-up.
pub struct RampPacer {
    start_rate: usize,
    end_rate: usize,
    ramp_duration: Duration,
    total_signals: usize,
    metrics: Arc<dyn MetricsSink>,
}

impl RampPacer {
    pub fn new(
        start_rate: usize,
        end_rate: usize,
        ramp_duration_sec: u64,
        total_signals: usize,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            start_rate,
            end_rate,
            ramp_duration: Duration::from_secs(ramp_duration_sec.max(1)),
            total_signals,
            metrics,
        }
    }

    /// Target rate for the ramp position `elapsed`, truncated to an integer
    /// and clamped to a minimum of 1.
    pub fn target_rate(&self, elapsed: Duration) -> usize {
        let t = elapsed.min(self.ramp_duration).as_secs_f64();
        let delta = (self.end_rate as f64 - self.start_rate as f64) * t
            / self.ramp_duration.as_secs_f64();
        let rate = self.start_rate as i64 + delta as i64;
        rate.max(1) as usize
    }

    /// Publish `total_signals` messages (clipped to the sequence length),
    /// recomputing the rate once per batch.
    pub async fn run(&self, executor: &mut PublishExecutor, messages: &[Message]) {
        let total = self.total_signals.min(messages.len());
        let start_time = Instant::now();
        let mut sent = 0;

        while sent < total {
            let rate = self.target_rate(start_time.elapsed());
            let batch_size = rate.min(total - sent);

            let batch_start = Instant::now();
            for message in &messages[sent..sent + batch_size] {
                executor.publish(message).await;
            }
            sent += batch_size;

            info!(
                "Published batch of {} messages at target rate {}/s",
                batch_size, rate
            );
            let elapsed = batch_start.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                self.metrics.set_throughput(batch_size as f64 / elapsed);
            }

            // Drift correction: sleep off time saved by running ahead of the
            // target rate. Also applies after the final batch.
            let expected = batch_size as f64 / rate as f64;
            if elapsed < expected {
                tokio::time::sleep(Duration::from_secs_f64(expected - elapsed)).await;
            }
        }
    }
}
