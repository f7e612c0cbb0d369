//! Constant-rate pacing: one fixed-size batch per wall-clock second.

use std::sync::Arc;
use std::time::Duration;

use bench_generator::Message;
use bench_metrics::MetricsSink;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::info;

use super::executor::PublishExecutor;

/// Releases `signals_per_second` messages on every one-second tick.
///
/// The tick period itself is the pacing mechanism; no sleep duration is ever
/// computed. A tick that fires late is not made up for: missed ticks are
/// skipped rather than bursted, so the batch cadence stays at most one per
/// second.
pub struct ConstantPacer {
    signals_per_second: usize,
    metrics: Arc<dyn MetricsSink>,
}

impl ConstantPacer {
    pub fn new(signals_per_second: usize, metrics: Arc<dyn MetricsSink>) -> Self {
        Self {
            signals_per_second: signals_per_second.max(1),
            metrics,
        }
    }

    /// Publish every message, one batch per tick, in sequence order.
    pub async fn run(&self, executor: &mut PublishExecutor, messages: &[Message]) {
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The interval's first tick completes immediately; consume it so the
        // first batch goes out one second into the run.
        ticker.tick().await;

        let total_steps = messages.len().div_ceil(self.signals_per_second);
        let mut last_batch_time = Instant::now();

        for step in 0..total_steps {
            ticker.tick().await;

            let start_idx = step * self.signals_per_second;
            let end_idx = (start_idx + self.signals_per_second).min(messages.len());

            // Throughput reflects the previous inter-batch interval.
            let now = Instant::now();
            let elapsed = (now - last_batch_time).as_secs_f64();
            if elapsed > 0.0 {
                self.metrics
                    .set_throughput((end_idx - start_idx) as f64 / elapsed);
            }
            last_batch_time = now;

            for message in &messages[start_idx..end_idx] {
                executor.publish(message).await;
            }
            info!(
                "Published batch {}/{} of {} messages",
                step + 1,
                total_steps,
                end_idx - start_idx
            );
        }
    }
}
