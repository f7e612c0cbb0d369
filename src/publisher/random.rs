//! Randomized pacing: batch size drawn uniformly per batch.

use std::sync::Arc;
use std::time::Duration;

use bench_generator::Message;
use bench_metrics::MetricsSink;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::time::Instant;
use tracing::info;

use super::executor::PublishExecutor;

/// Publishes batches whose size is a fresh uniform draw from
/// `min_rate..=max_rate` each iteration, with the same drift-correction
/// discipline as the ramp pacer.
pub struct RandomPacer {
    min_rate: usize,
    max_rate: usize,
    total_signals: usize,
    metrics: Arc<dyn MetricsSink>,
    rng: SmallRng,
}

impl RandomPacer {
    /// Create a pacer whose draws are seeded from the operating system.
    pub fn new(
        min_rate: usize,
        max_rate: usize,
        total_signals: usize,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self::with_rng(
            min_rate,
            max_rate,
            total_signals,
            metrics,
            SmallRng::from_os_rng(),
        )
    }

    /// Create a pacer with an injected random source for reproducible runs.
    pub fn with_rng(
        min_rate: usize,
        max_rate: usize,
        total_signals: usize,
        metrics: Arc<dyn MetricsSink>,
        rng: SmallRng,
    ) -> Self {
        Self {
            min_rate,
            max_rate: max_rate.max(min_rate),
            total_signals,
            metrics,
            rng,
        }
    }

    /// Publish `total_signals` messages (clipped to the sequence length).
    pub async fn run(&mut self, executor: &mut PublishExecutor, messages: &[Message]) {
        let total = self.total_signals.min(messages.len());
        let mut sent = 0;

        while sent < total {
            let rate = self.rng.random_range(self.min_rate..=self.max_rate).max(1);
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

            // Same drift correction as the ramp pacer: only positive drift is
            // slept off, running behind is never compensated.
            let expected = batch_size as f64 / rate as f64;
            if elapsed < expected {
                tokio::time::sleep(Duration::from_secs_f64(expected - elapsed)).await;
            }
        }
    }
}
