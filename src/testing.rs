//! Test doubles shared by unit and integration tests.
//!
//! [`StubPublisher`] stands in for the MQTT transport: it records every
//! publish attempt (with a timestamp, so paused-clock tests can assert batch
//! boundaries) and can inject failures and per-publish latency.
//! [`RecordingSink`] captures everything the scheduler reports to the
//! metrics sink.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bench_metrics::MetricsSink;
use tokio::time::Instant;

use crate::transport::{Publisher, QoS, TransportError};

/// One recorded call to [`StubPublisher::publish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishAttempt {
    pub topic: String,
    pub payload: String,
    pub qos: QoS,
    /// Taken before the injected latency elapses.
    pub at: Instant,
}

/// Shared view of the attempts recorded by a [`StubPublisher`].
///
/// Cloned out of the stub before handing it to an executor, so tests can
/// inspect the log after the run.
#[derive(Clone, Default)]
pub struct PublishLog(Arc<Mutex<Vec<PublishAttempt>>>);

impl PublishLog {
    pub fn attempts(&self) -> Vec<PublishAttempt> {
        self.0.lock().unwrap().clone()
    }

    pub fn topics(&self) -> Vec<String> {
        self.attempts().into_iter().map(|a| a.topic).collect()
    }
}

/// Scripted transport double.
pub struct StubPublisher {
    log: PublishLog,
    fail_on: HashSet<usize>,
    latency: Duration,
    closed: bool,
}

impl StubPublisher {
    /// A stub that acknowledges every publish instantly.
    pub fn new() -> Self {
        Self {
            log: PublishLog::default(),
            fail_on: HashSet::new(),
            latency: Duration::ZERO,
            closed: false,
        }
    }

    /// Fail the attempts at the given zero-based indices.
    pub fn fail_on(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.fail_on = indices.into_iter().collect();
        self
    }

    /// Delay every acknowledgment by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Handle for inspecting recorded attempts after the run.
    pub fn log(&self) -> PublishLog {
        self.log.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Default for StubPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Publisher for StubPublisher {
    async fn publish(
        &mut self,
        topic: &str,
        qos: QoS,
        payload: &str,
    ) -> Result<(), TransportError> {
        let index = {
            let mut attempts = self.log.0.lock().unwrap();
            attempts.push(PublishAttempt {
                topic: topic.to_string(),
                payload: payload.to_string(),
                qos,
                at: Instant::now(),
            });
            attempts.len() - 1
        };

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if self.fail_on.contains(&index) {
            return Err(TransportError::AckTimeout(self.latency));
        }
        Ok(())
    }

    async fn close(&mut self) {
        self.closed = true;
    }
}

/// Metrics sink double recording every reported value.
#[derive(Default)]
pub struct RecordingSink {
    sent: AtomicU64,
    errors: AtomicU64,
    payload_bytes: AtomicU64,
    topic_bytes: AtomicU64,
    latencies: Mutex<Vec<Duration>>,
    throughput: Mutex<Vec<f64>>,
}

impl RecordingSink {
    pub fn latencies(&self) -> Vec<Duration> {
        self.latencies.lock().unwrap().clone()
    }

    pub fn throughput_samples(&self) -> Vec<f64> {
        self.throughput.lock().unwrap().clone()
    }

    pub fn payload_bytes(&self) -> u64 {
        self.payload_bytes.load(Ordering::Relaxed)
    }

    pub fn topic_bytes(&self) -> u64 {
        self.topic_bytes.load(Ordering::Relaxed)
    }
}

impl MetricsSink for RecordingSink {
    fn inc_sent(&self, payload_bytes: usize, topic_bytes: usize) {
        self.sent.fetch_add(1, Ordering::Relaxed);
        self.payload_bytes
            .fetch_add(payload_bytes as u64, Ordering::Relaxed);
        self.topic_bytes
            .fetch_add(topic_bytes as u64, Ordering::Relaxed);
    }

    fn inc_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    fn observe_latency(&self, latency: Duration) {
        self.latencies.lock().unwrap().push(latency);
    }

    fn set_throughput(&self, msgs_per_second: f64) {
        self.throughput.lock().unwrap().push(msgs_per_second);
    }

    fn sent_count(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    fn error_count(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }
}
