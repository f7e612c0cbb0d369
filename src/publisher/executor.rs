//! Single-message publish wrapper: timing, outcome classification, metrics.

use std::sync::Arc;

use bench_generator::Message;
use bench_metrics::MetricsSink;
use tracing::{debug, error};

use crate::transport::{Publisher, QoS};

/// Executes one publish at a time against the transport.
///
/// Each call blocks until the transport acknowledges (or fails), so the
/// caller never has more than one message in flight. A failed publish is
/// recorded and absorbed; the executor never retries and never aborts the
/// run.
pub struct PublishExecutor {
    publisher: Box<dyn Publisher>,
    metrics: Arc<dyn MetricsSink>,
    qos: QoS,
}

impl PublishExecutor {
    pub fn new(publisher: Box<dyn Publisher>, metrics: Arc<dyn MetricsSink>, qos: QoS) -> Self {
        Self {
            publisher,
            metrics,
            qos,
        }
    }

    /// Publish one message and record its outcome.
    ///
    /// On success the sent counter, byte counters and latency histogram are
    /// updated; on failure only the error counter is. The measured latency
    /// spans from just before the publish call to its acknowledgment.
    pub async fn publish(&mut self, message: &Message) {
        let start = tokio::time::Instant::now();

        match self
            .publisher
            .publish(&message.topic, self.qos, &message.payload)
            .await
        {
            Ok(()) => {
                self.metrics
                    .inc_sent(message.payload.len(), message.topic.len());
                self.metrics.observe_latency(start.elapsed());
                debug!("Published message to {}: {}", message.topic, message.payload);
            }
            Err(e) => {
                self.metrics.inc_error();
                error!("Failed to publish message to {}: {}", message.topic, e);
            }
        }
    }

    /// Release the underlying transport.
    pub async fn close(&mut self) {
        self.publisher.close().await;
    }
}
