//! Prometheus-backed implementation of the metrics sink.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use prometheus::{exponential_buckets, Counter, Gauge, Histogram, HistogramOpts, Opts, Registry};
use thiserror::Error;

use crate::sink::MetricsSink;

/// Errors raised while building or serving metrics.
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Benchmark metrics registered on a dedicated registry.
///
/// A dedicated registry keeps `GET /metrics` limited to benchmark series
/// while the process-global default registry stays reachable under
/// `GET /debug/metrics`. The sent/error totals are mirrored into plain
/// atomics so the final report can read them without scraping.
pub struct BenchMetrics {
    registry: Registry,
    sent_total: Counter,
    failed_total: Counter,
    publish_latency: Histogram,
    throughput: Gauge,
    bytes_payload: Counter,
    bytes_topic: Counter,
    uptime: Gauge,
    sent_count: AtomicU64,
    error_count: AtomicU64,
    started_at: tokio::time::Instant,
}

impl BenchMetrics {
    /// Create the benchmark series and register them.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let sent_total = Counter::with_opts(Opts::new(
            "messages_sent_total",
            "Total number of successfully published messages",
        ))?;
        registry.register(Box::new(sent_total.clone()))?;

        let failed_total = Counter::with_opts(Opts::new(
            "messages_failed_total",
            "Total number of failed publish attempts",
        ))?;
        registry.register(Box::new(failed_total.clone()))?;

        let publish_latency = Histogram::with_opts(
            HistogramOpts::new(
                "publish_latency_seconds",
                "Publish round-trip latency in seconds",
            )
            .buckets(exponential_buckets(0.0001, 2.0, 15)?),
        )?;
        registry.register(Box::new(publish_latency.clone()))?;

        let throughput = Gauge::with_opts(Opts::new(
            "throughput_msgs_sec",
            "Most recent per-batch throughput in messages per second",
        ))?;
        registry.register(Box::new(throughput.clone()))?;

        let bytes_payload = Counter::with_opts(Opts::new(
            "bytes_sent_payload",
            "Total payload bytes published",
        ))?;
        registry.register(Box::new(bytes_payload.clone()))?;

        let bytes_topic = Counter::with_opts(Opts::new(
            "bytes_sent_topic",
            "Total topic bytes published",
        ))?;
        registry.register(Box::new(bytes_topic.clone()))?;

        let uptime = Gauge::with_opts(Opts::new(
            "uptime_seconds",
            "Seconds since the benchmark started",
        ))?;
        registry.register(Box::new(uptime.clone()))?;

        Ok(Self {
            registry,
            sent_total,
            failed_total,
            publish_latency,
            throughput,
            bytes_payload,
            bytes_topic,
            uptime,
            sent_count: AtomicU64::new(0),
            error_count: AtomicU64::new(0),
            started_at: tokio::time::Instant::now(),
        })
    }

    /// Registry holding only the benchmark series.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Current value of the uptime gauge.
    pub fn uptime_seconds(&self) -> f64 {
        self.uptime.get()
    }

    /// Refresh the uptime gauge from the construction time.
    pub(crate) fn record_uptime(&self) {
        self.uptime.set(self.started_at.elapsed().as_secs_f64());
    }
}

impl MetricsSink for BenchMetrics {
    fn inc_sent(&self, payload_bytes: usize, topic_bytes: usize) {
        self.sent_total.inc();
        self.bytes_payload.inc_by(payload_bytes as f64);
        self.bytes_topic.inc_by(topic_bytes as f64);
        self.sent_count.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_error(&self) {
        self.failed_total.inc();
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }

    fn observe_latency(&self, latency: Duration) {
        self.publish_latency.observe(latency.as_secs_f64());
    }

    fn set_throughput(&self, msgs_per_second: f64) {
        self.throughput.set(msgs_per_second);
    }

    fn sent_count(&self) -> u64 {
        self.sent_count.load(Ordering::Relaxed)
    }

    fn error_count(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }
}
