//! Metrics pipeline for the mqtt-bench publish benchmark.
//!
//! The publish loop reports outcomes through the [`MetricsSink`] trait;
//! [`BenchMetrics`] implements it on top of a dedicated Prometheus registry
//! which [`MetricsExporter`] serves over HTTP. [`UptimeTask`] keeps the
//! uptime gauge current from a background task that shares the same sink.
//!
//! # Architecture
//!
//! ```text
//! publish loop ──► MetricsSink ──► BenchMetrics (dedicated Registry)
//!                                       ▲   │
//!                         UptimeTask ───┘   ▼
//!                              MetricsExporter (GET /metrics, /debug/metrics)
//! ```

pub mod exporter;
pub mod recorder;
pub mod sink;
pub mod uptime;

// Re-exports for convenience
pub use exporter::MetricsExporter;
pub use recorder::{BenchMetrics, MetricsError};
pub use sink::MetricsSink;
pub use uptime::UptimeTask;
