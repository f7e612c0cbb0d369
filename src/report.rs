//! Final run summary written as JSON.

use std::path::Path;

use anyhow::Context;
use bench_metrics::MetricsSink;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Mode;

/// Summary of one benchmark run.
///
/// Field names are the report's wire format; external tooling consumes the
/// JSON file directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchReport {
    pub mode: String,
    pub total_signals: usize,
    pub success_count: u64,
    pub error_count: u64,
    pub duration_sec: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub avg_rate_msgs_per_sec: f64,
}

impl BenchReport {
    /// Build the summary from the sink's final counter values.
    pub fn new(
        mode: Mode,
        total_signals: usize,
        metrics: &dyn MetricsSink,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        let success_count = metrics.sent_count();
        let duration_sec = (end_time - start_time).num_milliseconds() as f64 / 1000.0;
        let avg_rate_msgs_per_sec = if duration_sec > 0.0 {
            success_count as f64 / duration_sec
        } else {
            0.0
        };

        Self {
            mode: mode.to_string(),
            total_signals,
            success_count,
            error_count: metrics.error_count(),
            duration_sec,
            start_time,
            end_time,
            avg_rate_msgs_per_sec,
        }
    }

    /// Write the report as pretty-printed JSON.
    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))
    }
}
