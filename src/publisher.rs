//! Pacing scheduler: dispatches one of the four traffic-shaping policies.
//!
//! A pacer consumes the pre-generated message sequence in order, slices it
//! into batches, hands each message to the [`PublishExecutor`] and shapes the
//! time between batches. [`run_mode`] selects the pacer for the configured
//! [`Mode`] and runs it synchronously to completion; every per-message
//! failure is absorbed into metrics, so a run always dispatches the whole
//! sequence.

pub mod burst;
pub mod constant;
pub mod executor;
pub mod ramp;
pub mod random;

use std::sync::Arc;

use bench_generator::Message;
use bench_metrics::MetricsSink;

use crate::config::{Mode, ScheduleOpts};

pub use burst::BurstPacer;
pub use constant::ConstantPacer;
pub use executor::PublishExecutor;
pub use ramp::RampPacer;
pub use random::RandomPacer;

/// Run the pacer selected by `schedule.mode` over the whole sequence.
///
/// Unknown modes cannot reach this point; the mode is parsed into the enum
/// at startup, so the dispatch is an exhaustive match.
pub async fn run_mode(
    schedule: &ScheduleOpts,
    messages: &[Message],
    executor: &mut PublishExecutor,
    metrics: Arc<dyn MetricsSink>,
) {
    match schedule.mode {
        Mode::Constant => {
            ConstantPacer::new(schedule.signals_per_second, metrics)
                .run(executor, messages)
                .await;
        }
        Mode::Burst => {
            BurstPacer::new(schedule.burst_size, schedule.burst_interval_ms, metrics)
                .run(executor, messages)
                .await;
        }
        Mode::RampUp => {
            RampPacer::new(
                schedule.start_rate,
                schedule.end_rate,
                schedule.ramp_duration_sec,
                schedule.total_signals,
                metrics,
            )
            .run(executor, messages)
            .await;
        }
        Mode::Random => {
            RandomPacer::new(
                schedule.min_rate,
                schedule.max_rate,
                schedule.total_signals,
                metrics,
            )
            .run(executor, messages)
            .await;
        }
    }
}
