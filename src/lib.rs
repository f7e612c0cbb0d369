//! mqtt-bench library
//!
//! A benchmark driving synthetic publish traffic against an MQTT broker to
//! measure throughput, publish latency and failure rate under four
//! traffic-shaping modes.
//!
//! # Components
//!
//! - [`config`] - CLI options and the traffic-shaping mode selector
//! - [`transport`] - MQTT connection bootstrap and the blocking publish
//!   primitive behind the [`Publisher`] trait
//! - [`publisher`] - the pacing scheduler: per-message executor plus the
//!   constant, burst, ramp-up and random pacers
//! - [`report`] - the JSON run summary
//! - [`testing`] - transport and metrics-sink doubles for tests
//!
//! Message generation lives in the `bench-generator` crate and the metrics
//! pipeline (sink trait, Prometheus backend, HTTP exporter, uptime task) in
//! `bench-metrics`.
//!
//! # Usage
//!
//! ```bash
//! # Constant mode: 100 messages per second
//! mqtt-bench --broker-url tcp://localhost:1883 \
//!   --mode constant --total-signals 1000 --signals-per-second 100
//!
//! # Burst mode: bursts of 500 separated by 2 seconds
//! mqtt-bench --mode burst --total-signals 5000 \
//!   --burst-size 500 --burst-interval-ms 2000
//!
//! # Ramp-up mode: 50/s to 1000/s over 5 minutes
//! mqtt-bench --mode ramp-up --total-signals 100000 \
//!   --start-rate 50 --end-rate 1000 --ramp-duration-sec 300
//! ```

pub mod config;
pub mod publisher;
pub mod report;
pub mod testing;
pub mod transport;

pub use config::{Mode, MqttOpts, ScheduleOpts};
pub use publisher::{run_mode, PublishExecutor};
pub use report::BenchReport;
pub use transport::{MqttPublisher, Publisher, TransportError};
