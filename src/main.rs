//! Command-line interface for mqtt-bench
//!
//! # Usage Examples
//!
//! ```bash
//! # Constant mode against a local broker, metrics on :2112
//! mqtt-bench --broker-url tcp://localhost:1883 \
//!   --mode constant --total-signals 1000 --signals-per-second 100
//!
//! # Burst mode with QoS 1 and a deterministic message sequence
//! mqtt-bench --mode burst --qos 1 --seed 42 \
//!   --burst-size 250 --burst-interval-ms 500
//!
//! # Every flag also reads an environment variable, e.g.
//! MODE=ramp-up START_RATE=50 END_RATE=1000 RAMP_DURATION_SEC=300 mqtt-bench
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use bench_generator::MessageGenerator;
use bench_metrics::{BenchMetrics, MetricsExporter, MetricsSink, UptimeTask};
use chrono::Utc;
use clap::Parser;
use mqtt_bench::config::{MqttOpts, ScheduleOpts};
use mqtt_bench::publisher::{self, PublishExecutor};
use mqtt_bench::report::BenchReport;
use mqtt_bench::transport::{self, MqttPublisher};

#[derive(Parser)]
#[command(name = "mqtt-bench")]
#[command(about = "MQTT publish benchmark with four traffic-shaping modes")]
#[command(long_about = None)]
struct Cli {
    /// MQTT connection options
    #[command(flatten)]
    mqtt: MqttOpts,

    /// Pacing options
    #[command(flatten)]
    schedule: ScheduleOpts,

    /// Topic pattern; {device_id} and {control_id} are substituted per message
    #[arg(
        long,
        default_value = "/devices/{device_id}/controls/{control_id}",
        env = "TOPIC_PATTERN"
    )]
    topic_pattern: String,

    /// Port for the Prometheus metrics endpoint
    #[arg(long, default_value = "2112", env = "PROMETHEUS_PORT")]
    prometheus_port: u16,

    /// Path the JSON run report is written to
    #[arg(long, default_value = "report.json", env = "REPORT_FILE")]
    report_file: PathBuf,

    /// Seed for deterministic message generation (seeded from the OS when omitted)
    #[arg(long, env = "GENERATOR_SEED")]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let start_time = Utc::now();

    // Initialize tracing; LOG_LEVEL holds the filter directive
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    cli.schedule.validate()?;
    let qos = transport::qos_from_level(cli.mqtt.qos)?;

    // Metrics pipeline: sink, HTTP endpoint, uptime task
    let metrics = Arc::new(BenchMetrics::new()?);
    let exporter = MetricsExporter::bind(metrics.clone(), cli.prometheus_port)
        .await
        .with_context(|| format!("failed to bind metrics endpoint on port {}", cli.prometheus_port))?;
    let uptime = UptimeTask::spawn(metrics.clone());

    // Transport connection; failure here is fatal
    let mqtt = MqttPublisher::connect(&cli.mqtt)
        .await
        .with_context(|| format!("failed to connect to MQTT broker {}", cli.mqtt.broker_url))?;
    tracing::info!("Connected to MQTT broker {}", cli.mqtt.broker_url);

    // The full message sequence is generated up front
    let mut generator = match cli.seed {
        Some(seed) => MessageGenerator::with_seed(&cli.topic_pattern, seed),
        None => MessageGenerator::new(&cli.topic_pattern),
    };
    let messages = generator.generate(cli.schedule.total_signals);
    tracing::info!("Generated {} messages for publishing", messages.len());

    tracing::info!(
        "Starting benchmark in {} mode with {} messages",
        cli.schedule.mode,
        messages.len()
    );
    let sink: Arc<dyn MetricsSink> = metrics.clone();
    let mut executor = PublishExecutor::new(Box::new(mqtt), sink.clone(), qos);
    publisher::run_mode(&cli.schedule, &messages, &mut executor, sink).await;

    let end_time = Utc::now();
    executor.close().await;

    // A report that cannot be written is logged, not fatal
    let report = BenchReport::new(
        cli.schedule.mode,
        cli.schedule.total_signals,
        metrics.as_ref(),
        start_time,
        end_time,
    );
    match report.write(&cli.report_file) {
        Ok(()) => tracing::info!("Report written to {}", cli.report_file.display()),
        Err(e) => tracing::error!("Failed to write report: {e:#}"),
    }

    uptime.stop().await;
    exporter.stop().await;

    tracing::info!(
        "Benchmark finished, total published messages = {}",
        metrics.sent_count()
    );
    Ok(())
}
