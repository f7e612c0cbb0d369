//! Dispatcher-level pacing tests: every mode publishes the whole sequence,
//! in order, under a paused clock.

use std::sync::Arc;
use std::time::Duration;

use bench_generator::{Message, MessageGenerator};
use bench_metrics::MetricsSink;
use mqtt_bench::config::{Mode, ScheduleOpts};
use mqtt_bench::publisher::{run_mode, PublishExecutor};
use mqtt_bench::testing::{PublishLog, RecordingSink, StubPublisher};
use mqtt_bench::transport::QoS;
use tokio::time::Instant;

const PATTERN: &str = "/devices/{device_id}/controls/{control_id}";

fn schedule(mode: Mode, total_signals: usize) -> ScheduleOpts {
    ScheduleOpts {
        mode,
        total_signals,
        signals_per_second: 100,
        burst_size: 100,
        burst_interval_ms: 1000,
        start_rate: 50,
        end_rate: 1000,
        ramp_duration_sec: 10,
        min_rate: 10,
        max_rate: 10,
    }
}

async fn run(
    opts: &ScheduleOpts,
    messages: &[Message],
    stub: StubPublisher,
) -> (PublishLog, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let log = stub.log();
    let mut executor = PublishExecutor::new(Box::new(stub), sink.clone(), QoS::AtMostOnce);
    run_mode(opts, messages, &mut executor, sink.clone()).await;
    (log, sink)
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_every_mode_publishes_the_whole_sequence_in_order() {
    for mode in [Mode::Constant, Mode::Burst, Mode::RampUp, Mode::Random] {
        let messages = MessageGenerator::with_seed(PATTERN, 3).generate(137);
        let opts = schedule(mode, 137);

        let (log, sink) = run(&opts, &messages, StubPublisher::new()).await;

        let attempts = log.attempts();
        assert_eq!(attempts.len(), 137, "wrong count in {mode} mode");
        assert_eq!(sink.sent_count(), 137, "wrong sent count in {mode} mode");
        assert_eq!(sink.error_count(), 0);

        let published: Vec<(&str, &str)> = attempts
            .iter()
            .map(|a| (a.topic.as_str(), a.payload.as_str()))
            .collect();
        let expected: Vec<(&str, &str)> = messages
            .iter()
            .map(|m| (m.topic.as_str(), m.payload.as_str()))
            .collect();
        assert_eq!(published, expected, "order broken in {mode} mode");
    }
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_constant_mode_issues_one_clipped_batch() {
    let messages = MessageGenerator::with_seed(PATTERN, 1).generate(10);
    let opts = schedule(Mode::Constant, 10);

    let started = Instant::now();
    let (log, _) = run(&opts, &messages, StubPublisher::new()).await;

    // 10 messages at 100/s: a single batch, released on the first tick.
    let attempts = log.attempts();
    assert_eq!(attempts.len(), 10);
    for attempt in &attempts {
        assert_eq!(attempt.at - started, Duration::from_secs(1));
    }
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_burst_mode_batch_shape_and_sleep_placement() {
    let messages = MessageGenerator::with_seed(PATTERN, 2).generate(250);
    let opts = schedule(Mode::Burst, 250);

    let started = Instant::now();
    let (log, _) = run(&opts, &messages, StubPublisher::new()).await;
    let finished = Instant::now();

    let offsets: Vec<Duration> = log.attempts().iter().map(|a| a.at - started).collect();

    // Bursts of 100, 100, 50 with a sleep after the first two only.
    assert!(offsets[..100].iter().all(|o| *o == Duration::ZERO));
    assert!(offsets[100..200]
        .iter()
        .all(|o| *o == Duration::from_secs(1)));
    assert!(offsets[200..].iter().all(|o| *o == Duration::from_secs(2)));
    assert_eq!(finished - started, Duration::from_secs(2));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_random_mode_with_degenerate_range_is_constant() {
    let messages = MessageGenerator::with_seed(PATTERN, 4).generate(40);
    let opts = schedule(Mode::Random, 40);

    let started = Instant::now();
    let (log, _) = run(&opts, &messages, StubPublisher::new()).await;

    // min_rate == max_rate == 10: four batches of exactly 10, one second
    // of drift sleep apart.
    let attempts = log.attempts();
    for (i, attempt) in attempts.iter().enumerate() {
        let batch = (i / 10) as u64;
        assert_eq!(attempt.at - started, Duration::from_secs(batch));
    }
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_failures_are_absorbed_and_counted() {
    let messages = MessageGenerator::with_seed(PATTERN, 5).generate(30);
    let opts = schedule(Mode::Burst, 30);

    let stub = StubPublisher::new().fail_on([0, 7, 29]);
    let (log, sink) = run(&opts, &messages, stub).await;

    // Every message is still attempted; only the counters differ.
    assert_eq!(log.attempts().len(), 30);
    assert_eq!(sink.sent_count(), 27);
    assert_eq!(sink.error_count(), 3);
    assert_eq!(sink.latencies().len(), 27);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_repeated_runs_produce_the_same_totals() {
    let messages = MessageGenerator::with_seed(PATTERN, 6).generate(75);

    for mode in [Mode::Constant, Mode::Burst, Mode::RampUp, Mode::Random] {
        let opts = schedule(mode, 75);
        let (_, first) = run(&opts, &messages, StubPublisher::new()).await;
        let (_, second) = run(&opts, &messages, StubPublisher::new()).await;

        assert_eq!(first.sent_count(), 75);
        assert_eq!(second.sent_count(), first.sent_count());
        assert_eq!(second.error_count(), first.error_count());
    }
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_throughput_samples_are_finite_and_non_negative() {
    let messages = MessageGenerator::with_seed(PATTERN, 8).generate(60);

    for mode in [Mode::Constant, Mode::Burst, Mode::RampUp, Mode::Random] {
        let opts = schedule(mode, 60);
        let stub = StubPublisher::new().with_latency(Duration::from_millis(2));
        let (_, sink) = run(&opts, &messages, stub).await;

        for sample in sink.throughput_samples() {
            assert!(sample.is_finite());
            assert!(sample >= 0.0);
        }
    }
}
