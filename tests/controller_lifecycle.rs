//! Session lifecycle tests against scripted probe transports
//!
//! These drive the controller the way a presentation layer would: start,
//! poll on a cadence, change settings mid-session and stop.

use pingplot::{
    defaults::{INITIAL_CAPACITY, MIN_CAPACITY},
    probe::ScriptedTransport,
    rate::capacity_for,
    AppError, Controller, ProbeOutcome, ProberState, SessionConfig,
};
use std::sync::Arc;
use std::time::Duration;

fn session(interval_ms: u64, timeout_ms: u64) -> SessionConfig {
    SessionConfig::new("192.0.2.1")
        .with_interval(Duration::from_millis(interval_ms))
        .with_timeout(Duration::from_millis(timeout_ms))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_failed_probes_recorded_at_timeout() {
    let transport = ScriptedTransport::new(vec![
        (ProbeOutcome::Reply, Duration::from_millis(2)),
        (ProbeOutcome::TimedOut, Duration::ZERO),
        (ProbeOutcome::Unreachable("host unreachable".to_string()), Duration::ZERO),
    ]);
    let mut controller = Controller::new(session(5, 40), Arc::new(transport));
    controller.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;
    controller.stop().await;

    let poll = controller.poll();
    let summary = poll.stats.summary.unwrap();
    assert!(summary.timeouts >= 2);
    assert_eq!(summary.max, 40.0);
    assert!(summary.min < 40.0);

    for sample in poll.samples.iter().filter(|s| s.timed_out) {
        assert_eq!(sample.value_ms, 40.0);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_capacity_follows_measured_rate() {
    let transport = ScriptedTransport::replies(Duration::from_millis(1));
    let mut controller = Controller::new(session(10, 100), Arc::new(transport));
    controller.start().await.unwrap();

    assert_eq!(controller.poll().stats.capacity, INITIAL_CAPACITY);

    tokio::time::sleep(Duration::from_millis(1300)).await;
    let poll = controller.poll();
    controller.stop().await;

    // at most one probe per 10 ms interval
    assert!(poll.stats.rate > 20.0 && poll.stats.rate <= 101.0, "rate {}", poll.stats.rate);
    assert_eq!(poll.stats.capacity, capacity_for(poll.stats.rate, 15.0));
    assert!(poll.samples.len() <= poll.stats.capacity);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shorter_history_shrinks_window_without_restart() {
    let transport = ScriptedTransport::replies(Duration::from_millis(1));
    let mut controller = Controller::new(session(5, 100), Arc::new(transport.clone()));
    controller.start().await.unwrap();

    controller.apply_history_seconds(1.0).unwrap();
    tokio::time::sleep(Duration::from_millis(1300)).await;
    let poll = controller.poll();
    controller.stop().await;

    assert_eq!(transport.open_count(), 1);
    // ~200 probes/s for 1 s, well under the initial capacity
    assert!(poll.stats.capacity >= MIN_CAPACITY && poll.stats.capacity < INITIAL_CAPACITY);
    assert!(poll.samples.len() <= poll.stats.capacity);
}

#[tokio::test]
async fn test_interval_change_restarts_session() {
    let transport = ScriptedTransport::replies(Duration::from_millis(1));
    let mut controller = Controller::new(session(5, 100), Arc::new(transport.clone()));
    controller.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;

    controller.apply_interval(20).await.unwrap();
    assert_eq!(transport.open_count(), 2);
    assert_eq!(controller.config().interval, Duration::from_millis(20));
    assert!(controller.poll().samples.is_empty());

    // rejected values keep the running session
    assert!(matches!(controller.apply_interval(20_000).await, Err(AppError::InvalidConfig(_))));
    assert_eq!(transport.open_count(), 2);
    assert!(controller.is_running());
    controller.stop().await;
}

#[tokio::test]
async fn test_unavailable_transport_leaves_controller_idle() {
    let mut controller = Controller::new(session(5, 100), Arc::new(ScriptedTransport::unavailable()));
    let result = controller.start().await;
    assert!(matches!(result, Err(AppError::Resource(_))));
    assert!(!controller.is_running());
    assert_eq!(controller.prober().state(), ProberState::Idle);
    assert!(!controller.poll().stats.has_data());
}

#[tokio::test]
async fn test_stop_is_prompt_during_long_interval() {
    let transport = ScriptedTransport::replies(Duration::from_millis(1));
    let mut controller = Controller::new(session(10_000, 100), Arc::new(transport));
    controller.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    tokio::time::timeout(Duration::from_millis(500), controller.stop())
        .await
        .expect("stop should not wait for the interval to elapse");
    assert_eq!(controller.prober().state(), ProberState::Idle);
    assert_eq!(controller.poll().samples.len(), 1);
}
