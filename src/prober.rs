//! Background probing task
//!
//! A [`Prober`] owns at most one running session. A session resolves the
//! host once, opens a probe channel, and then loops on its own tokio task:
//! probe, record the sample, update the rate estimate, resize the buffer,
//! wait out the rest of the interval.

use crate::buffer::SampleBuffer;
use crate::config::validation::ConfigValidator;
use crate::error::Result;
use crate::logging::ProbeLogger;
use crate::models::{Sample, SessionConfig};
use crate::probe::{HostResolver, ProbeChannel, ProbeTransport};
use crate::rate::RateEstimator;
use crate::types::{ProbeOutcome, ProberState};
use std::net::IpAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;

struct Session {
    target: IpAddr,
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

pub struct Prober {
    buffer: SampleBuffer,
    rate: Arc<Mutex<RateEstimator>>,
    transport: Arc<dyn ProbeTransport>,
    resolver: HostResolver,
    logger: ProbeLogger,
    state: ProberState,
    session: Option<Session>,
}

fn lock_rate(rate: &Mutex<RateEstimator>) -> MutexGuard<'_, RateEstimator> {
    rate.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Prober {
    pub fn new(transport: Arc<dyn ProbeTransport>, logger: ProbeLogger) -> Self {
        Self {
            buffer: SampleBuffer::new(),
            rate: Arc::new(Mutex::new(RateEstimator::new(Instant::now()))),
            transport,
            resolver: HostResolver::new(),
            logger,
            state: ProberState::Idle,
            session: None,
        }
    }

    /// Start a session, stopping the current one first.
    ///
    /// Resolution and channel errors leave the prober idle with its buffer
    /// untouched. Returns the address being probed.
    pub async fn start(&mut self, session: &SessionConfig) -> Result<IpAddr> {
        self.stop().await;

        let interval_ms = i64::try_from(session.interval.as_millis()).unwrap_or(i64::MAX);
        ConfigValidator::validate_interval_ms(interval_ms)?;
        lock_rate(&self.rate).set_desired_duration(session.history_seconds)?;

        let started = Instant::now();
        let resolved = self.resolver.resolve(&session.host).await;
        self.logger.log_resolution(&session.host, resolved.as_ref().copied(), started.elapsed()).await;
        let target = resolved?;

        let channel = self.transport.open(target).await?;

        self.buffer.clear();
        let capacity = {
            let mut rate = lock_rate(&self.rate);
            rate.reset(Instant::now());
            rate.capacity()
        };
        self.buffer.set_capacity(capacity);

        let correlation_id = self.logger
            .log_session_start(&session.host, target, session.interval, session.timeout)
            .await;

        let (stop_tx, stop_rx) = watch::channel(false);
        let probe_loop = ProbeLoop {
            channel,
            buffer: self.buffer.clone(),
            rate: Arc::clone(&self.rate),
            logger: self.logger.clone(),
            interval: session.interval,
            timeout: session.timeout,
            stop_rx,
            correlation_id,
        };
        let handle = tokio::spawn(probe_loop.run());

        self.session = Some(Session { target, stop_tx, handle });
        self.state = ProberState::Running;
        Ok(target)
    }

    /// Stop the running session and wait for its task to exit. Idempotent.
    ///
    /// The session stays owned until the task has been joined, so a stop
    /// that is itself cancelled is finished by the next `stop` or `start`.
    pub async fn stop(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        self.state = ProberState::Stopping;
        // The loop may already be gone if its task panicked
        let _ = session.stop_tx.send(true);
        let joined = (&mut session.handle).await;
        let target = session.target;
        self.session = None;
        self.state = ProberState::Idle;

        if let Err(e) = joined {
            self.logger.logger().error(&format!("Probe task ended abnormally: {}", e))
                .field("target", target.to_string())
                .emit()
                .await;
        }
    }

    /// Change the desired history duration of the running estimator
    pub fn set_history_seconds(&self, seconds: f64) -> Result<()> {
        lock_rate(&self.rate).set_desired_duration(seconds)
    }

    pub fn state(&self) -> ProberState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ProberState::Running
    }

    /// Address probed by the current session
    pub fn target(&self) -> Option<IpAddr> {
        self.session.as_ref().map(|s| s.target)
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    /// Current rate and capacity, read under one lock
    pub fn rate_and_capacity(&self) -> (f64, usize) {
        let rate = lock_rate(&self.rate);
        (rate.rate(), rate.capacity())
    }

    pub fn total_probes(&self) -> u64 {
        lock_rate(&self.rate).total_probes()
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }
}

impl Drop for Prober {
    fn drop(&mut self) {
        // Cannot join here; the detached task exits after its in-flight probe
        if let Some(session) = self.session.take() {
            let _ = session.stop_tx.send(true);
        }
    }
}

struct ProbeLoop {
    channel: Box<dyn ProbeChannel>,
    buffer: SampleBuffer,
    rate: Arc<Mutex<RateEstimator>>,
    logger: ProbeLogger,
    interval: Duration,
    timeout: Duration,
    stop_rx: watch::Receiver<bool>,
    correlation_id: String,
}

impl ProbeLoop {
    fn stop_requested(&mut self) -> bool {
        // A dropped sender counts as a stop request
        self.stop_rx.has_changed().is_err() || *self.stop_rx.borrow_and_update()
    }

    async fn run(mut self) {
        let mut sequence: u64 = 0;

        while !self.stop_requested() {
            sequence += 1;
            let started = Instant::now();
            let outcome = self.channel.echo(self.timeout).await;
            let elapsed = started.elapsed();

            let sample = match outcome {
                ProbeOutcome::Reply => Sample::from_elapsed(elapsed),
                ProbeOutcome::TimedOut => {
                    self.logger.log_probe_failure(sequence, "timed out").await;
                    Sample::timeout(self.timeout)
                }
                ProbeOutcome::Unreachable(reason) => {
                    self.logger.log_probe_failure(sequence, &reason).await;
                    Sample::timeout(self.timeout)
                }
            };

            let (rate, capacity, recomputed) = {
                let mut estimator = lock_rate(&self.rate);
                estimator.record_completion();
                let recomputed = estimator.tick(Instant::now());
                (estimator.rate(), estimator.capacity(), recomputed)
            };
            if recomputed {
                self.logger.log_rate_update(rate, capacity).await;
            }

            self.buffer.set_capacity(capacity);
            self.buffer.push(sample);

            let remaining = self.interval.saturating_sub(elapsed);
            if remaining.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::select! {
                    _ = tokio::time::sleep(remaining) => {}
                    _ = self.stop_rx.changed() => {}
                }
            }
        }

        let total = lock_rate(&self.rate).total_probes();
        self.logger.log_session_stop(&self.correlation_id, total).await;
    }
}
