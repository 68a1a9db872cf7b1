//! Transports that do not touch the network

use super::{ProbeChannel, ProbeTransport};
use crate::error::{AppError, Result};
use crate::types::ProbeOutcome;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Synthetic latencies for dry runs without ICMP privileges
#[derive(Debug, Clone)]
pub struct SimulatedTransport {
    base_ms: f64,
    jitter_ms: f64,
    loss: f64,
    seed: Option<u64>,
}

impl SimulatedTransport {
    /// Latency uniformly spread over `base_ms ± jitter_ms`, with `loss` the
    /// fraction of probes that never get a reply.
    pub fn new(base_ms: f64, jitter_ms: f64, loss: f64) -> Self {
        Self {
            base_ms: base_ms.max(0.0),
            jitter_ms: jitter_ms.abs(),
            loss: loss.clamp(0.0, 1.0),
            seed: None,
        }
    }

    /// Make the latency sequence reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for SimulatedTransport {
    fn default() -> Self {
        Self::new(20.0, 5.0, 0.01)
    }
}

#[async_trait]
impl ProbeTransport for SimulatedTransport {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn open(&self, _target: IpAddr) -> Result<Box<dyn ProbeChannel>> {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Box::new(SimulatedChannel { config: self.clone(), rng }))
    }
}

struct SimulatedChannel {
    config: SimulatedTransport,
    rng: StdRng,
}

impl SimulatedChannel {
    fn next_latency_ms(&mut self) -> f64 {
        let jitter = if self.config.jitter_ms > 0.0 {
            self.rng.gen_range(-self.config.jitter_ms..=self.config.jitter_ms)
        } else {
            0.0
        };
        (self.config.base_ms + jitter).max(0.05)
    }
}

#[async_trait]
impl ProbeChannel for SimulatedChannel {
    async fn echo(&mut self, timeout: Duration) -> ProbeOutcome {
        let latency = Duration::from_secs_f64(self.next_latency_ms() / 1000.0);
        let lost = self.rng.gen_bool(self.config.loss);

        if lost || latency >= timeout {
            tokio::time::sleep(timeout).await;
            ProbeOutcome::TimedOut
        } else {
            tokio::time::sleep(latency).await;
            ProbeOutcome::Reply
        }
    }
}

/// Replays a fixed cycle of outcomes, each taking a fixed time.
///
/// A `TimedOut` step always takes the full timeout; other steps take their
/// delay capped by the timeout.
#[derive(Debug, Clone)]
pub struct ScriptedTransport {
    steps: Arc<Vec<(ProbeOutcome, Duration)>>,
    available: bool,
    opens: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    pub fn new(steps: Vec<(ProbeOutcome, Duration)>) -> Self {
        Self {
            steps: Arc::new(steps),
            available: true,
            opens: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Every probe is answered after `delay`
    pub fn replies(delay: Duration) -> Self {
        Self::new(vec![(ProbeOutcome::Reply, delay)])
    }

    /// A transport whose resource can never be acquired
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(Vec::new())
        }
    }

    /// Channels opened so far, across clones
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProbeTransport for ScriptedTransport {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn open(&self, target: IpAddr) -> Result<Box<dyn ProbeChannel>> {
        if !self.available {
            return Err(AppError::resource(format!("Scripted transport unavailable for {}", target)));
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedChannel {
            steps: Arc::clone(&self.steps),
            next: 0,
        }))
    }
}

struct ScriptedChannel {
    steps: Arc<Vec<(ProbeOutcome, Duration)>>,
    next: usize,
}

#[async_trait]
impl ProbeChannel for ScriptedChannel {
    async fn echo(&mut self, timeout: Duration) -> ProbeOutcome {
        if self.steps.is_empty() {
            tokio::time::sleep(timeout).await;
            return ProbeOutcome::TimedOut;
        }

        let (outcome, delay) = self.steps[self.next % self.steps.len()].clone();
        self.next = self.next.wrapping_add(1);

        match outcome {
            ProbeOutcome::TimedOut => {
                tokio::time::sleep(timeout).await;
                ProbeOutcome::TimedOut
            }
            ProbeOutcome::Reply if delay >= timeout => {
                tokio::time::sleep(timeout).await;
                ProbeOutcome::TimedOut
            }
            other => {
                tokio::time::sleep(delay).await;
                other
            }
        }
    }
}
