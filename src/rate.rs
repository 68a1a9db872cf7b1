//! Probe rate tracking and the history capacity derived from it

use crate::config::validation::ConfigValidator;
use crate::defaults::{DEFAULT_HISTORY_SECONDS, INITIAL_CAPACITY, MAX_CAPACITY, MIN_CAPACITY, RATE_WINDOW};
use crate::error::Result;
use std::time::Instant;

/// Counts completed probes and turns the observed rate into a buffer
/// capacity that covers the desired history duration.
#[derive(Debug, Clone)]
pub struct RateEstimator {
    total_probes: u64,
    last_tick: Instant,
    probes_at_last_tick: u64,
    rate: f64,
    desired_duration: f64,
    capacity: usize,
}

impl RateEstimator {
    pub fn new(now: Instant) -> Self {
        Self {
            total_probes: 0,
            last_tick: now,
            probes_at_last_tick: 0,
            rate: 0.0,
            desired_duration: DEFAULT_HISTORY_SECONDS,
            capacity: INITIAL_CAPACITY,
        }
    }

    /// Estimator with a validated history duration
    pub fn with_duration(now: Instant, seconds: f64) -> Result<Self> {
        let mut estimator = Self::new(now);
        estimator.set_desired_duration(seconds)?;
        Ok(estimator)
    }

    /// Count one finished probe, reply or timeout
    pub fn record_completion(&mut self) {
        self.total_probes += 1;
    }

    /// Recompute rate and capacity if a full window has elapsed.
    ///
    /// Returns `true` when a recompute happened.
    pub fn tick(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_tick);
        if elapsed < RATE_WINDOW {
            return false;
        }

        let completed = self.total_probes - self.probes_at_last_tick;
        self.rate = completed as f64 / elapsed.as_secs_f64();
        self.capacity = capacity_for(self.rate, self.desired_duration);
        self.last_tick = now;
        self.probes_at_last_tick = self.total_probes;
        true
    }

    /// Change the desired history duration; out-of-range values are rejected
    /// and the previous value is kept.
    ///
    /// The capacity follows on the next recompute.
    pub fn set_desired_duration(&mut self, seconds: f64) -> Result<()> {
        self.desired_duration = ConfigValidator::validate_history_seconds(seconds)?;
        Ok(())
    }

    /// Forget all counters; used when a new session starts
    pub fn reset(&mut self, now: Instant) {
        self.total_probes = 0;
        self.probes_at_last_tick = 0;
        self.last_tick = now;
        self.rate = 0.0;
        self.capacity = INITIAL_CAPACITY;
    }

    /// Completed probes per second as of the last recompute
    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn total_probes(&self) -> u64 {
        self.total_probes
    }

    pub fn desired_duration(&self) -> f64 {
        self.desired_duration
    }
}

/// Samples needed to cover `seconds` at `rate` probes per second
pub fn capacity_for(rate: f64, seconds: f64) -> usize {
    let wanted = (rate * seconds).round();
    if !wanted.is_finite() || wanted <= MIN_CAPACITY as f64 {
        MIN_CAPACITY
    } else if wanted >= MAX_CAPACITY as f64 {
        MAX_CAPACITY
    } else {
        wanted as usize
    }
}
