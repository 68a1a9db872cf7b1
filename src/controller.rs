//! Session lifecycle and the polling interface for the presentation layer

use crate::config::validation::ConfigValidator;
use crate::error::Result;
use crate::logging::ProbeLogger;
use crate::models::{Config, PollResult, SessionConfig};
use crate::probe::{transport_for, ProbeTransport};
use crate::prober::Prober;
use crate::stats::{DisplayScale, StatsComputer};
use std::net::IpAddr;
use std::sync::Arc;

/// Owns the live session settings, the prober and the display scale.
///
/// Host and interval changes restart the prober; a history change is applied
/// to the running session in place. Rejected values leave the previous
/// setting in force.
pub struct Controller {
    config: SessionConfig,
    prober: Prober,
    display_scale: DisplayScale,
    last_seen_generation: u64,
}

impl Controller {
    pub fn new(config: SessionConfig, transport: Arc<dyn ProbeTransport>) -> Self {
        Self::with_logger(config, transport, ProbeLogger::quiet())
    }

    pub fn with_logger(config: SessionConfig, transport: Arc<dyn ProbeTransport>, logger: ProbeLogger) -> Self {
        let prober = Prober::new(transport, logger);
        let last_seen_generation = prober.buffer().generation();
        Self {
            config,
            prober,
            display_scale: DisplayScale::default(),
            last_seen_generation,
        }
    }

    /// Controller for a loaded configuration, probing over ICMP or the
    /// simulated transport as configured
    pub fn from_config(config: &Config, logger: ProbeLogger) -> Self {
        Self::with_logger(config.session(), transport_for(config), logger)
    }

    /// Start (or restart) probing with the current settings
    pub async fn start(&mut self) -> Result<IpAddr> {
        self.prober.start(&self.config).await
    }

    pub async fn stop(&mut self) {
        self.prober.stop().await;
    }

    /// Switch to a new host and restart.
    ///
    /// A blank host is rejected without touching the running session. If the
    /// new host cannot be resolved or probed, the previous host is restored
    /// in the settings and the prober is left idle.
    pub async fn apply_host(&mut self, host: &str) -> Result<IpAddr> {
        let host = ConfigValidator::validate_host(host)?;
        let previous = std::mem::replace(&mut self.config.host, host);

        match self.start().await {
            Ok(target) => Ok(target),
            Err(e) => {
                self.config.host = previous;
                Err(e)
            }
        }
    }

    /// Change the probe interval (0-10000 ms) and restart
    pub async fn apply_interval(&mut self, interval_ms: i64) -> Result<IpAddr> {
        self.config.interval = ConfigValidator::validate_interval_ms(interval_ms)?;
        self.start().await
    }

    /// Change the desired history duration (1.0-300.0 s) without restarting
    pub fn apply_history_seconds(&mut self, seconds: f64) -> Result<()> {
        let seconds = ConfigValidator::validate_history_seconds(seconds)?;
        self.prober.set_history_seconds(seconds)?;
        self.config.history_seconds = seconds;
        Ok(())
    }

    /// Snapshot of the window plus statistics.
    ///
    /// Advances the display scale, so call it once per refresh.
    pub fn poll(&mut self) -> PollResult {
        let (samples, generation) = self.prober.buffer().snapshot_with_generation();
        let (rate, capacity) = self.prober.rate_and_capacity();

        let stats = StatsComputer::compute(&samples, capacity, rate, self.display_scale);
        self.display_scale = DisplayScale::new(stats.display_scale);
        self.last_seen_generation = generation;

        PollResult { samples, stats, generation }
    }

    /// True if the buffer changed since the last `poll`
    pub fn has_new_data(&self) -> bool {
        self.last_seen_generation != self.prober.buffer().generation()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.prober.is_running()
    }

    pub fn prober(&self) -> &Prober {
        &self.prober
    }

    pub fn display_scale(&self) -> f64 {
        self.display_scale.value()
    }
}
