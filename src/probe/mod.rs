//! Probe transports
//!
//! The probing loop talks to the network through [`ProbeTransport`], which
//! acquires a [`ProbeChannel`] for one resolved target per session. The
//! channel sends a single echo request per call and reports how it ended;
//! timing is measured by the caller.

pub mod icmp;
pub mod resolve;
pub mod simulated;

use crate::error::Result;
use crate::models::Config;
use crate::types::ProbeOutcome;
use async_trait::async_trait;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

pub use icmp::IcmpTransport;
pub use resolve::HostResolver;
pub use simulated::{ScriptedTransport, SimulatedTransport};

/// Source of probe channels
#[async_trait]
pub trait ProbeTransport: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Acquire the probing resource for `target`.
    ///
    /// Fails with `AppError::Resource` when the channel cannot be opened.
    async fn open(&self, target: IpAddr) -> Result<Box<dyn ProbeChannel>>;
}

/// An open channel to one target
#[async_trait]
pub trait ProbeChannel: Send {
    /// Send one echo request and wait up to `timeout` for the matching reply
    async fn echo(&mut self, timeout: Duration) -> ProbeOutcome;
}

/// Transport selected by the configuration
pub fn transport_for(config: &Config) -> Arc<dyn ProbeTransport> {
    if config.simulate {
        Arc::new(SimulatedTransport::default())
    } else {
        Arc::new(IcmpTransport::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_selection() {
        let mut config = Config::default();
        assert_eq!(transport_for(&config).name(), "icmp");
        config.simulate = true;
        assert_eq!(transport_for(&config).name(), "simulated");
    }
}
