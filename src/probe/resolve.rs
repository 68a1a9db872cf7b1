//! Target host resolution

use crate::error::{AppError, Result};
use std::net::IpAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use trust_dns_resolver::{
    config::{ResolverConfig, ResolverOpts},
    system_conf,
    TokioAsyncResolver,
};

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolves a host string to the single address a session probes.
///
/// Literal addresses never touch DNS. Names go through a lazily built
/// resolver using the system configuration.
#[derive(Clone, Default)]
pub struct HostResolver {
    resolver: Arc<OnceLock<TokioAsyncResolver>>,
}

impl HostResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn resolve(&self, host: &str) -> Result<IpAddr> {
        let host = host.trim();
        if host.is_empty() {
            return Err(AppError::resolution("Host is empty"));
        }

        if let Some(addr) = parse_literal(host) {
            return Ok(addr);
        }

        // RFC 6761 special-use names
        let lowered = host.trim_end_matches('.').to_ascii_lowercase();
        if lowered == "invalid" || lowered.ends_with(".invalid") {
            return Err(AppError::resolution(format!("Cannot resolve {}: reserved invalid name", host)));
        }
        if lowered == "localhost" {
            return Ok(IpAddr::from([127, 0, 0, 1]));
        }

        let lookup = tokio::time::timeout(LOOKUP_TIMEOUT, self.resolver().lookup_ip(host))
            .await
            .map_err(|_| AppError::resolution(format!("Lookup of {} timed out after {:?}", host, LOOKUP_TIMEOUT)))?
            .map_err(|e| AppError::resolution(format!("Cannot resolve {}: {}", host, e)))?;

        let addresses: Vec<IpAddr> = lookup.iter().collect();
        pick_address(&addresses)
            .ok_or_else(|| AppError::resolution(format!("No addresses found for {}", host)))
    }

    fn resolver(&self) -> &TokioAsyncResolver {
        self.resolver.get_or_init(|| {
            let (config, opts) = system_conf::read_system_conf()
                .unwrap_or_else(|_| (ResolverConfig::default(), ResolverOpts::default()));
            TokioAsyncResolver::tokio(config, opts)
        })
    }
}

/// Literal IPv4 or IPv6 address, with or without brackets
pub fn parse_literal(host: &str) -> Option<IpAddr> {
    let unbracketed = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    unbracketed.parse().ok()
}

/// First IPv4 answer, else the first answer of any family
pub fn pick_address(addresses: &[IpAddr]) -> Option<IpAddr> {
    addresses
        .iter()
        .find(|a| a.is_ipv4())
        .or_else(|| addresses.first())
        .copied()
}
