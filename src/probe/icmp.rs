//! ICMP echo over a datagram (unprivileged) or raw socket

use super::{ProbeChannel, ProbeTransport};
use crate::error::{AppError, Result};
use crate::types::ProbeOutcome;
use async_trait::async_trait;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;

const ECHO_REQUEST_V4: u8 = 8;
const ECHO_REPLY_V4: u8 = 0;
const ECHO_REQUEST_V6: u8 = 128;
const ECHO_REPLY_V6: u8 = 129;

const ICMP_HEADER_LEN: usize = 8;
const PAYLOAD_LEN: usize = 32;
const PAYLOAD_TAG: &[u8] = b"PingPlotData";
const RECV_BUFFER_LEN: usize = 1500;

/// How the socket was opened; decides what the kernel does to our packets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketKind {
    /// `SOCK_DGRAM` ICMP. The kernel owns the identifier and strips the IP header.
    Datagram,
    /// `SOCK_RAW` ICMP. Requires privileges; IPv4 replies carry the IP header.
    Raw,
}

/// Opens ICMP echo channels, preferring unprivileged datagram sockets
#[derive(Debug, Clone, Default)]
pub struct IcmpTransport;

impl IcmpTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProbeTransport for IcmpTransport {
    fn name(&self) -> &'static str {
        "icmp"
    }

    async fn open(&self, target: IpAddr) -> Result<Box<dyn ProbeChannel>> {
        let (socket, kind) = open_socket(target)?;
        let socket = UdpSocket::from_std(socket)
            .map_err(|e| AppError::resource(format!("Cannot register ICMP socket for {}: {}", target, e)))?;
        Ok(Box::new(IcmpChannel::new(socket, target, kind)))
    }
}

fn open_socket(target: IpAddr) -> Result<(std::net::UdpSocket, SocketKind)> {
    let (domain, protocol) = match target {
        IpAddr::V4(_) => (Domain::IPV4, Protocol::ICMPV4),
        IpAddr::V6(_) => (Domain::IPV6, Protocol::ICMPV6),
    };

    let (socket, kind) = match Socket::new(domain, Type::DGRAM, Some(protocol)) {
        Ok(socket) => (socket, SocketKind::Datagram),
        Err(dgram_error) => match Socket::new(domain, Type::RAW, Some(protocol)) {
            Ok(socket) => (socket, SocketKind::Raw),
            Err(raw_error) => {
                return Err(AppError::resource(format!(
                    "Cannot open ICMP socket for {} (datagram: {}; raw: {})",
                    target, dgram_error, raw_error
                )));
            }
        },
    };

    socket.set_nonblocking(true)
        .map_err(|e| AppError::resource(format!("Cannot make ICMP socket non-blocking: {}", e)))?;
    socket.connect(&SocketAddr::new(target, 0).into())
        .map_err(|e| AppError::resource(format!("Cannot connect ICMP socket to {}: {}", target, e)))?;

    Ok((socket.into(), kind))
}

/// Echo channel bound to one target for the lifetime of a session
pub struct IcmpChannel {
    socket: UdpSocket,
    target: IpAddr,
    kind: SocketKind,
    identifier: u16,
    sequence: u16,
    buf: Vec<u8>,
}

impl IcmpChannel {
    fn new(socket: UdpSocket, target: IpAddr, kind: SocketKind) -> Self {
        Self {
            socket,
            target,
            kind,
            identifier: rand::random(),
            sequence: 0,
            buf: vec![0; RECV_BUFFER_LEN],
        }
    }
}

#[async_trait]
impl ProbeChannel for IcmpChannel {
    async fn echo(&mut self, timeout: Duration) -> ProbeOutcome {
        self.sequence = self.sequence.wrapping_add(1);
        let sequence = self.sequence;
        let request = encode_echo_request(self.target.is_ipv6(), self.identifier, sequence);

        let deadline = tokio::time::Instant::now() + timeout;
        match tokio::time::timeout_at(deadline, self.socket.send(&request)).await {
            Err(_) => return ProbeOutcome::TimedOut,
            Ok(Err(e)) => return ProbeOutcome::Unreachable(format!("send to {} failed: {}", self.target, e)),
            Ok(Ok(_)) => {}
        }

        // The kernel rewrites the identifier on datagram sockets
        let identifier = match self.kind {
            SocketKind::Datagram => None,
            SocketKind::Raw => Some(self.identifier),
        };

        loop {
            match tokio::time::timeout_at(deadline, self.socket.recv(&mut self.buf)).await {
                Err(_) => return ProbeOutcome::TimedOut,
                Ok(Err(e)) => return ProbeOutcome::Unreachable(format!("{} unreachable: {}", self.target, e)),
                Ok(Ok(len)) => {
                    if is_matching_reply(&self.buf[..len], self.target.is_ipv6(), identifier, sequence) {
                        return ProbeOutcome::Reply;
                    }
                    // Stale reply from an earlier timed-out probe, or unrelated traffic
                }
            }
        }
    }
}

/// Build an echo request with the fixed tagged payload.
///
/// ICMPv6 checksums cover a pseudo-header and are filled in by the kernel.
pub fn encode_echo_request(ipv6: bool, identifier: u16, sequence: u16) -> Vec<u8> {
    let mut packet = vec![0u8; ICMP_HEADER_LEN + PAYLOAD_LEN];
    packet[0] = if ipv6 { ECHO_REQUEST_V6 } else { ECHO_REQUEST_V4 };
    packet[4..6].copy_from_slice(&identifier.to_be_bytes());
    packet[6..8].copy_from_slice(&sequence.to_be_bytes());
    packet[ICMP_HEADER_LEN..ICMP_HEADER_LEN + PAYLOAD_TAG.len()].copy_from_slice(PAYLOAD_TAG);

    if !ipv6 {
        let sum = checksum(&packet);
        packet[2..4].copy_from_slice(&sum.to_be_bytes());
    }
    packet
}

/// Whether `packet` is the echo reply for `sequence`.
///
/// IPv4 packets from raw sockets start with the IP header, which is skipped.
/// `identifier` is checked only when given.
pub fn is_matching_reply(packet: &[u8], ipv6: bool, identifier: Option<u16>, sequence: u16) -> bool {
    let icmp = if !ipv6 && packet.first().map(|b| b >> 4) == Some(4) {
        let header_len = usize::from(packet[0] & 0x0f) * 4;
        match packet.get(header_len..) {
            Some(rest) => rest,
            None => return false,
        }
    } else {
        packet
    };

    if icmp.len() < ICMP_HEADER_LEN {
        return false;
    }

    let reply_type = if ipv6 { ECHO_REPLY_V6 } else { ECHO_REPLY_V4 };
    if icmp[0] != reply_type || icmp[1] != 0 {
        return false;
    }

    let reply_identifier = u16::from_be_bytes([icmp[4], icmp[5]]);
    let reply_sequence = u16::from_be_bytes([icmp[6], icmp[7]]);
    reply_sequence == sequence && identifier.map_or(true, |id| id == reply_identifier)
}

/// RFC 1071 Internet checksum
pub fn checksum(data: &[u8]) -> u16 {
    let mut sum: u32 = 0;
    let mut chunks = data.chunks_exact(2);
    for chunk in &mut chunks {
        sum += u32::from(u16::from_be_bytes([chunk[0], chunk[1]]));
    }
    if let [last] = chunks.remainder() {
        sum += u32::from(*last) << 8;
    }
    while sum >> 16 != 0 {
        sum = (sum & 0xffff) + (sum >> 16);
    }
    !(sum as u16)
}
