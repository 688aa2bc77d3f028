//! Single-port TCP connect probe.
//!
//! A probe makes exactly one connection attempt, bounded by the configured
//! timeout, and classifies what happened. It completes the full handshake,
//! so it needs no privileges but is visible to the target.

use crate::error::ProbeError;
use crate::types::Port;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// Classification of one connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The connection was accepted.
    Open,
    /// The connection was actively refused.
    Closed,
    /// Timeout, unreachable host or network, or another I/O failure.
    Error(ProbeError),
}

impl ProbeOutcome {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Error(e) => write!(f, "error ({})", e),
        }
    }
}

/// A probe outcome tagged with the port it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub port: Port,
    pub outcome: ProbeOutcome,
}

impl ProbeResult {
    pub fn new(port: Port, outcome: ProbeOutcome) -> Self {
        Self { port, outcome }
    }
}

/// Something that can probe one port on one host.
///
/// The dispatcher is generic over this so alternative probe strategies (or
/// scripted ones in tests) can drive the same pool.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe `target:port` once, giving up after `timeout`.
    async fn probe(&self, target: IpAddr, port: Port, timeout: Duration) -> ProbeOutcome;
}

/// Full TCP connect prober using the operating system's socket API.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnectProber;

impl TcpConnectProber {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Prober for TcpConnectProber {
    async fn probe(&self, target: IpAddr, port: Port, limit: Duration) -> ProbeOutcome {
        let addr = SocketAddr::new(target, port.as_u16());

        // On timeout the pending connect future is dropped, which closes its socket.
        let outcome = match timeout(limit, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                ProbeOutcome::Open
            }
            Ok(Err(e)) => classify_io_error(&e),
            Err(_) => ProbeOutcome::Error(ProbeError::Timeout),
        };

        trace!(%addr, %outcome, "probe finished");
        outcome
    }
}

/// Map a failed connect to an outcome.
fn classify_io_error(e: &io::Error) -> ProbeOutcome {
    match e.kind() {
        io::ErrorKind::ConnectionRefused => ProbeOutcome::Closed,
        io::ErrorKind::TimedOut => ProbeOutcome::Error(ProbeError::Timeout),
        io::ErrorKind::HostUnreachable => ProbeOutcome::Error(ProbeError::HostUnreachable),
        io::ErrorKind::NetworkUnreachable => ProbeOutcome::Error(ProbeError::NetworkUnreachable),
        _ => ProbeOutcome::Error(ProbeError::Io(e.to_string())),
    }
}

/// Serializes as the short lowercase label (`open`, `closed`, `error`).
impl Serialize for ProbeOutcome {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let label = match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Error(_) => "error",
        };
        serializer.serialize_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::net::TcpListener;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    /// A port that was just bound and released, so nothing is listening on it.
    async fn closed_port() -> Port {
        let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        Port::new(port).unwrap()
    }

    #[test]
    fn test_classify_errors() {
        let refused = io::Error::from(io::ErrorKind::ConnectionRefused);
        assert_eq!(classify_io_error(&refused), ProbeOutcome::Closed);

        let timed_out = io::Error::from(io::ErrorKind::TimedOut);
        assert_eq!(
            classify_io_error(&timed_out),
            ProbeOutcome::Error(ProbeError::Timeout)
        );

        let unreachable = io::Error::from(io::ErrorKind::HostUnreachable);
        assert_eq!(
            classify_io_error(&unreachable),
            ProbeOutcome::Error(ProbeError::HostUnreachable)
        );

        let other = io::Error::new(io::ErrorKind::Other, "boom");
        assert!(matches!(
            classify_io_error(&other),
            ProbeOutcome::Error(ProbeError::Io(_))
        ));
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(ProbeOutcome::Open.to_string(), "open");
        assert_eq!(ProbeOutcome::Closed.to_string(), "closed");
        assert_eq!(
            ProbeOutcome::Error(ProbeError::Timeout).to_string(),
            "error (connection timed out)"
        );
    }

    #[tokio::test]
    async fn test_probe_open_port() {
        let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        let port = Port::new(listener.local_addr().unwrap().port()).unwrap();

        let outcome = TcpConnectProber
            .probe(LOCALHOST, port, Duration::from_secs(1))
            .await;
        assert_eq!(outcome, ProbeOutcome::Open);
    }

    #[tokio::test]
    async fn test_probe_closed_port_never_open() {
        let port = closed_port().await;

        for _ in 0..2 {
            let outcome = TcpConnectProber
                .probe(LOCALHOST, port, Duration::from_millis(500))
                .await;
            assert_ne!(outcome, ProbeOutcome::Open);
        }
    }
}
