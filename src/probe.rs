//! Low-level asynchronous TCP connect attempts.
//!
//! This module provides [`probe_once`], which opens a socket, bounds its
//! connect time at the socket level (see [`crate::sockopt`]) and measures
//! how long the handshake takes. The stream is dropped, and so closed, as
//! soon as the outcome is known.

use crate::{error::ProbeError, sockopt};
use std::{future::Future, net::SocketAddr};
use tokio::{
    net::TcpSocket,
    time::{Duration, Instant},
};

/// Capability for one timed connect to `addr`.
pub trait Connector: Send + Sync + 'static {
    /// Time from issuing the connect to the handshake completing.
    fn connect(&self, addr: SocketAddr) -> impl Future<Output = Result<Duration, ProbeError>> + Send;
}

/// Plain TCP handshake with a socket-level timeout.
#[derive(Copy, Clone, Debug)]
pub struct TcpConnector {
    timeout: Duration,
}

impl TcpConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self::new(sockopt::CONNECT_TIMEOUT)
    }
}

impl Connector for TcpConnector {
    fn connect(&self, addr: SocketAddr) -> impl Future<Output = Result<Duration, ProbeError>> + Send {
        probe_once(addr, self.timeout)
    }
}

/// Attempt one TCP connection and measure its round-trip time.
///
/// * `addr` – socket address to probe
/// * `to`   – socket-level bound on the connect
///
/// The clock starts right before `connect()` is issued, so socket setup is
/// not counted.
pub async fn probe_once(addr: SocketAddr, to: Duration) -> Result<Duration, ProbeError> {
    let socket = match addr {
        SocketAddr::V4(_) => TcpSocket::new_v4(),
        SocketAddr::V6(_) => TcpSocket::new_v6(),
    }
    .map_err(ProbeError::SocketCreationFailed)?;
    sockopt::apply_connect_timeout(&socket, to);

    let start = Instant::now();
    let stream = socket.connect(addr).await.map_err(ProbeError::ConnectFailed)?;
    let rtt = start.elapsed();
    drop(stream);

    Ok(rtt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn connects_to_local_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let rtt = TcpConnector::default().connect(addr).await.unwrap();
        assert!(rtt < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn refused_port_is_connect_failure() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };

        let err = probe_once(addr, sockopt::CONNECT_TIMEOUT).await.unwrap_err();
        assert!(matches!(err, ProbeError::ConnectFailed(_)));
        assert!(!err.to_string().is_empty());
    }
}
