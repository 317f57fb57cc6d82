//! Outbound connection abstraction
//!
//! The agent and the client proxy only ever talk to the network through a
//! [`Dialer`], which also decides the close capability of each new peer.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use crate::error::RvError;
use crate::peer::Peer;

/// Opens outbound connections
#[async_trait]
pub trait Dialer: Send + Sync {
    /// Stream type produced by this dialer
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    /// Connect to `addr` (`host:port`)
    async fn dial(&self, addr: &str) -> Result<Peer<Self::Stream>, RvError>;
}

/// Plain TCP dialer with a connect timeout
#[derive(Debug, Clone)]
pub struct TcpDialer {
    connect_timeout: Duration,
}

impl TcpDialer {
    /// Create a dialer that gives up after `connect_timeout`
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for TcpDialer {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl Dialer for TcpDialer {
    type Stream = TcpStream;

    async fn dial(&self, addr: &str) -> Result<Peer<TcpStream>, RvError> {
        tracing::debug!("Dialing {}", addr);

        let stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| RvError::Connect {
                addr: addr.to_string(),
                source: io::Error::new(io::ErrorKind::TimedOut, "connection timed out"),
            })?
            .map_err(|source| RvError::Connect {
                addr: addr.to_string(),
                source,
            })?;

        if let Err(e) = stream.set_nodelay(true) {
            tracing::trace!("Failed to set TCP_NODELAY on {}: {}", addr, e);
        }

        Ok(Peer::tcp(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer::CloseMode;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_tcp_dialer_connects_half_close_peer() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let dialer = TcpDialer::default();
        let (peer, accepted) = tokio::join!(dialer.dial(&addr), listener.accept());

        assert_eq!(peer.unwrap().close_mode(), CloseMode::HalfClose);
        assert!(accepted.is_ok());
    }

    #[tokio::test]
    async fn test_tcp_dialer_refused() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let err = TcpDialer::default().dial(&addr).await.unwrap_err();
        assert!(matches!(err, RvError::Connect { .. }));
    }
}
