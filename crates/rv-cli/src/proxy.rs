//! Client proxy
//!
//! Connects to the broker as a client for one node id and relays a pair of
//! local streams (normally stdin/stdout, as an OpenSSH `ProxyCommand`)
//! through the paired agent.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use rv_core::{relay, CloseMode, Dialer, Peer, RelayStats, RvError};
use rv_protocol::{Header, NodeId, Reply, Role};

/// Where to connect and which agent to ask for
#[derive(Debug, Clone)]
pub struct ProxyOptions {
    /// Broker address (`host:port`)
    pub server: String,
    /// Node id of the agent to reach
    pub node_id: NodeId,
}

/// Dial the broker and request a session with `opts.node_id`.
///
/// Returns the broker connection with any bytes received after the ack still
/// buffered. An `ERROR:` reply becomes [`RvError::Rejected`]; the broker
/// closing before replying is a protocol error.
pub async fn dial<D: Dialer>(dialer: &D, opts: &ProxyOptions) -> Result<Peer<D::Stream>, RvError> {
    let mut broker = dialer.dial(&opts.server).await?;

    let header = Header::new(Role::Client, opts.node_id.clone());
    broker.send_line(&header.encode()).await?;

    let line = broker.read_line().await?;
    match Reply::parse(&line) {
        Reply::Error(reason) => Err(RvError::Rejected(reason)),
        Reply::Ok => Ok(broker),
        Reply::Unexpected(other) => {
            tracing::debug!("Treating broker reply {:?} as accepted", other);
            Ok(broker)
        }
    }
}

/// Dial the broker, then relay `input`/`output` against the agent until both
/// directions are finished.
pub async fn run<D, R, W>(
    dialer: &D,
    opts: &ProxyOptions,
    input: R,
    output: W,
) -> Result<RelayStats, RvError>
where
    D: Dialer,
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let broker = dial(dialer, opts).await?;
    tracing::debug!("Connected to {} via {}", opts.node_id, opts.server);

    // A pair of pipes cannot half-close as one endpoint
    let local = Peer::new(StdioPair::new(input, output), CloseMode::FullClose);
    let stats = relay(broker, local).await;

    if let Some(e) = stats.a_to_b.error.as_ref().or(stats.b_to_a.error.as_ref()) {
        tracing::warn!("Proxy relay for {} ended with error: {}", opts.node_id, e);
    }
    Ok(stats)
}

/// Joins a reader and a writer into one duplex stream
#[derive(Debug)]
pub struct StdioPair<R, W> {
    reader: R,
    writer: W,
}

impl<R, W> StdioPair<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl<R: AsyncRead + Unpin, W: Unpin> AsyncRead for StdioPair<R, W> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().reader).poll_read(cx, buf)
    }
}

impl<R: Unpin, W: AsyncWrite + Unpin> AsyncWrite for StdioPair<R, W> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().writer).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().writer).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().writer).poll_shutdown(cx)
    }
}
