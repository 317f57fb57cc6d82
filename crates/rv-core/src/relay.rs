//! Full-duplex relay between two peers
//!
//! Each direction runs in its own task. When one direction sees end-of-stream
//! it shuts down the destination's write side; for peers that cannot
//! half-close, the destination's read side is ended as well. The relay
//! returns after both directions finish and then drops both peers.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

use crate::error::RvError;
use crate::peer::{CloseMode, Peer};

/// Copy buffer size per direction
const RELAY_BUFFER_SIZE: usize = 16 * 1024;

/// Outcome of one relay direction
#[derive(Debug, Default)]
pub struct DirectionStats {
    /// Bytes written to the destination
    pub bytes: u64,
    /// Error that ended this direction early, if any
    pub error: Option<RvError>,
}

/// Outcome of a finished relay
#[derive(Debug, Default)]
pub struct RelayStats {
    /// Bytes copied from the first peer to the second
    pub a_to_b: DirectionStats,
    /// Bytes copied from the second peer to the first
    pub b_to_a: DirectionStats,
}

impl RelayStats {
    /// True if neither direction ended with an error
    pub fn is_clean(&self) -> bool {
        self.a_to_b.error.is_none() && self.b_to_a.error.is_none()
    }
}

/// One direction's reader, writer and close signals
struct Pump<R, W> {
    reader: R,
    writer: W,
    /// Cancelled when the source peer has been fully closed
    source_closed: CancellationToken,
    /// Cancelled by us when we fully close the destination
    dest_closed: CancellationToken,
    dest_mode: CloseMode,
    /// Cancelled to end the whole relay early
    stop: CancellationToken,
}

impl<R, W> Pump<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    async fn run(mut self) -> (DirectionStats, R, W) {
        let mut stats = DirectionStats::default();
        let mut buf = vec![0u8; RELAY_BUFFER_SIZE];

        loop {
            let n = tokio::select! {
                result = self.reader.read(&mut buf) => match result {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(e) => {
                        stats.error = Some(RvError::Relay(e));
                        break;
                    }
                },
                _ = self.source_closed.cancelled() => break,
                _ = self.stop.cancelled() => break,
            };

            if let Err(e) = write_chunk(&mut self.writer, &buf[..n]).await {
                stats.error = Some(RvError::Relay(e));
                break;
            }
            stats.bytes += n as u64;
        }

        if let Err(e) = self.writer.shutdown().await {
            tracing::trace!("Shutdown after relay direction ended: {}", e);
        }
        if self.dest_mode == CloseMode::FullClose {
            self.dest_closed.cancel();
        }

        (stats, self.reader, self.writer)
    }
}

/// Collect a joined direction and drop its halves, closing the peers
fn finish<R, W>(joined: Result<(DirectionStats, R, W), JoinError>) -> DirectionStats {
    match joined {
        Ok((stats, reader, writer)) => {
            drop(reader);
            drop(writer);
            stats
        }
        Err(e) => DirectionStats {
            bytes: 0,
            error: Some(RvError::Relay(io::Error::other(e))),
        },
    }
}

async fn write_chunk<W: AsyncWrite + Unpin>(writer: &mut W, chunk: &[u8]) -> io::Result<()> {
    writer.write_all(chunk).await?;
    writer.flush().await
}

/// Relay bytes between `a` and `b` until both directions have ended.
///
/// An error in one direction ends only that direction. Both peers are
/// dropped before this returns.
pub async fn relay<A, B>(a: Peer<A>, b: Peer<B>) -> RelayStats
where
    A: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    B: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    relay_until(a, b, CancellationToken::new()).await
}

/// Like [`relay`], but both directions also end once `stop` is cancelled.
///
/// Both copy tasks are still joined before returning.
pub async fn relay_until<A, B>(a: Peer<A>, b: Peer<B>, stop: CancellationToken) -> RelayStats
where
    A: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    B: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let a_closed = CancellationToken::new();
    let b_closed = CancellationToken::new();
    let a_mode = a.close_mode();
    let b_mode = b.close_mode();

    let (a_read, a_write) = tokio::io::split(a);
    let (b_read, b_write) = tokio::io::split(b);

    let a_to_b = tokio::spawn(
        Pump {
            reader: a_read,
            writer: b_write,
            source_closed: a_closed.clone(),
            dest_closed: b_closed.clone(),
            dest_mode: b_mode,
            stop: stop.clone(),
        }
        .run(),
    );
    let b_to_a = tokio::spawn(
        Pump {
            reader: b_read,
            writer: a_write,
            source_closed: b_closed,
            dest_closed: a_closed,
            dest_mode: a_mode,
            stop,
        }
        .run(),
    );

    let (a_to_b, b_to_a) = tokio::join!(a_to_b, b_to_a);
    let stats = RelayStats {
        a_to_b: finish(a_to_b),
        b_to_a: finish(b_to_a),
    };

    tracing::debug!(
        "Relay finished: {} bytes a->b, {} bytes b->a",
        stats.a_to_b.bytes,
        stats.b_to_a.bytes
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use tokio::io::duplex;

    #[tokio::test]
    async fn test_relay_both_directions() {
        let (mut left, a) = duplex(1024);
        let (mut right, b) = duplex(1024);

        let relay = tokio::spawn(relay(
            Peer::new(a, CloseMode::HalfClose),
            Peer::new(b, CloseMode::HalfClose),
        ));

        left.write_all(b"ping").await.unwrap();
        left.shutdown().await.unwrap();
        let mut got = Vec::new();
        right.read_to_end(&mut got).await.unwrap();
        assert_eq!(got, b"ping");

        right.write_all(b"pong").await.unwrap();
        right.shutdown().await.unwrap();
        let mut got = Vec::new();
        left.read_to_end(&mut got).await.unwrap();
        assert_eq!(got, b"pong");

        let stats = relay.await.unwrap();
        assert!(stats.is_clean());
        assert_eq!(stats.a_to_b.bytes, 4);
        assert_eq!(stats.b_to_a.bytes, 4);
    }

    #[tokio::test]
    async fn test_relay_replays_read_ahead() {
        let (mut left, a) = duplex(1024);
        let (mut right, b) = duplex(1024);

        let a = Peer::with_read_ahead(a, BytesMut::from(&b"early-"[..]), CloseMode::HalfClose);
        let relay = tokio::spawn(relay(a, Peer::new(b, CloseMode::HalfClose)));

        left.write_all(b"late").await.unwrap();
        left.shutdown().await.unwrap();
        right.shutdown().await.unwrap();

        let mut got = Vec::new();
        right.read_to_end(&mut got).await.unwrap();
        assert_eq!(got, b"early-late");

        let stats = relay.await.unwrap();
        assert_eq!(stats.a_to_b.bytes, 10);
    }

    #[tokio::test]
    async fn test_stop_ends_idle_relay() {
        let (_left, a) = duplex(1024);
        let (_right, b) = duplex(1024);
        let stop = CancellationToken::new();

        let relay = tokio::spawn(relay_until(
            Peer::new(a, CloseMode::HalfClose),
            Peer::new(b, CloseMode::HalfClose),
            stop.clone(),
        ));

        stop.cancel();
        let stats = relay.await.unwrap();
        assert!(stats.is_clean());
    }

    #[tokio::test]
    async fn test_full_close_ends_other_direction() {
        let (mut left, a) = duplex(1024);
        // `_right` is never closed by the test: the relay must still finish
        // because the full-close peer `b` gets torn down when `a` hits EOF.
        let (_right, b) = duplex(1024);

        let relay = tokio::spawn(relay(
            Peer::new(a, CloseMode::HalfClose),
            Peer::new(b, CloseMode::FullClose),
        ));

        left.shutdown().await.unwrap();
        let stats = relay.await.unwrap();
        assert_eq!(stats.a_to_b.bytes, 0);
        assert_eq!(stats.b_to_a.bytes, 0);
    }
}
