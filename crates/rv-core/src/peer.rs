//! Buffered peer wrapper
//!
//! Header parsing usually pulls more bytes off the socket than the header
//! line itself. A [`Peer`] keeps those bytes and replays them before any
//! further reads, so nothing is lost or duplicated when the connection is
//! handed to the relay.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::TcpStream;

use rv_protocol::{read_line, ProtocolError};

/// How a peer's outbound direction is closed when the relay is done with it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseMode {
    /// Only the write side is shut down; reads keep working (TCP FIN)
    HalfClose,
    /// The transport cannot half-close: ending the write side ends the peer
    FullClose,
}

/// A byte stream plus the read-ahead left over from line parsing
#[derive(Debug)]
pub struct Peer<S> {
    stream: S,
    read_ahead: BytesMut,
    close_mode: CloseMode,
}

impl<S> Peer<S> {
    /// Wrap a stream with an empty read-ahead buffer
    pub fn new(stream: S, close_mode: CloseMode) -> Self {
        Self::with_read_ahead(stream, BytesMut::new(), close_mode)
    }

    /// Wrap a stream whose first bytes have already been read into `read_ahead`
    pub fn with_read_ahead(stream: S, read_ahead: BytesMut, close_mode: CloseMode) -> Self {
        Self {
            stream,
            read_ahead,
            close_mode,
        }
    }

    /// Close capability chosen when the peer was constructed
    pub fn close_mode(&self) -> CloseMode {
        self.close_mode
    }

    /// Bytes buffered but not yet handed to a reader
    pub fn buffered(&self) -> &[u8] {
        &self.read_ahead
    }

    /// Get a reference to the underlying stream
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Unwrap into the stream and the unread read-ahead
    pub fn into_parts(self) -> (S, BytesMut) {
        (self.stream, self.read_ahead)
    }
}

impl Peer<TcpStream> {
    /// Wrap a TCP connection; TCP supports half-close
    pub fn tcp(stream: TcpStream) -> Self {
        Self::new(stream, CloseMode::HalfClose)
    }
}

impl<S> Peer<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Read one newline-terminated line, keeping anything after it buffered
    pub async fn read_line(&mut self) -> Result<String, ProtocolError> {
        read_line(&mut self.stream, &mut self.read_ahead).await
    }

    /// Write a complete line (caller supplies the `\n`) and flush it
    pub async fn send_line(&mut self, line: &str) -> io::Result<()> {
        self.stream.write_all(line.as_bytes()).await?;
        self.stream.flush().await
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for Peer<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();

        if !this.read_ahead.is_empty() {
            let n = this.read_ahead.len().min(buf.remaining());
            buf.put_slice(&this.read_ahead[..n]);
            this.read_ahead.advance(n);
            return Poll::Ready(Ok(()));
        }

        Pin::new(&mut this.stream).poll_read(cx, buf)
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for Peer<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().stream).poll_write(cx, buf)
    }

    fn poll_write_vectored(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().stream).poll_write_vectored(cx, bufs)
    }

    fn is_write_vectored(&self) -> bool {
        self.stream.is_write_vectored()
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().stream).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().stream).poll_shutdown(cx)
    }
}
