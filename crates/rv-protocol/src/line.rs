//! Newline-delimited line reading with read-ahead retention
//!
//! The reader may pull more bytes off the stream than the line itself. Those
//! bytes are left in the caller's buffer so they can be replayed before any
//! later reads from the stream.

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::ProtocolError;

/// Maximum length of a header or reply line, terminator included
pub const MAX_HEADER_LEN: usize = 1024;

/// Bytes requested from the stream per read
const READ_CHUNK: usize = 512;

/// Read one `\n`-terminated line.
///
/// `buf` may already hold bytes; they are scanned first. On success the line
/// is returned without its `\n` (and without a trailing `\r`), and `buf`
/// holds whatever followed the newline. Invalid UTF-8 is replaced with
/// U+FFFD so field checks can classify it. A line longer than
/// [`MAX_HEADER_LEN`] is rejected even when it arrives in a single read.
pub async fn read_line<R>(reader: &mut R, buf: &mut BytesMut) -> Result<String, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut scanned = 0;
    loop {
        let limit = buf.len().min(MAX_HEADER_LEN);
        if let Some(pos) = buf[scanned..limit].iter().position(|&b| b == b'\n') {
            let end = scanned + pos;
            let line = buf.split_to(end + 1);
            let text = String::from_utf8_lossy(&line[..end]);
            let text: &str = &text;
            return Ok(text.strip_suffix('\r').unwrap_or(text).to_string());
        }

        scanned = limit;
        if scanned >= MAX_HEADER_LEN {
            return Err(ProtocolError::HeaderTooLong {
                max: MAX_HEADER_LEN,
            });
        }

        buf.reserve(READ_CHUNK);
        if reader.read_buf(buf).await? == 0 {
            tracing::trace!("Stream closed after {} bytes without newline", scanned);
            return Err(ProtocolError::Truncated);
        }
    }
}
