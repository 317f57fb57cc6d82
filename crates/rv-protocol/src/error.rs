//! Protocol error types

use thiserror::Error;

use crate::reply;

/// Errors that can occur while reading or parsing a header line
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Header does not consist of exactly two fields
    #[error("Invalid header: {0:?}")]
    InvalidHeader(String),

    /// Node identifier does not match `[A-Za-z0-9._-]+`
    #[error("Invalid node-id: {0:?}")]
    InvalidNodeId(String),

    /// Role tag is neither AGENT nor CLIENT
    #[error("Unknown role: {0:?}")]
    UnknownRole(String),

    /// No newline within the header size limit
    #[error("Header exceeds {max} bytes")]
    HeaderTooLong { max: usize },

    /// Header did not arrive before the deadline
    #[error("Timed out waiting for header")]
    HeaderTimeout,

    /// Stream ended before a complete line was received
    #[error("Connection closed before end of line")]
    Truncated,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    /// Reason sent back to the peer as `ERROR: <reason>`.
    ///
    /// Returns `None` for failures that are answered by closing the
    /// connection without a reply (timeouts, truncation, I/O errors).
    pub fn reply_reason(&self) -> Option<&'static str> {
        match self {
            ProtocolError::InvalidHeader(_) | ProtocolError::HeaderTooLong { .. } => {
                Some(reply::INVALID_HEADER)
            }
            ProtocolError::InvalidNodeId(_) => Some(reply::INVALID_NODE_ID),
            ProtocolError::UnknownRole(_) => Some(reply::UNKNOWN_TYPE),
            ProtocolError::HeaderTimeout | ProtocolError::Truncated | ProtocolError::Io(_) => None,
        }
    }
}
