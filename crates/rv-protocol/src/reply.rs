//! Broker reply lines

use std::fmt;

/// Reason for a header with the wrong number of fields
pub const INVALID_HEADER: &str = "invalid header";
/// Reason for a node id outside `[A-Za-z0-9._-]+`
pub const INVALID_NODE_ID: &str = "invalid node-id";
/// Reason for a role tag other than AGENT/CLIENT
pub const UNKNOWN_TYPE: &str = "unknown type";
/// Reason for a second registration under a pending node id
pub const ALREADY_REGISTERED: &str = "node-id already registered";
/// Reason for a client asking for a node with no pending agent
pub const AGENT_OFFLINE: &str = "agent offline";

/// Broker answer to a header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Header accepted
    Ok,
    /// Header rejected, with reason
    Error(String),
    /// Anything else the peer sent back
    Unexpected(String),
}

impl Reply {
    /// Build an error reply
    pub fn error(reason: impl Into<String>) -> Self {
        Reply::Error(reason.into())
    }

    /// Interpret a received reply line
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed == "OK" {
            Reply::Ok
        } else if let Some(reason) = trimmed.strip_prefix("ERROR:") {
            Reply::Error(reason.trim().to_string())
        } else {
            Reply::Unexpected(trimmed.to_string())
        }
    }

    /// Encode as a wire line including the terminating newline
    pub fn encode(&self) -> String {
        format!("{}\n", self)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok => f.write_str("OK"),
            Reply::Error(reason) => write!(f, "ERROR: {}", reason),
            Reply::Unexpected(text) => f.write_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(Reply::Ok.encode(), "OK\n");
        assert_eq!(
            Reply::error(ALREADY_REGISTERED).encode(),
            "ERROR: node-id already registered\n"
        );
        assert_eq!(Reply::error(AGENT_OFFLINE).encode(), "ERROR: agent offline\n");
    }

    #[test]
    fn test_parse() {
        assert_eq!(Reply::parse("OK\n"), Reply::Ok);
        assert_eq!(Reply::parse("  OK \r\n"), Reply::Ok);
        assert_eq!(
            Reply::parse("ERROR: agent offline\n"),
            Reply::Error("agent offline".to_string())
        );
        assert_eq!(Reply::parse("ok"), Reply::Unexpected("ok".to_string()));
        assert_eq!(Reply::parse(""), Reply::Unexpected(String::new()));
    }
}
