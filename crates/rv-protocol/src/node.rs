//! Node identifier type

use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;

/// Name an agent registers under and clients look it up by.
///
/// A non-empty, case-sensitive token over `[A-Za-z0-9._-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(String);

impl NodeId {
    /// Validate and wrap a node identifier
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        if raw.is_empty() || !raw.bytes().all(is_node_id_byte) {
            return Err(ProtocolError::InvalidNodeId(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    /// Derive a valid identifier from arbitrary text (e.g. a hostname).
    ///
    /// Runs of disallowed characters become a single `-`, and leading or
    /// trailing dashes are stripped. Returns `None` if nothing is left.
    pub fn sanitize(raw: &str) -> Option<Self> {
        let mut cleaned = String::with_capacity(raw.len());
        let mut in_run = false;
        for c in raw.chars() {
            if c.is_ascii() && is_node_id_byte(c as u8) {
                cleaned.push(c);
                in_run = false;
            } else if !in_run {
                cleaned.push('-');
                in_run = true;
            }
        }
        let trimmed = cleaned.trim_matches('-');
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Get the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_node_id_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-')
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NodeId {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_node_ids() {
        for id in ["x1", "build-box", "node_01.lan", "A.b-C_d", "10.0.0.7"] {
            assert_eq!(NodeId::parse(id).unwrap().as_str(), id);
        }
    }

    #[test]
    fn test_invalid_node_ids() {
        for id in ["", "x!1", "bad id", "naïve", "a/b", "a:b"] {
            assert!(
                matches!(NodeId::parse(id), Err(ProtocolError::InvalidNodeId(_))),
                "{id:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_node_id_is_case_sensitive() {
        assert_ne!(NodeId::parse("Box").unwrap(), NodeId::parse("box").unwrap());
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(NodeId::sanitize("my laptop (home)").unwrap().as_str(), "my-laptop-home");
        assert_eq!(NodeId::sanitize("host.local").unwrap().as_str(), "host.local");
        assert_eq!(NodeId::sanitize("--édge--").unwrap().as_str(), "dge");
        assert!(NodeId::sanitize("!!!").is_none());
        assert!(NodeId::sanitize("").is_none());
    }
}
