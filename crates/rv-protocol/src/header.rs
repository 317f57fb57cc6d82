//! Header line parsing
//!
//! A header is `<ROLE> <node-id>` terminated by `\n`. The role tag is
//! case-insensitive; the node id is not.

use std::fmt;

use crate::error::ProtocolError;
use crate::node::NodeId;

/// Role announced by a connecting peer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Long-lived process offering a local service under a node id
    Agent,
    /// Short-lived process asking to be paired with an agent
    Client,
}

impl Role {
    /// Wire tag for this role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Agent => "AGENT",
            Role::Client => "CLIENT",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        if tag.eq_ignore_ascii_case("AGENT") {
            Some(Role::Agent)
        } else if tag.eq_ignore_ascii_case("CLIENT") {
            Some(Role::Client)
        } else {
            None
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed connection header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Role of the connecting peer
    pub role: Role,
    /// Node the peer registers as or asks for
    pub node_id: NodeId,
}

impl Header {
    /// Create a new header
    pub fn new(role: Role, node_id: NodeId) -> Self {
        Self { role, node_id }
    }

    /// Parse a header line (with or without its trailing newline).
    ///
    /// Field count is checked first, then the node id, then the role tag.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [tag, id] = fields.as_slice() else {
            return Err(ProtocolError::InvalidHeader(line.trim().to_string()));
        };

        let node_id = NodeId::parse(id)?;
        let role = Role::from_tag(tag).ok_or_else(|| ProtocolError::UnknownRole(tag.to_string()))?;

        Ok(Self { role, node_id })
    }

    /// Encode as a wire line including the terminating newline
    pub fn encode(&self) -> String {
        format!("{}\n", self)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.role, self.node_id)
    }
}
