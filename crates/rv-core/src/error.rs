//! Core error types for rv

use rv_protocol::{NodeId, ProtocolError};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the rv ecosystem
#[derive(Error, Debug)]
pub enum RvError {
    /// Dialing a broker or local service failed
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed header, unknown role, bad node id or header timeout
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// An agent is already pending under this node id
    #[error("Node {0} is already registered")]
    RegistrationConflict(NodeId),

    /// No agent is pending under this node id
    #[error("No agent available for node {0}")]
    PeerUnavailable(NodeId),

    /// The broker answered a header with an error line
    #[error("Broker rejected request: {0}")]
    Rejected(String),

    /// I/O failure while relaying bytes
    #[error("Relay error: {0}")]
    Relay(#[source] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
