//! rv-core: Core abstractions and configuration for rv
//!
//! This crate provides the buffered peer wrapper, the duplex relay engine,
//! the dialing abstraction and the configuration structures shared by the
//! broker, the agent and the CLI.

pub mod config;
pub mod dial;
pub mod error;
pub mod peer;
pub mod relay;
pub mod signal;

pub use dial::{Dialer, TcpDialer};
pub use error::{ConfigError, RvError};
pub use peer::{CloseMode, Peer};
pub use relay::{relay, relay_until, RelayStats};
