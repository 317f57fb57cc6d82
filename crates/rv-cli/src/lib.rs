//! rv-cli: Command-line interface for rv
//!
//! Provides the `rv` binary, which runs the broker, the agent or the client
//! proxy, plus the configuration helpers.

pub mod commands;
pub mod output;
pub mod proxy;
