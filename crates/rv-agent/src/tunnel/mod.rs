//! Tunnel management for connecting to the broker

mod connector;
mod reconnect;

pub use connector::{ActiveTunnel, AttemptError, TunnelConnector};
pub use reconnect::FixedBackoff;
