//! rv-broker: Rendezvous broker pairing clients with agents
//!
//! Agents behind NAT dial in and register under a node id; clients dial in
//! and name the node they want. The broker hands the waiting agent
//! connection to the client and relays bytes between them.

pub mod daemon;
pub mod registry;
pub mod server;

pub use daemon::serve_from_config;
pub use registry::{Registry, Reservation};
pub use server::{Broker, ConnectionHandler, Outcome};
