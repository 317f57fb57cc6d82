//! Broker server implementation

mod handler;
mod listener;

pub use handler::{ConnectionHandler, Outcome};
pub use listener::{AgentRegistry, Broker};
