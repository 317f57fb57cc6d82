//! rv-agent: Agent side of the rv rendezvous
//!
//! The agent runs next to a local service (typically sshd) on a machine
//! without inbound connectivity. It dials out to the broker, registers under
//! a node id and, once paired with a client, relays between the broker
//! connection and the local service. Then it registers again.

pub mod daemon;
pub mod node;
pub mod runner;
pub mod state;
pub mod tunnel;

pub use daemon::{run_from_config, AgentSettings};
pub use node::resolve_node_id;
pub use runner::Agent;
pub use state::AgentState;
