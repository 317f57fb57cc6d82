//! Agent connection state

use std::fmt;

/// Where the agent is in its register-and-relay cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    /// Opening a connection to the broker
    Dialing,
    /// Sending the `AGENT <id>` header
    Registering,
    /// Waiting for the broker's `OK`
    AwaitAck,
    /// Connecting to the local service
    DialLocal,
    /// Relaying between broker and local service
    Relaying,
    /// Waiting before the next attempt
    BackoffSleep,
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AgentState::Dialing => "dialing broker",
            AgentState::Registering => "registering",
            AgentState::AwaitAck => "awaiting ack",
            AgentState::DialLocal => "dialing local service",
            AgentState::Relaying => "relaying",
            AgentState::BackoffSleep => "backing off",
        };
        f.write_str(name)
    }
}
