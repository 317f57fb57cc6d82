//! Agent configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::duration_secs;

/// Configuration for the agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Node id to register under (defaults to the sanitized hostname)
    pub node_id: Option<String>,

    /// Port of the local service on 127.0.0.1 that clients are relayed to
    pub local_port: u16,

    /// Fixed delay between registration attempts
    #[serde(with = "duration_secs")]
    pub backoff: Duration,

    /// Connection timeout for the broker and the local service
    #[serde(with = "duration_secs")]
    pub connect_timeout: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            node_id: None,
            local_port: 22,
            backoff: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl AgentConfig {
    /// Loopback address of the local service
    pub fn local_address(&self) -> String {
        format!("127.0.0.1:{}", self.local_port)
    }
}
