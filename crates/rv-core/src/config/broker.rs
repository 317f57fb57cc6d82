//! Broker configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::duration_secs;

/// Configuration for the rendezvous broker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Address to accept agent and client connections on
    pub bind_address: String,

    /// How long a new connection may take to send its header
    #[serde(with = "duration_secs")]
    pub header_timeout: Duration,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8443".to_string(),
            header_timeout: Duration::from_secs(30),
        }
    }
}
