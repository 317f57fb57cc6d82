//! Configuration management for rv

mod agent;
mod broker;
pub mod serde_utils;

pub use agent::AgentConfig;
pub use broker::BrokerConfig;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Broker address used when neither a flag nor the config names one
pub const DEFAULT_SERVER: &str = "localhost:8443";

/// Get the default configuration directory
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rv")
}

/// Get the default configuration file path
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Load configuration from a file
pub fn load_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read config: {}", e)))?;

    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to a file
pub fn save_config<T: serde::Serialize>(path: &Path, config: &T) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(config)?;

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ConfigError::Invalid(format!("Failed to create config dir: {}", e)))?;
    }

    std::fs::write(path, content)
        .map_err(|e| ConfigError::Invalid(format!("Failed to write config: {}", e)))?;

    Ok(())
}

/// Per-node overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeOverride {
    /// Broker address to use for this node
    pub server: Option<String>,
}

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Default broker address for `agent` and `proxy`
    pub server: Option<String>,

    /// Broker settings
    pub broker: BrokerConfig,

    /// Agent settings
    pub agent: AgentConfig,

    /// Overrides keyed by node id
    pub nodes: BTreeMap<String, NodeOverride>,
}

impl ConfigFile {
    /// Load from `path`, or from the default path if it exists.
    ///
    /// An explicitly given path must exist; a missing default file yields
    /// the default configuration.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => load_config(path),
            None => {
                let default_path = default_config_path();
                if default_path.exists() {
                    load_config(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Broker address for `node_id`: node override, then global, then default
    pub fn server_for(&self, node_id: Option<&str>) -> String {
        node_id
            .and_then(|id| self.nodes.get(id))
            .and_then(|node| node.server.clone())
            .or_else(|| self.server.clone())
            .unwrap_or_else(|| DEFAULT_SERVER.to_string())
    }
}
