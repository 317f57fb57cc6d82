//! Agent startup shared by `rv-agent` and `rv agent`

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use rv_core::config::{AgentConfig, ConfigFile};
use rv_core::{RvError, TcpDialer};
use rv_protocol::NodeId;

use crate::node::resolve_node_id;
use crate::runner::Agent;
use crate::tunnel::{FixedBackoff, TunnelConnector};

/// Agent settings after applying flags over the config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSettings {
    /// Node id to register as
    pub node_id: NodeId,
    /// Broker address
    pub server: String,
    /// Agent section with the local port override applied
    pub agent: AgentConfig,
}

impl AgentSettings {
    /// Resolve settings with flag > config > default precedence.
    ///
    /// The broker address falls back to the per-node override for the
    /// resolved node id, then the global `server`.
    pub fn resolve(
        config: ConfigFile,
        node_id: Option<&str>,
        server: Option<String>,
        local_port: Option<u16>,
    ) -> Result<Self, RvError> {
        let node_id = resolve_node_id(node_id, config.agent.node_id.as_deref())?;
        let server = server.unwrap_or_else(|| config.server_for(Some(node_id.as_str())));

        let mut agent = config.agent;
        if let Some(port) = local_port {
            agent.local_port = port;
        }

        Ok(Self {
            node_id,
            server,
            agent,
        })
    }
}

/// Run the agent loop until Ctrl+C or SIGTERM
pub async fn run_from_config(
    config: ConfigFile,
    node_id: Option<&str>,
    server: Option<String>,
    local_port: Option<u16>,
) -> Result<()> {
    let settings = AgentSettings::resolve(config, node_id, server, local_port)
        .context("Failed to determine node id")?;

    let connector = TunnelConnector::new(
        TcpDialer::new(settings.agent.connect_timeout),
        settings.server,
        settings.node_id,
        settings.agent.local_address(),
    );
    let agent = Agent::new(connector, FixedBackoff::from_config(&settings.agent));

    let cancel = CancellationToken::new();
    rv_core::signal::cancel_on_shutdown(cancel.clone());

    agent.run(cancel).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rv_core::config::{NodeOverride, DEFAULT_SERVER};

    fn config() -> ConfigFile {
        let mut config = ConfigFile {
            server: Some("global:8443".to_string()),
            ..ConfigFile::default()
        };
        config.agent.node_id = Some("from-config".to_string());
        config.agent.local_port = 2222;
        config.nodes.insert(
            "pinned".to_string(),
            NodeOverride {
                server: Some("pinned-broker:8443".to_string()),
            },
        );
        config
    }

    #[test]
    fn test_config_values_used_without_flags() {
        let settings = AgentSettings::resolve(config(), None, None, None).unwrap();
        assert_eq!(settings.node_id.as_str(), "from-config");
        assert_eq!(settings.server, "global:8443");
        assert_eq!(settings.agent.local_address(), "127.0.0.1:2222");
    }

    #[test]
    fn test_flags_override_config() {
        let settings = AgentSettings::resolve(
            config(),
            Some("cli-node"),
            Some("flag:1".to_string()),
            Some(22),
        )
        .unwrap();
        assert_eq!(settings.node_id.as_str(), "cli-node");
        assert_eq!(settings.server, "flag:1");
        assert_eq!(settings.agent.local_port, 22);
    }

    #[test]
    fn test_per_node_server_follows_resolved_id() {
        let settings = AgentSettings::resolve(config(), Some("pinned"), None, None).unwrap();
        assert_eq!(settings.server, "pinned-broker:8443");
    }

    #[test]
    fn test_default_server_when_unconfigured() {
        let settings =
            AgentSettings::resolve(ConfigFile::default(), Some("n1"), None, None).unwrap();
        assert_eq!(settings.server, DEFAULT_SERVER);
        assert_eq!(settings.agent, AgentConfig::default());
    }
}
