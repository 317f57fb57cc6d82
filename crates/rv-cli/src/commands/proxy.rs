//! `rv proxy`

use anyhow::{Context, Result};

use rv_core::config::ConfigFile;
use rv_core::TcpDialer;
use rv_protocol::NodeId;

use crate::proxy::{self, ProxyOptions};

/// Relay stdin/stdout to the agent registered as `node_id`
pub async fn proxy_command(
    config: ConfigFile,
    node_id: &str,
    server: Option<String>,
) -> Result<()> {
    let node_id = NodeId::parse(node_id).context("Invalid node id")?;
    let server = server.unwrap_or_else(|| config.server_for(Some(node_id.as_str())));

    let opts = ProxyOptions { server, node_id };
    let dialer = TcpDialer::new(config.agent.connect_timeout);
    proxy::run(&dialer, &opts, tokio::io::stdin(), tokio::io::stdout())
        .await
        .with_context(|| format!("Failed to reach {} via {}", opts.node_id, opts.server))?;
    Ok(())
}
