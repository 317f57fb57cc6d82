//! `rv agent`

use anyhow::Result;

use rv_core::config::ConfigFile;

/// Run the agent loop until Ctrl+C or SIGTERM
pub async fn agent_command(
    config: ConfigFile,
    node_id: Option<String>,
    server: Option<String>,
    local_port: Option<u16>,
) -> Result<()> {
    rv_agent::run_from_config(config, node_id.as_deref(), server, local_port).await
}
