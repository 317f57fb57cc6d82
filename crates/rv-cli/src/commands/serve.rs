//! `rv serve`

use anyhow::Result;

use rv_core::config::ConfigFile;

/// Run the broker until Ctrl+C or SIGTERM
pub async fn serve_command(config: ConfigFile, bind: Option<String>) -> Result<()> {
    rv_broker::serve_from_config(config, bind).await
}
