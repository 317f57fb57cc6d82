//! Broker startup shared by `rv-broker` and `rv serve`

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use rv_core::config::{BrokerConfig, ConfigFile};

use crate::server::Broker;

/// Broker settings from the config file with the `--bind` flag applied
pub fn broker_config(config: ConfigFile, bind: Option<String>) -> BrokerConfig {
    let mut broker = config.broker;
    if let Some(bind) = bind {
        broker.bind_address = bind;
    }
    broker
}

/// Run the broker until Ctrl+C or SIGTERM
pub async fn serve_from_config(config: ConfigFile, bind: Option<String>) -> Result<()> {
    let cancel = CancellationToken::new();
    rv_core::signal::cancel_on_shutdown(cancel.clone());

    Broker::new(broker_config(config, bind), cancel).run().await?;

    tracing::info!("Broker shutdown complete");
    Ok(())
}
