//! rv Agent Daemon
//!
//! Keeps a registration open at the broker and relays each paired client to
//! a local service.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rv_core::config::ConfigFile;

#[derive(Parser)]
#[command(name = "rv-agent")]
#[command(about = "rv agent - exposes a local service through the broker")]
#[command(version)]
struct Args {
    /// Node id to register as (defaults to config, then hostname)
    node_id: Option<String>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Broker address (overrides config)
    #[arg(short, long, env = "RV_SERVER")]
    server: Option<String>,

    /// Local port to relay clients to (overrides config)
    #[arg(short = 'p', long)]
    local_port: Option<u16>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| args.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ConfigFile::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;

    rv_agent::run_from_config(config, args.node_id.as_deref(), args.server, args.local_port).await
}
