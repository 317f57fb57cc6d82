//! rv Broker Daemon
//!
//! Accepts agent registrations and client connections on a single TCP port
//! and relays paired connections.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rv_core::config::ConfigFile;

#[derive(Parser)]
#[command(name = "rv-broker")]
#[command(about = "rv rendezvous broker")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address (overrides config)
    #[arg(short, long)]
    bind: Option<String>,

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

    rv_broker::serve_from_config(config, args.bind).await
}
