//! rv CLI
//!
//! Single binary for all rv roles:
//! - Broker (accepts agent registrations and client connections)
//! - Agent (keeps a local service reachable through the broker)
//! - Proxy (bridges stdin/stdout to an agent, for `ssh -o ProxyCommand`)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rv_cli::commands;
use rv_cli::output::print_error;
use rv_core::config::ConfigFile;

#[derive(Parser)]
#[command(name = "rv")]
#[command(author, version, about = "TCP rendezvous relay for hosts behind NAT")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the broker
    Serve {
        /// Bind address (overrides config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Run an agent that exposes a local service through the broker
    Agent {
        /// Node id to register as (defaults to config, then hostname)
        node_id: Option<String>,
        /// Broker address (overrides config)
        #[arg(short, long, env = "RV_SERVER")]
        server: Option<String>,
        /// Local port clients are relayed to (overrides config)
        #[arg(short = 'p', long)]
        local_port: Option<u16>,
    },

    /// Relay stdin/stdout to an agent (use as an SSH ProxyCommand)
    Proxy {
        /// Node id of the agent
        node_id: String,
        /// Broker address (overrides config)
        #[arg(short, long, env = "RV_SERVER")]
        server: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Show current configuration
    Show,
    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli);

    match cli.command {
        Commands::Serve { bind } => {
            let config = load(&cli.config)?;
            commands::serve_command(config, bind).await?;
        }

        Commands::Agent {
            node_id,
            server,
            local_port,
        } => {
            let config = load(&cli.config)?;
            commands::agent_command(config, node_id, server, local_port).await?;
        }

        Commands::Proxy { node_id, server } => {
            let result = match load(&cli.config) {
                Ok(config) => commands::proxy_command(config, &node_id, server).await,
                Err(e) => Err(e),
            };
            let code = match result {
                Ok(()) => 0,
                Err(e) => {
                    print_error(&format!("{:#}", e));
                    1
                }
            };
            // A blocking stdin read may still be pending; don't wait on it
            std::process::exit(code);
        }

        Commands::Config { action } => match action {
            ConfigAction::Init { force } => {
                commands::config_init(cli.config.as_deref(), force)?;
            }
            ConfigAction::Show => {
                commands::config_show(cli.config.as_deref())?;
            }
            ConfigAction::Path => {
                commands::config_path(cli.config.as_deref());
            }
        },
    }

    Ok(())
}

fn load(path: &Option<PathBuf>) -> Result<ConfigFile> {
    ConfigFile::load_or_default(path.as_deref()).context("Failed to load configuration")
}

/// Install the tracing subscriber.
///
/// `proxy` owns stdout for relayed bytes, so it logs to stderr and only
/// warnings by default.
fn init_logging(cli: &Cli) {
    let proxy = matches!(cli.command, Commands::Proxy { .. });
    let default_level = if proxy { "warn" } else { "info" };
    let level = cli.log_level.as_deref().unwrap_or(default_level);

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string()),
    );

    if proxy {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }
}
