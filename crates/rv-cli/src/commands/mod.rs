//! CLI command implementations

mod agent;
mod config;
mod proxy;
mod serve;

pub use agent::agent_command;
pub use config::{config_init, config_path, config_show, generate_default_config};
pub use proxy::proxy_command;
pub use serve::serve_command;
