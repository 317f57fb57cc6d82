//! Config command implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::output::{print_error, print_info, print_success, print_warning};
use rv_core::config;

fn resolve(config_path: Option<&Path>) -> PathBuf {
    config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config::default_config_path)
}

/// Print the config file path
pub fn config_path(config_path: Option<&Path>) {
    println!("{}", resolve(config_path).display());
}

/// Show current configuration
pub fn config_show(config_path: Option<&Path>) -> Result<()> {
    let path = resolve(config_path);

    if !path.exists() {
        print_warning(&format!("No configuration file found at {:?}", path));
        print_info("Run 'rv config init' to create one");
        return Ok(());
    }

    print_info(&format!("Configuration file: {:?}", path));

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    // Refuse to show something the other commands would fail to load
    let _: config::ConfigFile = config::load_config(&path)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    println!("{}", content);
    Ok(())
}

/// Write a default configuration file
pub fn config_init(config_path: Option<&Path>, force: bool) -> Result<()> {
    let path = resolve(config_path);

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {:?}", dir))?;
            print_success(&format!("Created config directory: {:?}", dir));
        }
    }

    if path.exists() && !force {
        print_error(&format!("Config file already exists: {:?}", path));
        print_info("Use --force to overwrite");
        return Ok(());
    }

    std::fs::write(&path, generate_default_config())
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    print_success(&format!("Created configuration file: {:?}", path));
    Ok(())
}

/// Default configuration content
pub fn generate_default_config() -> String {
    format!(
        r#"# rv configuration

# Broker used by `rv agent` and `rv proxy` when --server is not given
server = "{server}"

[broker]
# Address the broker listens on
bind_address = "0.0.0.0:8443"

# Seconds a new connection has to send its header
header_timeout = 30

[agent]
# Node id to register as (defaults to the hostname)
# node_id = "build-box"

# Local service each client is relayed to
local_port = 22

# Seconds between registration attempts
backoff = 2

# Seconds to wait when dialing the broker or the local service
connect_timeout = 10

# Per-node broker overrides
# [nodes.build-box]
# server = "other-broker.example.com:8443"
"#,
        server = config::DEFAULT_SERVER
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rv_core::config::ConfigFile;

    #[test]
    fn test_default_config_matches_defaults() {
        let parsed: ConfigFile = toml::from_str(&generate_default_config()).unwrap();
        let expected = ConfigFile {
            server: Some(config::DEFAULT_SERVER.to_string()),
            ..ConfigFile::default()
        };
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_init_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        config_init(Some(&path), false).unwrap();
        assert!(path.exists());

        std::fs::write(&path, "server = \"mine:1\"\n").unwrap();
        config_init(Some(&path), false).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "server = \"mine:1\"\n"
        );

        config_init(Some(&path), true).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            generate_default_config()
        );
    }
}
