//! Node id selection for the agent

use rv_core::{ConfigError, RvError};
use rv_protocol::NodeId;

/// Pick the node id to register as.
///
/// The first of `explicit`, `configured` and the machine's hostname that is
/// given is sanitized into a valid node id.
pub fn resolve_node_id(
    explicit: Option<&str>,
    configured: Option<&str>,
) -> Result<NodeId, RvError> {
    let (source, raw) = match explicit.or(configured) {
        Some(raw) => ("provided", raw.to_string()),
        None => (
            "hostname",
            gethostname::gethostname().to_string_lossy().into_owned(),
        ),
    };

    let node_id = NodeId::sanitize(&raw).ok_or_else(|| {
        ConfigError::Invalid(format!("{} node-id {:?} is empty after sanitization", source, raw))
    })?;

    if node_id.as_str() != raw {
        tracing::info!("Using node-id {} (from {} {:?})", node_id, source, raw);
    }
    Ok(node_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_wins_over_config() {
        let id = resolve_node_id(Some("cli-box"), Some("config-box")).unwrap();
        assert_eq!(id.as_str(), "cli-box");
    }

    #[test]
    fn test_config_used_when_no_flag() {
        let id = resolve_node_id(None, Some("config box")).unwrap();
        assert_eq!(id.as_str(), "config-box");
    }

    #[test]
    fn test_unusable_id_is_rejected() {
        let err = resolve_node_id(Some("***"), None).unwrap_err();
        assert!(matches!(err, RvError::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_hostname_fallback_is_valid() {
        // Every CI host has some hostname with at least one usable character
        if let Ok(id) = resolve_node_id(None, None) {
            assert!(NodeId::parse(id.as_str()).is_ok());
        }
    }
}
