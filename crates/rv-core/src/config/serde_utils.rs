//! Shared serde helpers for configuration

/// Serialize `std::time::Duration` as whole seconds.
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Config {
///     #[serde(with = "rv_core::config::serde_utils::duration_secs")]
///     timeout: Duration,
/// }
/// ```
pub mod duration_secs {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    /// Serialize a Duration as seconds (u64)
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    /// Deserialize a Duration from seconds (u64)
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
