//! Redis cache configuration.

use serde::Deserialize;

/// Configuration for the Redis latest-value cache.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Redis connection URL.
    pub url: String,
    /// Key prefix; full keys are `{key_prefix}:{sensor_id}`.
    pub key_prefix: String,
    /// Optional expiry for cached values, in seconds. `None` keeps
    /// values until overwritten.
    pub ttl_secs: Option<u64>,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            key_prefix: "sensor".to_string(),
            ttl_secs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_have_sensible_defaults() {
        let config = RedisConfig::default();
        assert_eq!(config.url, "redis://localhost:6379");
        assert_eq!(config.key_prefix, "sensor");
        assert!(config.ttl_secs.is_none());
    }

    #[test]
    fn should_deserialize_from_toml() {
        let toml = r#"
            url = "redis://cache.internal:6380/1"
            key_prefix = "farm42"
            ttl_secs = 3600
        "#;
        let config: RedisConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.url, "redis://cache.internal:6380/1");
        assert_eq!(config.key_prefix, "farm42");
        assert_eq!(config.ttl_secs, Some(3600));
    }
}
