use crate::utils::{get_env_with_prefix, parse_duration};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Redis cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    pub redis_url: String,

    /// TTL applied when a caller does not pass one
    #[serde(default = "default_ttl_seconds")]
    pub default_ttl_seconds: u64,
}

fn default_ttl_seconds() -> u64 {
    7 * 24 * 60 * 60
}

impl CacheConfig {
    pub fn new(redis_url: impl Into<String>) -> Self {
        Self {
            redis_url: redis_url.into(),
            default_ttl_seconds: default_ttl_seconds(),
        }
    }

    /// `None` when `REDIS_URL` is unset or blank.
    ///
    /// `REDIS_KEYS_TTL` accepts `7d`, `12h` or plain seconds.
    pub fn from_env() -> Option<Self> {
        let url = get_env_with_prefix("REDIS_URL").filter(|url| !url.trim().is_empty())?;
        let mut config = Self::new(url);

        if let Some(ttl) = get_env_with_prefix("REDIS_KEYS_TTL") {
            match parse_duration(&ttl) {
                Some(ttl) => config.default_ttl_seconds = ttl.as_secs(),
                None => tracing::warn!(value = %ttl, "ignoring unparseable REDIS_KEYS_TTL"),
            }
        }

        Some(config)
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_live_a_week_by_default() {
        let config = CacheConfig::new("redis://127.0.0.1/");
        assert_eq!(config.default_ttl(), Duration::from_secs(604_800));
    }

    #[test]
    fn deserializes_with_default_ttl() {
        let config: CacheConfig =
            serde_json::from_str(r#"{"redis_url": "redis://cache:6379"}"#).unwrap();
        assert_eq!(config.default_ttl_seconds, 604_800);
    }
}
