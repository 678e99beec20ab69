use crate::utils::{get_env_with_prefix, parse_duration};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-request timeout
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl TimeoutConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Load from `TIMEOUT_ENABLED` and `REQUEST_TIMEOUT`.
    ///
    /// `REQUEST_TIMEOUT` takes a duration such as `30s` or `2m`; a bare
    /// number is seconds. Sub-second values round up to one second.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(enabled) = get_env_with_prefix("TIMEOUT_ENABLED") {
            config.enabled = enabled.parse().unwrap_or(true);
        }

        match get_env_with_prefix("REQUEST_TIMEOUT").map(|raw| (parse_duration(&raw), raw)) {
            Some((Some(d), _)) => config.timeout_seconds = whole_seconds(d),
            Some((None, raw)) => tracing::warn!(value = %raw, "ignoring unparseable REQUEST_TIMEOUT"),
            None => {}
        }

        config
    }
}

fn whole_seconds(d: Duration) -> u64 {
    if d.is_zero() {
        0
    } else {
        d.as_secs() + u64::from(d.subsec_nanos() > 0)
    }
}

fn default_enabled() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    30
}
