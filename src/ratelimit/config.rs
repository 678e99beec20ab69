use crate::utils::get_env_with_prefix;
use serde::{Deserialize, Serialize};

/// How requests are bucketed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitStrategy {
    /// One shared bucket for every client
    Global,
    /// One bucket per client IP
    #[default]
    PerIp,
}

impl std::str::FromStr for RateLimitStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "global" => Ok(Self::Global),
            "per_ip" | "ip" => Ok(Self::PerIp),
            other => Err(format!(
                "rate limit strategy must be 'global' or 'per_ip', got '{other}'"
            )),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Requests allowed per window
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,

    #[serde(default)]
    pub strategy: RateLimitStrategy,

    /// Read the client IP from `X-Forwarded-For` / `X-Real-IP`.
    ///
    /// Only safe behind a proxy that overwrites those headers; otherwise
    /// clients can pick their own bucket.
    #[serde(default)]
    pub trust_proxy: bool,

    /// Paths (and their sub-paths) that are never limited
    #[serde(default = "default_exempt_paths")]
    pub exempt_paths: Vec<String>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_requests: default_max_requests(),
            window_seconds: default_window_seconds(),
            strategy: RateLimitStrategy::default(),
            trust_proxy: false,
            exempt_paths: default_exempt_paths(),
        }
    }
}

impl RateLimitConfig {
    pub fn builder() -> RateLimitConfigBuilder {
        RateLimitConfigBuilder::new()
    }

    /// Load from the `RATE_LIMIT_*` variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(enabled) = get_env_with_prefix("RATE_LIMIT_ENABLED") {
            config.enabled = enabled.parse().unwrap_or(true);
        }

        if let Some(max_requests) = get_env_with_prefix("RATE_LIMIT_MAX_REQUESTS") {
            if let Ok(val) = max_requests.parse() {
                config.max_requests = val;
            }
        }

        if let Some(window) = get_env_with_prefix("RATE_LIMIT_WINDOW_SECONDS") {
            if let Ok(val) = window.parse() {
                config.window_seconds = val;
            }
        }

        if let Some(strategy) = get_env_with_prefix("RATE_LIMIT_STRATEGY") {
            match strategy.parse() {
                Ok(strategy) => config.strategy = strategy,
                Err(e) => tracing::warn!(error = %e, "ignoring RATE_LIMIT_STRATEGY"),
            }
        }

        if let Some(trust_proxy) = get_env_with_prefix("RATE_LIMIT_TRUST_PROXY") {
            config.trust_proxy = trust_proxy.parse().unwrap_or(false);
        }

        config
    }

    /// Whether `path` bypasses the limiter
    pub fn is_exempt(&self, path: &str) -> bool {
        self.exempt_paths.iter().any(|exempt| {
            path == exempt
                || path
                    .strip_prefix(exempt.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

/// Builder for RateLimitConfig
#[must_use = "builder does nothing until you call build()"]
pub struct RateLimitConfigBuilder {
    config: RateLimitConfig,
}

impl RateLimitConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RateLimitConfig::default(),
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    pub fn max_requests(mut self, max: u32) -> Self {
        self.config.max_requests = max;
        self
    }

    pub fn window_seconds(mut self, seconds: u64) -> Self {
        self.config.window_seconds = seconds;
        self
    }

    pub fn per_ip(mut self) -> Self {
        self.config.strategy = RateLimitStrategy::PerIp;
        self
    }

    pub fn global(mut self) -> Self {
        self.config.strategy = RateLimitStrategy::Global;
        self
    }

    pub fn trust_proxy(mut self, trust: bool) -> Self {
        self.config.trust_proxy = trust;
        self
    }

    pub fn exempt_path(mut self, path: impl Into<String>) -> Self {
        self.config.exempt_paths.push(path.into());
        self
    }

    pub fn build(self) -> RateLimitConfig {
        self.config
    }
}

impl Default for RateLimitConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn default_enabled() -> bool {
    true
}

fn default_max_requests() -> u32 {
    100
}

fn default_window_seconds() -> u64 {
    60
}

fn default_exempt_paths() -> Vec<String> {
    vec!["/health".to_string(), "/api/health".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_100_per_minute_per_ip() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.max_requests, 100);
        assert_eq!(config.window_seconds, 60);
        assert_eq!(config.strategy, RateLimitStrategy::PerIp);
        assert!(!config.trust_proxy);
    }

    #[test]
    fn strategy_parses() {
        assert_eq!("global".parse(), Ok(RateLimitStrategy::Global));
        assert_eq!(" PER_IP ".parse(), Ok(RateLimitStrategy::PerIp));
        assert!("per_user".parse::<RateLimitStrategy>().is_err());
    }

    #[test]
    fn health_paths_are_exempt() {
        let config = RateLimitConfig::default();
        assert!(config.is_exempt("/api/health"));
        assert!(config.is_exempt("/health/live"));
        assert!(!config.is_exempt("/healthz"));
        assert!(!config.is_exempt("/api/v1/me"));
    }

    #[test]
    fn builder() {
        let config = RateLimitConfig::builder()
            .max_requests(200)
            .window_seconds(120)
            .global()
            .exempt_path("/metrics")
            .build();

        assert_eq!(config.max_requests, 200);
        assert_eq!(config.window_seconds, 120);
        assert_eq!(config.strategy, RateLimitStrategy::Global);
        assert!(config.is_exempt("/metrics"));
    }
}
