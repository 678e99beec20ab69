use crate::error::{Result, WharfError};
use crate::utils::get_env_with_prefix;
use serde::{Deserialize, Serialize};

/// Origin used when nothing usable is configured outside production
pub const DEV_DEFAULT_ORIGIN: &str = "http://localhost:3000";

/// CORS configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Exact origins; `*` is never honoured because credentials are allowed
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    #[serde(default = "default_allowed_methods")]
    pub allowed_methods: Vec<String>,

    #[serde(default = "default_allowed_headers")]
    pub allowed_headers: Vec<String>,

    #[serde(default = "default_allow_credentials")]
    pub allow_credentials: bool,

    /// Preflight cache lifetime in seconds
    #[serde(default = "default_max_age")]
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            allowed_origins: Vec::new(),
            allowed_methods: default_allowed_methods(),
            allowed_headers: default_allowed_headers(),
            allow_credentials: default_allow_credentials(),
            max_age_seconds: default_max_age(),
        }
    }
}

impl CorsConfig {
    pub fn builder() -> CorsConfigBuilder {
        CorsConfigBuilder::new()
    }

    /// Load from `ALLOWED_ORIGINS` and the `CORS_*` knobs
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(enabled) = get_env_with_prefix("CORS_ENABLED") {
            config.enabled = enabled.parse().unwrap_or(true);
        }

        if let Some(origins) = get_env_with_prefix("ALLOWED_ORIGINS") {
            config.allowed_origins = split_list(&origins);
        }

        if let Some(methods) = get_env_with_prefix("CORS_ALLOWED_METHODS") {
            config.allowed_methods = split_list(&methods);
        }

        if let Some(headers) = get_env_with_prefix("CORS_ALLOWED_HEADERS") {
            config.allowed_headers = split_list(&headers);
        }

        if let Some(max_age) = get_env_with_prefix("CORS_MAX_AGE") {
            if let Ok(val) = max_age.parse() {
                config.max_age_seconds = val;
            }
        }

        config
    }

    /// Origins the layer will actually allow.
    ///
    /// Wildcards are dropped. Outside production an empty result falls back
    /// to [`DEV_DEFAULT_ORIGIN`]; in production it is an error.
    pub fn effective_origins(&self, is_prod: bool) -> Result<Vec<String>> {
        if is_prod && self.allowed_origins.iter().any(|o| o.trim() == "*") {
            return Err(WharfError::bad_request(
                "ALLOWED_ORIGINS must not contain '*' in production when credentials are allowed",
            ));
        }

        let origins: Vec<String> = self
            .allowed_origins
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty() && *o != "*")
            .map(str::to_string)
            .collect();

        if origins.is_empty() {
            if is_prod {
                return Err(WharfError::bad_request(
                    "ALLOWED_ORIGINS must be set in production",
                ));
            }
            if self.allowed_origins.iter().any(|o| o.trim() == "*") {
                tracing::warn!(
                    default = DEV_DEFAULT_ORIGIN,
                    "wildcard origin not allowed with credentials, using default"
                );
            }
            return Ok(vec![DEV_DEFAULT_ORIGIN.to_string()]);
        }

        Ok(origins)
    }
}

/// Builder for CorsConfig
#[must_use = "builder does nothing until you call build()"]
pub struct CorsConfigBuilder {
    config: CorsConfig,
}

impl CorsConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: CorsConfig::default(),
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    pub fn allow_origin(mut self, origin: impl Into<String>) -> Self {
        self.config.allowed_origins.push(origin.into());
        self
    }

    pub fn allow_origins(mut self, origins: Vec<String>) -> Self {
        self.config.allowed_origins = origins;
        self
    }

    pub fn allow_credentials(mut self, allow: bool) -> Self {
        self.config.allow_credentials = allow;
        self
    }

    pub fn max_age(mut self, seconds: u64) -> Self {
        self.config.max_age_seconds = seconds;
        self
    }

    pub fn build(self) -> CorsConfig {
        self.config
    }
}

impl Default for CorsConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn default_enabled() -> bool {
    true
}

fn default_allowed_methods() -> Vec<String> {
    ["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS", "HEAD"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_allowed_headers() -> Vec<String> {
    [
        "origin",
        "content-type",
        "accept",
        "authorization",
        "accept-language",
        "content-length",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_allow_credentials() -> bool {
    true
}

fn default_max_age() -> u64 {
    3600
}
