use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::compression::CompressionConfig;
use crate::cors::CorsConfig;
use crate::error::{Result, WharfError};
use crate::ratelimit::RateLimitConfig;
use crate::request_logging::RequestLoggingConfig;
use crate::security::SecurityConfig;
use crate::timeout::TimeoutConfig;
use crate::utils::{get_env_with_prefix, parse_duration};
use crate::websocket::WebSocketConfig;

#[cfg(feature = "cache")]
use crate::cache::CacheConfig;
#[cfg(feature = "database")]
use crate::database::DatabaseConfig;

/// Placeholder signing secret. Refused in production.
pub const DEFAULT_SECRET_KEY: &str = "qweasd123";

/// Shortest signing secret accepted in production
pub const MIN_PROD_SECRET_LEN: usize = 32;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration for a wharf service
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Production mode tightens CORS and secret validation
    #[serde(default)]
    pub is_prod: bool,
    #[serde(default)]
    pub auth: AuthConfig,
    /// IANA zone used for calendar helpers
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub compression: CompressionConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub timeout: TimeoutConfig,
    #[serde(default)]
    pub request_logging: RequestLoggingConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub websocket: WebSocketConfig,
    #[cfg(feature = "database")]
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[cfg(feature = "cache")]
    #[serde(default)]
    pub cache: Option<CacheConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

/// Token signing settings
#[derive(Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default = "default_secret_key", skip_serializing)]
    pub secret_key: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_seconds: u64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_key", &"[REDACTED]")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .finish()
    }
}

impl AuthConfig {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            is_prod: false,
            auth: AuthConfig::default(),
            timezone: default_timezone(),
            compression: CompressionConfig::default(),
            security: SecurityConfig::default(),
            timeout: TimeoutConfig::default(),
            request_logging: RequestLoggingConfig::default(),
            cors: CorsConfig::default(),
            rate_limit: RateLimitConfig::default(),
            websocket: WebSocketConfig::default(),
            #[cfg(feature = "database")]
            database: None,
            #[cfg(feature = "cache")]
            cache: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_size: default_max_body_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: default_secret_key(),
            token_ttl_seconds: default_token_ttl(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "debug".to_string()
}

fn default_max_body_size() -> usize {
    50 * 1024 * 1024
}

fn default_secret_key() -> String {
    DEFAULT_SECRET_KEY.to_string()
}

fn default_token_ttl() -> u64 {
    5 * 60 * 60
}

fn default_timezone() -> String {
    "Asia/Manila".to_string()
}

impl ServerConfig {
    pub fn addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

impl Config {
    /// Load `.env`, read the environment and validate.
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        ConfigBuilder::new().from_env().build()
    }
}

/// Load `.env` from the working directory, else from beside the executable.
///
/// Returns the file that was loaded. A missing file is not an error.
pub fn load_dotenv() -> Option<PathBuf> {
    if let Ok(path) = dotenvy::dotenv() {
        return Some(path);
    }

    let beside_exe = std::env::current_exe().ok()?.parent()?.join(".env");
    dotenvy::from_path(&beside_exe).ok().map(|()| beside_exe)
}

/// Builder for [`Config`] with environment support
#[must_use = "builder does nothing until you call build()"]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.server.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.config.server.max_body_size = max_body_size;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.config.logging.json = enabled;
        self
    }

    pub fn with_prod(mut self, is_prod: bool) -> Self {
        self.config.is_prod = is_prod;
        self
    }

    pub fn with_secret_key(mut self, secret: impl Into<String>) -> Self {
        self.config.auth.secret_key = secret.into();
        self
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.config.auth.token_ttl_seconds = ttl.as_secs();
        self
    }

    pub fn with_timezone(mut self, tz: impl Into<String>) -> Self {
        self.config.timezone = tz.into();
        self
    }

    pub fn with_cors(mut self, cors: CorsConfig) -> Self {
        self.config.cors = cors;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.config.rate_limit = rate_limit;
        self
    }

    pub fn with_compression(mut self, compression: CompressionConfig) -> Self {
        self.config.compression = compression;
        self
    }

    pub fn with_security(mut self, security: SecurityConfig) -> Self {
        self.config.security = security;
        self
    }

    pub fn with_timeout(mut self, timeout: TimeoutConfig) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn with_request_logging(mut self, request_logging: RequestLoggingConfig) -> Self {
        self.config.request_logging = request_logging;
        self
    }

    pub fn with_websocket(mut self, websocket: WebSocketConfig) -> Self {
        self.config.websocket = websocket;
        self
    }

    #[cfg(feature = "database")]
    pub fn with_database(mut self, database: DatabaseConfig) -> Self {
        self.config.database = Some(database);
        self
    }

    #[cfg(feature = "cache")]
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.config.cache = Some(cache);
        self
    }

    /// Read `WHARF_`-prefixed or plain environment variables
    pub fn from_env(mut self) -> Self {
        if let Some(host) = get_env_with_prefix("HOST") {
            self.config.server.host = host;
        }
        if let Some(port) = get_env_with_prefix("PORT") {
            if let Ok(p) = port.parse() {
                self.config.server.port = p;
            }
        }
        if let Some(limit) = get_env_with_prefix("REQUEST_BODY_LIMIT_MB") {
            if let Ok(mb) = limit.parse::<usize>() {
                self.config.server.max_body_size = mb.saturating_mul(1024 * 1024);
            }
        }
        if let Some(level) = get_env_with_prefix("LOG_LEVEL") {
            let level = level.trim();
            self.config.logging.level = if level.is_empty() {
                default_log_level()
            } else {
                level.to_string()
            };
        }
        if let Some(json) = get_env_with_prefix("LOG_JSON") {
            self.config.logging.json = json.parse().unwrap_or(false);
        }
        if let Some(is_prod) = get_env_with_prefix("IS_PROD") {
            self.config.is_prod = is_prod.parse().unwrap_or(false);
        }
        if let Some(secret) = get_env_with_prefix("SECRET_KEY") {
            self.config.auth.secret_key = secret;
        }
        if let Some(ttl) = get_env_with_prefix("TOKEN_EXPIRE_TIME") {
            match parse_duration(&ttl) {
                Some(ttl) => self.config.auth.token_ttl_seconds = ttl.as_secs(),
                None => tracing::warn!(value = %ttl, "ignoring unparseable TOKEN_EXPIRE_TIME"),
            }
        }
        if let Some(tz) = get_env_with_prefix("TIMEZONE").filter(|tz| !tz.trim().is_empty()) {
            self.config.timezone = tz;
        }

        self.config.cors = CorsConfig::from_env();
        self.config.rate_limit = RateLimitConfig::from_env();
        self.config.compression = CompressionConfig::from_env();
        self.config.security = SecurityConfig::from_env();
        self.config.timeout = TimeoutConfig::from_env();
        self.config.request_logging = RequestLoggingConfig::from_env();
        self.config.websocket = WebSocketConfig::from_env();

        #[cfg(feature = "database")]
        {
            self.config.database = DatabaseConfig::from_env();
        }

        #[cfg(feature = "cache")]
        {
            self.config.cache = CacheConfig::from_env();
        }

        self
    }

    /// Validate and produce the configuration
    ///
    /// # Errors
    ///
    /// - unparseable host/port, zero port or zero body limit
    /// - unknown log level
    /// - zero rate-limit budget or window while enabled
    /// - in production: a short or default `SECRET_KEY`, or unusable CORS origins
    pub fn build(mut self) -> Result<Config> {
        let config = &mut self.config;

        config.server.addr().map_err(|e| {
            WharfError::bad_request(format!(
                "Invalid server address {}:{} - {}",
                config.server.host, config.server.port, e
            ))
        })?;

        if config.server.port == 0 {
            return Err(WharfError::bad_request("Server port must be greater than 0"));
        }

        if config.server.max_body_size == 0 {
            return Err(WharfError::bad_request(
                "Maximum body size must be greater than 0",
            ));
        }

        let level = config.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(WharfError::bad_request(format!(
                "Invalid log level: {}. Must be one of: {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }
        config.logging.level = level;

        if config.rate_limit.enabled {
            if config.rate_limit.max_requests == 0 {
                return Err(WharfError::bad_request(
                    "Rate limit max_requests must be greater than 0 when enabled",
                ));
            }
            if config.rate_limit.window_seconds == 0 {
                return Err(WharfError::bad_request(
                    "Rate limit window_seconds must be greater than 0 when enabled",
                ));
            }
        }

        if config.is_prod {
            let secret = &config.auth.secret_key;
            if secret == DEFAULT_SECRET_KEY {
                return Err(WharfError::bad_request(
                    "SECRET_KEY must be changed from the default in production",
                ));
            }
            if secret.len() < MIN_PROD_SECRET_LEN {
                return Err(WharfError::bad_request(format!(
                    "SECRET_KEY must be at least {MIN_PROD_SECRET_LEN} characters in production"
                )));
            }
            if config.cors.enabled {
                config.cors.effective_origins(true)?;
            }
        }

        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRONG_SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn defaults() {
        let config = ConfigBuilder::new().build().unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.max_body_size, 50 * 1024 * 1024);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.auth.secret_key, DEFAULT_SECRET_KEY);
        assert_eq!(config.auth.token_ttl(), Duration::from_secs(5 * 3600));
        assert_eq!(config.timezone, "Asia/Manila");
        assert!(!config.is_prod);
    }

    #[test]
    fn rejects_unknown_log_level() {
        let err = ConfigBuilder::new()
            .with_log_level("loud")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Invalid log level"));
    }

    #[test]
    fn log_level_is_normalised() {
        let config = ConfigBuilder::new().with_log_level("WARN").build().unwrap();
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn prod_rejects_default_secret() {
        let err = ConfigBuilder::new()
            .with_prod(true)
            .with_cors(CorsConfig::builder().allow_origin("https://app.example.com").build())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("default"));
    }

    #[test]
    fn prod_rejects_short_secret() {
        let err = ConfigBuilder::new()
            .with_prod(true)
            .with_secret_key("short-but-not-default")
            .with_cors(CorsConfig::builder().allow_origin("https://app.example.com").build())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("at least 32"));
    }

    #[test]
    fn prod_rejects_wildcard_origin() {
        let result = ConfigBuilder::new()
            .with_prod(true)
            .with_secret_key(STRONG_SECRET)
            .with_cors(CorsConfig::builder().allow_origin("*").build())
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn prod_rejects_missing_origins() {
        let result = ConfigBuilder::new()
            .with_prod(true)
            .with_secret_key(STRONG_SECRET)
            .with_cors(CorsConfig::builder().allow_origins(vec![]).build())
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn prod_accepts_strong_secret_and_explicit_origins() {
        let config = ConfigBuilder::new()
            .with_prod(true)
            .with_secret_key(STRONG_SECRET)
            .with_cors(CorsConfig::builder().allow_origin("https://app.example.com").build())
            .build()
            .unwrap();
        assert!(config.is_prod);
    }

    #[test]
    fn secret_is_never_printed() {
        let config = ConfigBuilder::new().with_secret_key(STRONG_SECRET).build().unwrap();
        assert!(!format!("{config:?}").contains(STRONG_SECRET));
        assert!(!serde_json::to_string(&config).unwrap().contains(STRONG_SECRET));
    }

    #[test]
    fn deserializes_partial_document() {
        let config: Config = serde_json::from_str(r#"{"server": {"port": 9000}}"#).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.timezone, "Asia/Manila");
    }
}
