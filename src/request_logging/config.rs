use crate::utils::get_env_with_prefix;
use serde::{Deserialize, Serialize};

/// Level a request event is emitted at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

/// Access-log configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RequestLoggingConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// 1xx, 2xx and 3xx responses
    #[serde(default = "default_success_level")]
    pub success_level: LogLevel,

    #[serde(default = "default_client_error_level")]
    pub client_error_level: LogLevel,

    #[serde(default = "default_server_error_level")]
    pub server_error_level: LogLevel,
}

impl Default for RequestLoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            success_level: default_success_level(),
            client_error_level: default_client_error_level(),
            server_error_level: default_server_error_level(),
        }
    }
}

impl RequestLoggingConfig {
    /// Load from the `REQUEST_LOGGING_*` variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(enabled) = get_env_with_prefix("REQUEST_LOGGING_ENABLED") {
            config.enabled = enabled.parse().unwrap_or(true);
        }

        let levels = [
            ("REQUEST_LOGGING_SUCCESS_LEVEL", &mut config.success_level),
            ("REQUEST_LOGGING_CLIENT_ERROR_LEVEL", &mut config.client_error_level),
            ("REQUEST_LOGGING_SERVER_ERROR_LEVEL", &mut config.server_error_level),
        ];
        for (key, slot) in levels {
            if let Some(raw) = get_env_with_prefix(key) {
                match raw.parse() {
                    Ok(level) => *slot = level,
                    Err(e) => tracing::warn!(key, error = %e, "ignoring request log level"),
                }
            }
        }

        config
    }

    /// Level for a response status
    pub fn level_for(&self, status: axum::http::StatusCode) -> LogLevel {
        if status.is_server_error() {
            self.server_error_level
        } else if status.is_client_error() {
            self.client_error_level
        } else {
            self.success_level
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_success_level() -> LogLevel {
    LogLevel::Info
}

fn default_client_error_level() -> LogLevel {
    LogLevel::Warn
}

fn default_server_error_level() -> LogLevel {
    LogLevel::Error
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn level_follows_status_class() {
        let config = RequestLoggingConfig::default();
        assert_eq!(config.level_for(StatusCode::OK), LogLevel::Info);
        assert_eq!(config.level_for(StatusCode::SWITCHING_PROTOCOLS), LogLevel::Info);
        assert_eq!(config.level_for(StatusCode::UNAUTHORIZED), LogLevel::Warn);
        assert_eq!(config.level_for(StatusCode::SERVICE_UNAVAILABLE), LogLevel::Error);
    }

    #[test]
    fn log_level_parses() {
        assert_eq!("WARN".parse(), Ok(LogLevel::Warn));
        assert!("loud".parse::<LogLevel>().is_err());
    }
}
