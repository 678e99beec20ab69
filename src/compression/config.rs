use crate::utils::get_env_with_prefix;
use serde::{Deserialize, Serialize};

/// Gzip effort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// Best throughput
    #[default]
    Fastest,
    Default,
    /// Smallest output
    Best,
}

impl CompressionLevel {
    pub(crate) fn to_tower(self) -> tower_http::CompressionLevel {
        match self {
            Self::Fastest => tower_http::CompressionLevel::Fastest,
            Self::Default => tower_http::CompressionLevel::Default,
            Self::Best => tower_http::CompressionLevel::Best,
        }
    }
}

/// Response compression configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompressionConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub level: CompressionLevel,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            level: CompressionLevel::default(),
        }
    }
}

impl CompressionConfig {
    /// Load from `COMPRESSION_ENABLED` and `COMPRESSION_LEVEL`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(enabled) = get_env_with_prefix("COMPRESSION_ENABLED") {
            config.enabled = enabled.parse().unwrap_or(true);
        }

        if let Some(level) = get_env_with_prefix("COMPRESSION_LEVEL") {
            config.level = match level.to_ascii_lowercase().as_str() {
                "default" => CompressionLevel::Default,
                "best" => CompressionLevel::Best,
                _ => CompressionLevel::Fastest,
            };
        }

        config
    }
}

fn default_enabled() -> bool {
    true
}
