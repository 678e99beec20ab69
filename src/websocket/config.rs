use super::connection::DEFAULT_CHANNEL_CAPACITY;
use crate::utils::get_env_with_prefix;
use serde::{Deserialize, Serialize};

/// WebSocket registry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebSocketConfig {
    /// Maximum concurrent connections (0 = unlimited)
    #[serde(default)]
    pub max_connections: usize,

    /// Outbound queue depth per connection. A peer that falls this far
    /// behind is treated as dead on the next broadcast.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            max_connections: 0,
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl WebSocketConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(max) = get_env_with_prefix("WS_MAX_CONNECTIONS") {
            if let Ok(val) = max.parse() {
                config.max_connections = val;
            }
        }

        if let Some(capacity) = get_env_with_prefix("WS_CHANNEL_CAPACITY") {
            if let Ok(val) = capacity.parse() {
                config.channel_capacity = val;
            }
        }

        config
    }
}

fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_unlimited_with_standard_queue() {
        let config = WebSocketConfig::default();
        assert_eq!(config.max_connections, 0);
        assert_eq!(config.channel_capacity, 1000);
    }
}
