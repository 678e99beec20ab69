use super::config::TimeoutConfig;
use tower_http::timeout::TimeoutLayer;

/// Build a TimeoutLayer, or `None` when disabled.
///
/// The layer wraps the whole router, so it also bounds the websocket
/// upgrade handshake. The upgraded socket itself runs detached from the
/// request and is not subject to it.
pub fn build_timeout_layer(config: &TimeoutConfig) -> Option<TimeoutLayer> {
    (config.enabled && config.timeout_seconds > 0).then(|| TimeoutLayer::new(config.duration()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_or_zero_builds_nothing() {
        let disabled = TimeoutConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(build_timeout_layer(&disabled).is_none());

        let zero = TimeoutConfig {
            enabled: true,
            timeout_seconds: 0,
        };
        assert!(build_timeout_layer(&zero).is_none());
    }

    #[test]
    fn enabled_timeout() {
        assert!(build_timeout_layer(&TimeoutConfig::default()).is_some());
    }
}
