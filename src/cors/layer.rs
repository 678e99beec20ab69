use super::config::CorsConfig;
use crate::error::Result;
use axum::http::{HeaderName, HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::CorsLayer;

/// Build a tower-http CorsLayer from a CorsConfig
///
/// Returns `Ok(None)` when CORS is disabled. Origin resolution follows
/// [`CorsConfig::effective_origins`].
pub fn build_cors_layer(config: &CorsConfig, is_prod: bool) -> Result<Option<CorsLayer>> {
    if !config.enabled {
        return Ok(None);
    }

    let origins: Vec<HeaderValue> = config
        .effective_origins(is_prod)?
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    let methods: Vec<Method> = config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();

    let headers: Vec<HeaderName> = config
        .allowed_headers
        .iter()
        .filter_map(|h| h.parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(config.allow_credentials)
        .max_age(Duration::from_secs(config.max_age_seconds));

    Ok(Some(layer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_cors_builds_nothing() {
        let config = CorsConfig::builder().enabled(false).build();
        assert!(build_cors_layer(&config, false).unwrap().is_none());
    }

    #[test]
    fn dev_default_builds_layer() {
        let config = CorsConfig::default();
        assert!(build_cors_layer(&config, false).unwrap().is_some());
    }

    #[test]
    fn prod_without_origins_fails() {
        let config = CorsConfig::default();
        assert!(build_cors_layer(&config, true).is_err());
    }
}
