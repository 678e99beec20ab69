use super::config::CompressionConfig;
use tower_http::compression::CompressionLayer;

/// Build a gzip CompressionLayer, or `None` when disabled
pub fn build_compression_layer(config: &CompressionConfig) -> Option<CompressionLayer> {
    config
        .enabled
        .then(|| CompressionLayer::new().gzip(true).quality(config.level.to_tower()))
}
