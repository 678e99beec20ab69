//! Gzip response compression.

mod config;
mod layer;

pub use config::{CompressionConfig, CompressionLevel};
pub use layer::build_compression_layer;
