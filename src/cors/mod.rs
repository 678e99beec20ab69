//! Cross-origin access for browser clients.
//!
//! Origins come from `ALLOWED_ORIGINS`. Credentials are always allowed, so
//! a wildcard origin is never emitted: development drops it in favour of
//! `http://localhost:3000`, production refuses to start.

mod config;
mod layer;

pub use config::{CorsConfig, CorsConfigBuilder, DEV_DEFAULT_ORIGIN};
pub use layer::build_cors_layer;
