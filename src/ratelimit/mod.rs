//! Request rate limiting.
//!
//! Per-IP (default) or global limiting with a 429 envelope once the quota
//! is spent. Health probes are exempt.

mod config;
mod layer;

pub use config::{RateLimitConfig, RateLimitConfigBuilder, RateLimitStrategy};
pub use layer::{RATE_LIMIT_MESSAGE, RateLimitLayer, build_rate_limit_layer, rate_limited_response};
