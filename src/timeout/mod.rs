//! Request timeout middleware.
//!
//! Requests running longer than the configured duration are cancelled
//! with 408 Request Timeout.

mod config;
mod layer;

pub use config::TimeoutConfig;
pub use layer::build_timeout_layer;
