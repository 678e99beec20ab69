//! Security response headers (helmet-style).

mod config;
mod headers;

pub use config::{ReferrerPolicy, SecurityConfig, SecurityConfigBuilder, XFrameOptions};
pub use headers::{SecurityHeadersLayer, build_security_headers_layer};
