//! Structured access logging.
//!
//! One `tracing` event per request carrying method, path, status, latency,
//! request id and client ip. The level depends on the status class.

mod config;
mod middleware;

pub use config::{LogLevel, RequestLoggingConfig};
pub use middleware::{RequestLoggingLayer, build_request_logging_layer};
