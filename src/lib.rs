//! wharf - an axum service starter with a websocket broadcast hub
//!
//! Every text or binary frame a client sends to `/ws` is relayed to all
//! connected clients. Around that hub sits the usual service plumbing: a
//! JSON response envelope, JWT-protected routes, CORS, rate limiting,
//! security headers, health checks, and optional Postgres and Redis.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use wharf::{App, AppContext, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     wharf::init_tracing_with_config(&config);
//!
//!     let ctx = AppContext::from_config(config.clone());
//!     App::with_config(config)
//!         .with_context(ctx)
//!         .with_default_routes()
//!         .serve()
//!         .await?;
//!     Ok(())
//! }
//! ```

mod app;
pub mod auth;
#[cfg(feature = "cache")]
pub mod cache;
pub mod compression;
pub mod config;
mod core;
pub mod cors;
#[cfg(feature = "database")]
pub mod database;
mod error;
pub mod health;
pub mod http;
mod middleware;
pub mod ratelimit;
pub mod request_logging;
pub mod routes;
pub mod security;
pub mod testing;
pub mod timeout;
pub mod utils;
#[cfg(feature = "validation")]
pub mod validation;
pub mod websocket;

pub use app::{AppContext, AppContextBuilder};
pub use config::{AuthConfig, Config, ConfigBuilder, LoggingConfig, ServerConfig, load_dotenv};
pub use core::{App, SHUTDOWN_TIMEOUT, shutdown_signal};
pub use error::{ErrorCode, ErrorContext, ErrorWithContext, Result, WharfError};
pub use health::{ComponentHealth, HealthCheck, HealthChecker, HealthReport, HealthStatus};
pub use http::{Envelope, ErrorBody, RouteModule, error_response};
#[cfg(feature = "validation")]
pub use validation::{ValidatedJson, validator};
pub use websocket::{Connection, ConnectionId, Message, Registry, WebSocketConfig};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging from the environment
///
/// - `RUST_LOG`: filter directives, `info` when unset
/// - `WHARF_LOG_JSON`: `true` for JSON lines
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = std::env::var("WHARF_LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    install_subscriber(env_filter, json_logs);
}

/// Initialize logging from [`Config::logging`]. `RUST_LOG` still wins when set.
pub fn init_tracing_with_config(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    install_subscriber(env_filter, config.logging.json);
}

fn install_subscriber(env_filter: EnvFilter, json: bool) {
    // A second initialisation (tests, embedding) keeps the first subscriber.
    let result = if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "tracing subscriber already installed");
    }
}
