//! WebSocket broadcast support
//!
//! A single [`Registry`] per process owns the set of live connections. Every
//! data frame received from any connection is relayed to all registered
//! connections, the sender included.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wharf::websocket::{self, Registry};
//! use wharf::{App, AppContext};
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = Arc::new(Registry::new());
//!     let ctx = AppContext::builder().with_registry(registry).build();
//!
//!     let app = App::new()
//!         .with_context(ctx)
//!         .register_module(websocket::WebSocketRoutes::new("/ws"));
//!
//!     app.serve().await.unwrap();
//! }
//! ```

mod config;
mod connection;
mod message;
mod registry;
mod upgrade;


pub use config::WebSocketConfig;
pub use connection::{Connection, ConnectionId, DEFAULT_CHANNEL_CAPACITY, SendError};
pub use message::{CloseFrame, Message, MessageKind};
pub use registry::{BroadcastReport, Registry, RegistryMetrics};
pub use upgrade::{WebSocketRoutes, serve_socket};
