//! Axum glue: upgrade handler and per-socket lifecycle
//!
//! The handler upgrades the request, registers the socket with the
//! [`Registry`], spawns a writer task that drains the connection's outbound
//! queue into the socket, and runs the registry's receive loop on the read
//! half until the peer goes away.

use super::message::Message;
use super::registry::Registry;
use crate::app::AppContext;
use crate::error::{Result, WharfError};
use crate::http::RouteModule;
use axum::{
    Router,
    extract::{
        State,
        ws::{self, WebSocket, WebSocketUpgrade},
    },
    response::Response,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;

/// Close code sent to a socket refused after the handshake
const CLOSE_TRY_AGAIN_LATER: u16 = 1013;

/// Route module exposing the broadcast socket
#[derive(Debug, Clone)]
pub struct WebSocketRoutes {
    path: String,
}

impl WebSocketRoutes {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for WebSocketRoutes {
    fn default() -> Self {
        Self::new("/ws")
    }
}

impl RouteModule for WebSocketRoutes {
    fn routes(&self) -> Router<AppContext> {
        Router::new().route(&self.path, get(upgrade_handler))
    }
}

async fn upgrade_handler(
    upgrade: WebSocketUpgrade,
    State(ctx): State<AppContext>,
) -> Result<Response> {
    let registry = ctx.registry();

    if registry.at_capacity().await {
        return Err(WharfError::service_unavailable(format!(
            "Maximum websocket connections ({}) reached",
            registry.config().max_connections
        )));
    }

    Ok(upgrade.on_upgrade(move |socket| serve_socket(socket, registry)))
}

/// Drive one upgraded socket from registration to teardown
pub async fn serve_socket(socket: WebSocket, registry: Arc<Registry>) {
    let (conn, mut outbound) = registry.open();
    let conn_id = conn.id();
    let (mut sink, stream) = socket.split();

    // The handler's capacity check is advisory; this one is authoritative.
    if !registry.try_accept(conn.clone()).await {
        let frame = ws::CloseFrame {
            code: CLOSE_TRY_AGAIN_LATER,
            reason: ws::Utf8Bytes::from_static("server unavailable"),
        };
        let _ = sink.send(ws::Message::Close(Some(frame))).await;
        return;
    }

    let writer = tokio::spawn({
        let conn = conn.clone();
        async move {
            loop {
                let next = tokio::select! {
                    _ = conn.closed() => break,
                    next = outbound.recv() => next,
                };
                let Some(msg) = next else { break };

                if let Err(e) = sink.send(msg.into_axum()).await {
                    tracing::debug!(conn_id = %conn.id(), error = %e, "websocket write failed");
                    conn.close();
                    break;
                }
            }

            // The peer may already be gone; a failed close frame changes nothing.
            let _ = sink.send(ws::Message::Close(None)).await;
            let _ = sink.close().await;
        }
    });

    registry
        .run(conn.clone(), stream.map(|frame| frame.map(Message::from_axum)))
        .await;

    if let Err(e) = writer.await {
        tracing::warn!(conn_id = %conn_id, error = %e, "websocket writer task failed");
    }
    tracing::debug!(conn_id = %conn_id, "websocket session ended");
}
