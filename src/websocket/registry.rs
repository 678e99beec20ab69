//! Connection registry and broadcaster
//!
//! Tracks every live WebSocket connection and fans inbound messages out to all
//! of them. All shared state sits behind a single reader/writer lock:
//! broadcasts share the read side, while accept, deregister and eviction take
//! the write side.
//!
//! A broadcast never mutates the set while iterating it. Targets whose send
//! fails are collected during the read pass and removed afterwards in a
//! separate write-locked pass.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wharf::websocket::{Connection, Message, Registry};
//!
//! # async fn demo() {
//! let registry = Arc::new(Registry::new());
//! let (conn, mut outbound) = Connection::channel(16);
//! let conn = Arc::new(conn);
//! registry.accept(conn.clone()).await;
//!
//! let report = registry.broadcast(Message::text("hello")).await;
//! assert_eq!(report.delivered, 1);
//! assert_eq!(outbound.recv().await, Some(Message::text("hello")));
//!
//! registry.deregister(&conn).await;
//! assert_eq!(registry.count().await, 0);
//! # }
//! ```

use super::config::WebSocketConfig;
use super::connection::{Connection, ConnectionId};
use super::message::Message;
use futures::{Stream, StreamExt};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Outcome of a single broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Targets the message was queued for
    pub delivered: usize,
    /// Targets removed because their send failed
    pub evicted: usize,
}

/// Point-in-time registry counters
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct RegistryMetrics {
    pub active: usize,
    pub total_accepted: u64,
    pub total_broadcasts: u64,
    pub total_evicted: u64,
}

#[derive(Debug, Default)]
struct Counters {
    accepted: AtomicU64,
    broadcasts: AtomicU64,
    evicted: AtomicU64,
}

/// Owned set of live connections
#[derive(Debug, Default)]
pub struct Registry {
    connections: RwLock<HashMap<ConnectionId, Arc<Connection>>>,
    config: WebSocketConfig,
    counters: Counters,
    closing: AtomicBool,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_config(WebSocketConfig::default())
    }

    pub fn with_config(config: WebSocketConfig) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            config,
            counters: Counters::default(),
            closing: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &WebSocketConfig {
        &self.config
    }

    /// Create a connection sized for this registry, plus its outbound queue
    pub fn open(&self) -> (Arc<Connection>, tokio::sync::mpsc::Receiver<Message>) {
        let (conn, rx) = Connection::channel(self.config.channel_capacity);
        (Arc::new(conn), rx)
    }

    /// Whether the configured connection limit has been reached
    pub async fn at_capacity(&self) -> bool {
        self.config.max_connections > 0 && self.count().await >= self.config.max_connections
    }

    /// Register a connection as a broadcast target.
    ///
    /// After [`close_all`](Self::close_all) the connection is closed instead
    /// of registered, so a late upgrade cannot outlive shutdown.
    pub async fn accept(&self, conn: Arc<Connection>) {
        let mut connections = self.connections.write().await;
        self.insert(&mut connections, conn);
    }

    /// Register unless the connection limit is reached or the registry is
    /// shutting down. Capacity is checked under the same write lock as the
    /// insert. A refused connection is closed.
    pub async fn try_accept(&self, conn: Arc<Connection>) -> bool {
        let mut connections = self.connections.write().await;
        let limit = self.config.max_connections;
        if limit > 0 && connections.len() >= limit {
            drop(connections);
            conn.close();
            tracing::debug!(conn_id = %conn.id(), limit, "connection refused at capacity");
            return false;
        }
        self.insert(&mut connections, conn)
    }

    fn insert(
        &self,
        connections: &mut HashMap<ConnectionId, Arc<Connection>>,
        conn: Arc<Connection>,
    ) -> bool {
        let id = conn.id();
        if self.closing.load(Ordering::Acquire) {
            conn.close();
            tracing::debug!(conn_id = %id, "connection refused during shutdown");
            return false;
        }
        connections.insert(id, conn);
        self.counters.accepted.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(conn_id = %id, "connection registered");
        true
    }

    /// Per-connection receive loop.
    ///
    /// Every data frame read from `inbound` is broadcast to all registered
    /// connections, the sender included. The loop ends when the stream
    /// errors, ends, yields a close frame, or the connection is closed
    /// locally. The connection is deregistered on the way out.
    pub async fn run<S, E>(&self, conn: Arc<Connection>, mut inbound: S)
    where
        S: Stream<Item = Result<Message, E>> + Unpin,
        E: Display,
    {
        loop {
            let next = tokio::select! {
                _ = conn.closed() => break,
                next = inbound.next() => next,
            };

            match next {
                Some(Ok(msg)) if msg.is_data() => {
                    self.broadcast(msg).await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(conn_id = %conn.id(), error = %e, "receive failed");
                    break;
                }
            }
        }

        self.deregister(&conn).await;
    }

    /// Deliver `msg` to every registered connection.
    ///
    /// A failed target is logged and evicted once the read pass completes.
    /// It never prevents delivery to the others.
    pub async fn broadcast(&self, msg: Message) -> BroadcastReport {
        self.counters.broadcasts.fetch_add(1, Ordering::Relaxed);

        let mut delivered = 0;
        let mut dead = Vec::new();
        {
            let connections = self.connections.read().await;
            for (id, conn) in connections.iter() {
                match conn.send(msg.clone()) {
                    Ok(()) => delivered += 1,
                    Err(e) => {
                        tracing::warn!(conn_id = %id, error = %e, "broadcast send failed");
                        dead.push(conn.clone());
                    }
                }
            }
        }

        let evicted = if dead.is_empty() {
            0
        } else {
            self.evict(dead).await
        };

        BroadcastReport { delivered, evicted }
    }

    /// Broadcast a text frame
    pub async fn broadcast_text(&self, text: impl Into<String>) -> BroadcastReport {
        self.broadcast(Message::text(text)).await
    }

    async fn evict(&self, dead: Vec<Arc<Connection>>) -> usize {
        let mut removed = 0;
        {
            let mut connections = self.connections.write().await;
            for conn in &dead {
                // Another broadcast or the owning loop may have removed it already.
                if connections.remove(&conn.id()).is_some() {
                    removed += 1;
                }
            }
        }
        for conn in &dead {
            conn.close();
        }

        self.counters.evicted.fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    /// Remove a connection and close it.
    ///
    /// Idempotent: an absent connection leaves the set untouched. Returns
    /// whether the connection was still registered.
    pub async fn deregister(&self, conn: &Connection) -> bool {
        let removed = self.connections.write().await.remove(&conn.id()).is_some();
        conn.close();
        if removed {
            tracing::debug!(conn_id = %conn.id(), "connection deregistered");
        }
        removed
    }

    /// Number of registered connections
    pub async fn count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Whether a connection is currently registered
    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.connections.read().await.contains_key(&id)
    }

    /// Close and remove every connection, unblocking all receive loops.
    ///
    /// Called during graceful shutdown. Later accepts are refused. Returns
    /// how many were closed.
    pub async fn close_all(&self) -> usize {
        let drained: Vec<Arc<Connection>> = {
            let mut connections = self.connections.write().await;
            self.closing.store(true, Ordering::Release);
            connections.drain().map(|(_, conn)| conn).collect()
        };
        for conn in &drained {
            conn.close();
        }
        if !drained.is_empty() {
            tracing::info!(count = drained.len(), "closed websocket connections");
        }
        drained.len()
    }

    pub async fn metrics(&self) -> RegistryMetrics {
        RegistryMetrics {
            active: self.count().await,
            total_accepted: self.counters.accepted.load(Ordering::Relaxed),
            total_broadcasts: self.counters.broadcasts.load(Ordering::Relaxed),
            total_evicted: self.counters.evicted.load(Ordering::Relaxed),
        }
    }
}
