use super::config::{DatabaseConfig, redact_database_url};
use crate::error::{Result, WharfError};
use crate::health::{ComponentHealth, HealthCheck};
use sea_orm::{ConnectOptions, ConnectionTrait, DatabaseBackend, DatabaseConnection};
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Pool counters reported by the health endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub max_connections: u32,
    /// Open connections, idle or in use
    pub size: u32,
    pub idle: u32,
    pub in_use: u32,
}

/// Pooled Postgres connection
pub struct Database {
    conn: DatabaseConnection,
}

impl Database {
    /// Open the pool and verify it with a ping.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let mut opt = ConnectOptions::new(&config.url);
        opt.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(config.connect_timeout())
            .idle_timeout(config.idle_timeout())
            .max_lifetime(config.max_lifetime())
            .sqlx_logging(false);

        let conn = sea_orm::Database::connect(opt).await.map_err(|e| {
            WharfError::Database(format!("failed to connect to database: {e}"))
        })?;

        let db = Self { conn };
        db.ping().await?;

        tracing::info!(
            url = %redact_database_url(&config.url),
            max_connections = config.max_connections,
            "database connected"
        );
        Ok(db)
    }

    pub fn from_connection(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn ping(&self) -> Result<()> {
        self.conn
            .ping()
            .await
            .map_err(|e| WharfError::Database(format!("database ping failed: {e}")))
    }

    /// `None` for non-Postgres backends
    pub fn pool_stats(&self) -> Option<PoolStats> {
        if self.conn.get_database_backend() != DatabaseBackend::Postgres {
            return None;
        }

        let pool = self.conn.get_postgres_connection_pool();
        let size = pool.size();
        let idle = u32::try_from(pool.num_idle()).unwrap_or(u32::MAX);
        Some(PoolStats {
            max_connections: pool.options().get_max_connections(),
            size,
            idle,
            in_use: size.saturating_sub(idle),
        })
    }

    pub async fn close(self) -> Result<()> {
        self.conn
            .close()
            .await
            .map_err(|e| WharfError::Database(format!("failed to close database: {e}")))
    }

    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }
}

impl std::ops::Deref for Database {
    type Target = DatabaseConnection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

/// Reports as `postgres`: ping plus pool counters
pub struct DatabaseHealthCheck {
    db: Arc<Database>,
}

impl DatabaseHealthCheck {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl HealthCheck for DatabaseHealthCheck {
    fn name(&self) -> &str {
        "postgres"
    }

    fn check(&self) -> Pin<Box<dyn Future<Output = ComponentHealth> + Send + '_>> {
        Box::pin(async move {
            match self.db.ping().await {
                Ok(()) => {
                    let health = ComponentHealth::ok();
                    match self.db.pool_stats() {
                        Some(stats) => health.with_stats(stats),
                        None => health,
                    }
                }
                Err(e) => ComponentHealth::error(e.to_string()),
            }
        })
    }
}
