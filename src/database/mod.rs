//! Postgres access through SeaORM.
//!
//! [`Database`] wraps the pooled connection, [`Migrator`] carries the
//! schema history, and [`entities`] holds the table models.

mod config;
mod connection;
pub mod entities;
mod migration;
pub mod migrations;

pub use config::{DatabaseConfig, redact_database_url};
pub use connection::{Database, DatabaseHealthCheck, PoolStats};
pub use migration::{MigrationVersion, migration_version, run_migrations, validate_migrations};
pub use migrations::Migrator;
pub use sea_orm;
