pub mod create;
pub mod up;
pub mod validate;
pub mod version;

use anyhow::{Context, Result};
use wharf::database::{Database, DatabaseConfig, redact_database_url};

/// Open a single-connection pool for the given url.
pub async fn connect(database_url: Option<String>) -> Result<Database> {
    let url = database_url.context("no database url; pass --database-url or set DATABASE_URL")?;

    let mut config = DatabaseConfig::new(&url);
    config.max_connections = 1;
    config.min_connections = 1;

    crate::print_info(&format!("Connecting to {}", redact_database_url(&url)));
    Database::connect(&config)
        .await
        .with_context(|| format!("failed to connect to {}", redact_database_url(&url)))
}
