use anyhow::{Context, Result};
use wharf::database::{Migrator, validate_migrations};

use crate::print_success;

pub async fn run(database_url: Option<String>) -> Result<()> {
    let db = super::connect(database_url).await?;
    let version = validate_migrations::<Migrator>(db.conn())
        .await
        .context("validation failed")?;
    db.close().await?;

    print_success(&format!(
        "Migration history is consistent ({} pending)",
        version.pending
    ));
    Ok(())
}
