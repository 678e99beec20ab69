use anyhow::{Context, Result};
use wharf::database::{Migrator, migration_version, run_migrations};

use crate::print_success;

pub async fn run(database_url: Option<String>) -> Result<()> {
    let db = super::connect(database_url).await?;

    let before = migration_version::<Migrator>(db.conn())
        .await
        .context("failed to read migration history")?;
    run_migrations::<Migrator>(db.conn())
        .await
        .context("migration failed")?;

    if before.pending == 0 {
        print_success("Schema already up to date");
    } else {
        print_success(&format!("Applied {} migration(s)", before.pending));
    }

    db.close().await?;
    Ok(())
}
