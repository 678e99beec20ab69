use anyhow::{Context, Result, bail};
use colored::Colorize;
use wharf::database::{Migrator, migration_version};

use crate::{print_info, print_warning};

pub async fn run(database_url: Option<String>) -> Result<()> {
    let db = super::connect(database_url).await?;
    let version = migration_version::<Migrator>(db.conn())
        .await
        .context("failed to read migration history")?;
    db.close().await?;

    match &version.latest {
        Some(latest) => print_info(&format!("Latest applied: {}", latest.bold())),
        None => print_info("No migrations applied yet"),
    }
    print_info(&format!("Pending: {}", version.pending));

    if version.is_inconsistent() {
        for name in &version.unknown {
            print_warning(&format!("Applied but unknown to this build: {name}"));
        }
        bail!("inconsistent migration state");
    }
    Ok(())
}
