use crate::error::{Result, WharfError};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use serde::Serialize;
use std::collections::HashSet;

/// Where the schema stands relative to the migrations compiled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationVersion {
    /// Most recently applied migration, if any
    pub latest: Option<String>,
    /// Known migrations not yet applied
    pub pending: usize,
    /// Applied migrations this binary does not know about
    pub unknown: Vec<String>,
}

impl MigrationVersion {
    /// The database has history the binary cannot account for.
    pub fn is_inconsistent(&self) -> bool {
        !self.unknown.is_empty()
    }
}

/// Apply every pending migration.
pub async fn run_migrations<M: MigratorTrait>(db: &DatabaseConnection) -> Result<()> {
    let before = migration_version::<M>(db).await?;
    if before.is_inconsistent() {
        return Err(inconsistent(&before));
    }

    M::up(db, None)
        .await
        .map_err(|e| WharfError::Database(format!("migration failed: {e}")))?;

    if before.pending == 0 {
        tracing::info!("database schema is up to date");
    } else {
        tracing::info!(applied = before.pending, "database migrations completed");
    }
    Ok(())
}

/// Read the applied history from `schema_migrations`.
pub async fn migration_version<M: MigratorTrait>(
    db: &DatabaseConnection,
) -> Result<MigrationVersion> {
    let applied = M::get_migration_models(db)
        .await
        .map_err(|e| WharfError::Database(format!("failed to read migration history: {e}")))?;

    let known: HashSet<String> = M::migrations()
        .iter()
        .map(|migration| migration.name().to_string())
        .collect();

    let latest = applied
        .iter()
        .max_by_key(|model| (model.applied_at, model.version.clone()))
        .map(|model| model.version.clone());

    let applied_known = applied
        .iter()
        .filter(|model| known.contains(&model.version))
        .count();

    let unknown = applied
        .iter()
        .filter(|model| !known.contains(&model.version))
        .map(|model| model.version.clone())
        .collect();

    Ok(MigrationVersion {
        latest,
        pending: known.len().saturating_sub(applied_known),
        unknown,
    })
}

/// Fail when the applied history is inconsistent with this binary.
pub async fn validate_migrations<M: MigratorTrait>(
    db: &DatabaseConnection,
) -> Result<MigrationVersion> {
    let version = migration_version::<M>(db).await?;
    if version.is_inconsistent() {
        return Err(inconsistent(&version));
    }
    Ok(version)
}

fn inconsistent(version: &MigrationVersion) -> WharfError {
    WharfError::Database(format!(
        "database is in an inconsistent migration state, applied but unknown: {}; manual intervention required",
        version.unknown.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use sea_orm_migration::prelude::*;
    use sea_orm_migration::seaql_migrations;

    struct Step(&'static str);

    impl MigrationName for Step {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Step {
        async fn up(&self, _manager: &SchemaManager) -> std::result::Result<(), DbErr> {
            Ok(())
        }
    }

    struct TwoSteps;

    #[async_trait::async_trait]
    impl MigratorTrait for TwoSteps {
        fn migrations() -> Vec<Box<dyn MigrationTrait>> {
            vec![
                Box::new(Step("m20240101_000001_create_users")),
                Box::new(Step("m20240201_000001_add_last_seen")),
            ]
        }
    }

    fn row(version: &str, applied_at: i64) -> seaql_migrations::Model {
        seaql_migrations::Model {
            version: version.to_string(),
            applied_at,
        }
    }

    // Reading history first ensures the tracking table exists, then selects it.
    fn history(rows: Vec<seaql_migrations::Model>) -> DatabaseConnection {
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([rows])
            .into_connection()
    }

    #[tokio::test]
    async fn fully_applied_history_is_clean() {
        let db = history(vec![
            row("m20240101_000001_create_users", 100),
            row("m20240201_000001_add_last_seen", 200),
        ]);

        let version = migration_version::<TwoSteps>(&db).await.unwrap();
        assert_eq!(
            version,
            MigrationVersion {
                latest: Some("m20240201_000001_add_last_seen".into()),
                pending: 0,
                unknown: vec![],
            }
        );
    }

    #[tokio::test]
    async fn missing_rows_count_as_pending() {
        let db = history(vec![row("m20240101_000001_create_users", 100)]);

        let version = migration_version::<TwoSteps>(&db).await.unwrap();
        assert_eq!(version.latest.as_deref(), Some("m20240101_000001_create_users"));
        assert_eq!(version.pending, 1);
        assert!(!version.is_inconsistent());

        let empty = history(vec![]);
        let version = migration_version::<TwoSteps>(&empty).await.unwrap();
        assert_eq!(version.latest, None);
        assert_eq!(version.pending, 2);
    }

    #[tokio::test]
    async fn unknown_applied_version_is_inconsistent() {
        let rows = || {
            vec![
                row("m20240101_000001_create_users", 100),
                row("m20240201_000001_add_last_seen", 200),
                row("m20990101_000001_from_the_future", 300),
            ]
        };

        let version = migration_version::<TwoSteps>(&history(rows())).await.unwrap();
        assert_eq!(version.latest.as_deref(), Some("m20990101_000001_from_the_future"));
        assert_eq!(version.pending, 0);
        assert_eq!(version.unknown, vec!["m20990101_000001_from_the_future".to_string()]);
        assert!(version.is_inconsistent());

        let err = validate_migrations::<TwoSteps>(&history(rows())).await.unwrap_err();
        assert!(err.to_string().contains("inconsistent migration state"));

        // refused before any migration runs
        let err = run_migrations::<TwoSteps>(&history(rows())).await.unwrap_err();
        assert!(err.to_string().contains("m20990101_000001_from_the_future"));
    }

    #[test]
    fn unknown_history_is_inconsistent() {
        let clean = MigrationVersion {
            latest: Some("m20240101_000001_create_users".into()),
            pending: 0,
            unknown: vec![],
        };
        assert!(!clean.is_inconsistent());

        let dirty = MigrationVersion {
            unknown: vec!["m20990101_000001_from_the_future".into()],
            ..clean
        };
        assert!(dirty.is_inconsistent());
        assert!(inconsistent(&dirty).to_string().contains("m20990101_000001_from_the_future"));
    }
}
