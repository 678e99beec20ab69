use anyhow::Context;
use std::sync::Arc;
use wharf::{App, AppContext, ConfigBuilder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_file = wharf::load_dotenv();
    let config = ConfigBuilder::new()
        .from_env()
        .build()
        .context("invalid configuration")?;

    wharf::init_tracing_with_config(&config);
    if let Some(path) = env_file {
        tracing::debug!(path = %path.display(), "loaded environment file");
    }
    tracing::info!(
        is_prod = config.is_prod,
        timezone = %config.timezone,
        "starting wharf"
    );

    #[allow(unused_mut)]
    let mut ctx = AppContext::builder().with_config(config.clone());

    #[cfg(feature = "database")]
    {
        use wharf::database::{Database, Migrator, run_migrations};

        if let Some(db_config) = &config.database {
            let db = Database::connect(db_config)
                .await
                .context("failed to connect to Postgres")?;
            if db_config.auto_migrate {
                run_migrations::<Migrator>(db.conn())
                    .await
                    .context("failed to run migrations")?;
            }
            ctx = ctx.with_database(Arc::new(db));
        } else {
            tracing::info!("DATABASE_URL not set, running without Postgres");
        }
    }

    #[cfg(feature = "cache")]
    {
        use wharf::cache::RedisCache;

        if let Some(cache_config) = &config.cache {
            let cache = RedisCache::connect(cache_config)
                .await
                .context("failed to connect to Redis")?;
            ctx = ctx.with_cache(Arc::new(cache));
        } else {
            tracing::info!("REDIS_URL not set, running without Redis");
        }
    }

    App::with_config(config)
        .with_context(ctx.build())
        .with_default_routes()
        .serve()
        .await
        .context("server failed")?;

    Ok(())
}
