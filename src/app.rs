use std::sync::Arc;

use crate::auth::JwtVerifier;
use crate::config::Config;
use crate::health::{HealthChecker, RegistryHealthCheck};
use crate::websocket::Registry;

#[cfg(feature = "cache")]
use crate::cache::{RedisCache, RedisHealthCheck};
#[cfg(feature = "database")]
use crate::database::{Database, DatabaseHealthCheck};

/// Shared state handed to every handler
///
/// Cloning is cheap: every member sits behind an `Arc`. The registry is
/// created once per process and owned here, so all sockets share it.
#[derive(Clone)]
pub struct AppContext {
    pub registry: Arc<Registry>,

    #[cfg(feature = "database")]
    pub database: Option<Arc<Database>>,

    #[cfg(feature = "cache")]
    pub cache: Option<Arc<RedisCache>>,

    pub jwt: Arc<JwtVerifier>,

    pub config: Arc<Config>,
}

impl AppContext {
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Context whose registry and verifier follow `config`
    pub fn from_config(config: Config) -> Self {
        Self::builder().with_config(config).build()
    }

    pub fn builder() -> AppContextBuilder {
        AppContextBuilder::new()
    }

    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn jwt(&self) -> Arc<JwtVerifier> {
        self.jwt.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the database, returning an error if not configured
    #[cfg(feature = "database")]
    pub fn database(&self) -> crate::error::Result<&Arc<Database>> {
        self.database
            .as_ref()
            .ok_or_else(|| crate::error::WharfError::internal("Database not configured"))
    }

    /// Get the cache, returning an error if not configured
    #[cfg(feature = "cache")]
    pub fn cache(&self) -> crate::error::Result<&Arc<RedisCache>> {
        self.cache
            .as_ref()
            .ok_or_else(|| crate::error::WharfError::internal("Cache not configured"))
    }

    /// Checks for every dependency present in this context
    pub fn health_checker(&self) -> HealthChecker {
        #[allow(unused_mut)]
        let mut checker = HealthChecker::new();

        #[cfg(feature = "database")]
        {
            if let Some(db) = &self.database {
                checker = checker.with_check(Arc::new(DatabaseHealthCheck::new(db.clone())));
            }
        }

        #[cfg(feature = "cache")]
        {
            if let Some(cache) = &self.cache {
                checker = checker.with_check(Arc::new(RedisHealthCheck::new(cache.clone())));
            }
        }

        checker.with_check(Arc::new(RegistryHealthCheck::new(self.registry())))
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for AppContext with fluent API
///
/// Members left unset are derived from the config: the registry from
/// `config.websocket`, the verifier from `config.auth`.
#[must_use = "builder does nothing until you call build()"]
pub struct AppContextBuilder {
    registry: Option<Arc<Registry>>,
    #[cfg(feature = "database")]
    database: Option<Arc<Database>>,
    #[cfg(feature = "cache")]
    cache: Option<Arc<RedisCache>>,
    jwt: Option<Arc<JwtVerifier>>,
    config: Option<Config>,
}

impl AppContextBuilder {
    pub fn new() -> Self {
        Self {
            registry: None,
            #[cfg(feature = "database")]
            database: None,
            #[cfg(feature = "cache")]
            cache: None,
            jwt: None,
            config: None,
        }
    }

    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    #[cfg(feature = "database")]
    pub fn with_database(mut self, database: Arc<Database>) -> Self {
        self.database = Some(database);
        self
    }

    #[cfg(feature = "cache")]
    pub fn with_cache(mut self, cache: Arc<RedisCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_jwt(mut self, jwt: Arc<JwtVerifier>) -> Self {
        self.jwt = Some(jwt);
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> AppContext {
        let config = self.config.unwrap_or_default();

        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(Registry::with_config(config.websocket.clone())));

        let jwt = self.jwt.unwrap_or_else(|| {
            Arc::new(JwtVerifier::from_secret(
                &config.auth.secret_key,
                config.auth.token_ttl(),
            ))
        });

        AppContext {
            registry,
            #[cfg(feature = "database")]
            database: self.database,
            #[cfg(feature = "cache")]
            cache: self.cache,
            jwt,
            config: Arc::new(config),
        }
    }
}

impl Default for AppContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
