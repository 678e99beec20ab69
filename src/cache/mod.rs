//! Redis-backed key/value cache.

mod config;
mod redis;

pub use self::redis::{RedisCache, RedisHealthCheck};
pub use config::CacheConfig;
