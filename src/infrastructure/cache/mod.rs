//! Cache Module
//!
//! Redis connection management and the aggregate-statistics cache. The
//! /stats payload is a handful of COUNT queries, so it gets cached as a
//! JSON blob with a short TTL.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::config::RedisSettings;
use crate::shared::error::AppError;

/// Key for the portal-wide statistics payload
pub const STATS_CACHE_KEY: &str = "kportal:stats";

/// Create a Redis connection manager
pub async fn create_redis_client(settings: &RedisSettings) -> Result<ConnectionManager, AppError> {
    let client = redis::Client::open(settings.url.as_str())?;
    let manager = ConnectionManager::new(client).await?;
    Ok(manager)
}

/// Raw payload cache, implemented over Redis in production.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Cache: Send + Sync {
    /// Fetch a cached payload.
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Store a payload with a TTL in seconds.
    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), AppError>;
}

/// JSON blob cache over a Redis connection manager.
#[derive(Clone)]
pub struct JsonCache {
    conn: ConnectionManager,
}

impl JsonCache {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl Cache for JsonCache {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(key).await?;
        Ok(raw)
    }

    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key, value, ttl_secs).await?;
        Ok(())
    }
}
