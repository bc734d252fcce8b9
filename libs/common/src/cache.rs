//! Redis-backed session revocation
//!
//! Signed session tokens stay valid until they expire, so signing out records
//! the token id in Redis for the rest of its lifetime. Both services consult
//! the same keys on every authenticated request.

use anyhow::Result;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::MultiplexedConnection};
use tracing::info;

const REVOKED_SESSION_PREFIX: &str = "revoked_session";

/// Configuration for Redis connection
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
}

impl RedisConfig {
    /// Create a new RedisConfig from environment variables
    ///
    /// # Environment Variables
    /// - `REDIS_URL`: Redis connection URL (default: "redis://localhost:6379")
    pub fn from_env() -> Result<Self> {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        Ok(RedisConfig { url })
    }
}

/// Store of session token ids that were signed out before they expired
#[async_trait]
pub trait RevocationList: Send + Sync {
    /// Mark a token id as revoked for `ttl_seconds`
    async fn revoke(&self, token_id: &str, ttl_seconds: u64) -> Result<()>;

    /// Whether the token id was revoked
    async fn is_revoked(&self, token_id: &str) -> Result<bool>;
}

fn revocation_key(token_id: &str) -> String {
    format!("{}:{}", REVOKED_SESSION_PREFIX, token_id)
}

/// Redis connection handle
///
/// Holds one multiplexed connection opened at start-up. Clones share it, so
/// request handlers never open connections of their own.
#[derive(Clone)]
pub struct RedisPool {
    connection: MultiplexedConnection,
}

impl RedisPool {
    /// Connect to Redis
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.clone())?;
        let connection = client.get_multiplexed_async_connection().await?;
        info!("Redis connection established with URL: {}", config.url);
        Ok(RedisPool { connection })
    }

    fn get_connection(&self) -> MultiplexedConnection {
        self.connection.clone()
    }

    /// Check if Redis is reachable
    pub async fn health_check(&self) -> Result<bool> {
        let mut conn = self.get_connection();
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG")
    }
}

#[async_trait]
impl RevocationList for RedisPool {
    async fn revoke(&self, token_id: &str, ttl_seconds: u64) -> Result<()> {
        let mut conn = self.get_connection();
        // SETEX rejects a zero expiry
        let _: () = conn
            .set_ex(revocation_key(token_id), "1", ttl_seconds.max(1))
            .await?;
        Ok(())
    }

    async fn is_revoked(&self, token_id: &str) -> Result<bool> {
        let mut conn = self.get_connection();
        let exists: bool = conn.exists(revocation_key(token_id)).await?;
        Ok(exists)
    }
}
