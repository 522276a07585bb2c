//! Redis-backed session store
//!
//! This module provides a [`SessionStore`] whose entries live in Redis, so
//! several console processes on different hosts can share one session. Keys
//! are namespaced with a configurable prefix.

use redis::{Client, Commands};
use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::store::SessionStore;

/// Configuration for the Redis session store
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
    /// Prefix prepended to every session key
    pub key_prefix: String,
}

impl RedisConfig {
    /// Create a new RedisConfig from environment variables
    ///
    /// # Environment Variables
    /// - `REDIS_URL`: Redis connection URL (default: "redis://localhost:6379")
    /// - `REDIS_KEY_PREFIX`: Key namespace (default: "console")
    pub fn from_env() -> Self {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let key_prefix =
            std::env::var("REDIS_KEY_PREFIX").unwrap_or_else(|_| "console".to_string());

        RedisConfig { url, key_prefix }
    }
}

/// Session store kept in Redis
pub struct RedisStore {
    client: Client,
    key_prefix: String,
}

impl RedisStore {
    /// Open a Redis client for the configured URL
    ///
    /// No connection is made until the first operation.
    pub fn new(config: &RedisConfig) -> StoreResult<Self> {
        if config.key_prefix.is_empty() {
            return Err(StoreError::Configuration(
                "Redis key prefix must not be empty".to_string(),
            ));
        }

        let client = Client::open(config.url.clone())?;
        info!("Redis session store initialized with URL: {}", config.url);
        Ok(RedisStore {
            client,
            key_prefix: config.key_prefix.clone(),
        })
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.key_prefix, key)
    }

    fn connection(&self) -> StoreResult<redis::Connection> {
        Ok(self.client.get_connection()?)
    }

    /// Check if Redis is reachable
    pub fn health_check(&self) -> StoreResult<bool> {
        let mut conn = self.connection()?;
        let pong: String = redis::cmd("PING").query(&mut conn)?;
        Ok(pong == "PONG")
    }
}

impl SessionStore for RedisStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.connection()?;
        let value: Option<String> = conn.get(self.namespaced(key))?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut conn = self.connection()?;
        let _: () = conn.set(self.namespaced(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut conn = self.connection()?;
        let _: u64 = conn.del(self.namespaced(key))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TOKEN_KEY;

    #[test]
    fn test_keys_are_namespaced() {
        let store = RedisStore::new(&RedisConfig {
            url: "redis://localhost:6379".to_string(),
            key_prefix: "tab-1".to_string(),
        })
        .unwrap();

        assert_eq!(store.namespaced(TOKEN_KEY), "tab-1:token");
    }

    #[test]
    fn test_empty_prefix_is_rejected() {
        let result = RedisStore::new(&RedisConfig {
            url: "redis://localhost:6379".to_string(),
            key_prefix: String::new(),
        });

        assert!(matches!(result, Err(StoreError::Configuration(_))));
    }

    #[test]
    #[ignore = "requires a running Redis server"]
    fn test_set_get_remove() -> StoreResult<()> {
        let store = RedisStore::new(&RedisConfig::from_env())?;
        assert!(store.health_check()?);

        store.set(TOKEN_KEY, "a.b.c")?;
        assert_eq!(store.get(TOKEN_KEY)?, Some("a.b.c".to_string()));

        store.remove(TOKEN_KEY)?;
        assert_eq!(store.get(TOKEN_KEY)?, None);
        Ok(())
    }
}
