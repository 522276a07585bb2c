//! Console configuration
//!
//! Settings come from built-in defaults overridden by `CONSOLE_*` environment
//! variables. The backend location may also be given as `BACKEND_URL`, the
//! name the console has always used for it; `CONSOLE_BACKEND_URL` wins when
//! both are set.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use common::{FileStore, MemoryStore, RedisConfig, RedisStore, SessionStore};
use config::{Config, Environment};
use serde::Deserialize;
use tracing::info;

use crate::error::ConsoleResult;
use crate::shell::RefreshPolicy;
use crate::validator::RolePurge;

/// Where the session is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// JSON file on disk, kept across runs
    File,
    /// Process memory, gone when the console exits
    Memory,
    /// Shared Redis instance
    Redis,
}

/// Console configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    /// Backend base URL
    pub backend_url: String,
    pub store: StoreKind,
    /// Session file used by [`StoreKind::File`]
    pub store_path: PathBuf,
    pub redis_url: String,
    pub redis_prefix: String,
    pub refresh_policy: RefreshPolicy,
    /// Remove the stored role whenever an invalid token is purged
    pub purge_role_with_token: bool,
}

impl ConsoleConfig {
    /// Create a new ConsoleConfig from environment variables
    ///
    /// # Environment Variables
    /// - `CONSOLE_BACKEND_URL` / `BACKEND_URL`: backend base URL (default: "http://localhost:5000")
    /// - `CONSOLE_STORE`: `file`, `memory` or `redis` (default: "file")
    /// - `CONSOLE_STORE_PATH`: session file (default: "$HOME/.console/session.json")
    /// - `CONSOLE_REDIS_URL`: Redis URL (default: "redis://localhost:6379")
    /// - `CONSOLE_REDIS_PREFIX`: Redis key prefix (default: "console")
    /// - `CONSOLE_REFRESH_POLICY`: `on_mount` or `every_navigation` (default: "on_mount")
    /// - `CONSOLE_PURGE_ROLE_WITH_TOKEN`: `true` or `false` (default: false)
    pub fn from_env() -> ConsoleResult<Self> {
        Self::load(
            Environment::with_prefix("CONSOLE"),
            std::env::var("BACKEND_URL").ok(),
        )
    }

    /// Build from an explicit environment source
    pub fn from_vars(vars: HashMap<String, String>) -> ConsoleResult<Self> {
        let legacy_backend_url = vars.get("BACKEND_URL").cloned();
        Self::load(
            Environment::with_prefix("CONSOLE").source(Some(vars)),
            legacy_backend_url,
        )
    }

    fn load(env: Environment, legacy_backend_url: Option<String>) -> ConsoleResult<Self> {
        let config = Config::builder()
            .set_default(
                "backend_url",
                legacy_backend_url.unwrap_or_else(|| "http://localhost:5000".to_string()),
            )?
            .set_default("store", "file")?
            .set_default(
                "store_path",
                default_store_path().to_string_lossy().into_owned(),
            )?
            .set_default("redis_url", "redis://localhost:6379")?
            .set_default("redis_prefix", "console")?
            .set_default("refresh_policy", "on_mount")?
            .set_default("purge_role_with_token", false)?
            .add_source(env.try_parsing(true))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn role_purge(&self) -> RolePurge {
        if self.purge_role_with_token {
            RolePurge::WithToken
        } else {
            RolePurge::Keep
        }
    }

    /// Open the configured session store
    pub fn open_store(&self) -> ConsoleResult<Arc<dyn SessionStore>> {
        let store: Arc<dyn SessionStore> = match self.store {
            StoreKind::File => {
                info!("Using session file {}", self.store_path.display());
                Arc::new(FileStore::new(&self.store_path))
            }
            StoreKind::Memory => Arc::new(MemoryStore::new()),
            StoreKind::Redis => Arc::new(RedisStore::new(&RedisConfig {
                url: self.redis_url.clone(),
                key_prefix: self.redis_prefix.clone(),
            })?),
        };
        Ok(store)
    }
}

fn default_store_path() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".console")
        .join("session.json")
}
