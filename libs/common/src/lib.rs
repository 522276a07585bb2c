//! Common library for the key-management console
//!
//! This crate provides the persisted session store shared by the console
//! services: the key-value port, its in-memory and file-backed
//! implementations, a Redis-backed implementation, and the store error type.

pub mod cache;
pub mod error;
pub mod store;

pub use cache::{RedisConfig, RedisStore};
pub use error::{StoreError, StoreResult};
pub use store::{FileStore, MemoryStore, ROLE_KEY, SessionStore, TOKEN_KEY};

/// Example usage of the store module
///
/// ```rust
/// use common::{MemoryStore, SessionStore, TOKEN_KEY};
///
/// let store = MemoryStore::new();
/// store.set(TOKEN_KEY, "header.payload.signature").unwrap();
/// assert!(store.get(TOKEN_KEY).unwrap().is_some());
/// store.remove(TOKEN_KEY).unwrap();
/// assert!(store.get(TOKEN_KEY).unwrap().is_none());
/// ```
pub fn example_usage() {}
