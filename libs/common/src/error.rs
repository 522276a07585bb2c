//! Custom error types for the common library
//!
//! This module defines the error type shared by every session store backend.

use thiserror::Error;

/// Custom error type for session store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Error occurred while reading or writing the backing file
    #[error("Session store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted document could not be encoded or decoded
    #[error("Session store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error occurred while talking to Redis
    #[error("Session store redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Configuration error
    #[error("Session store configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with StoreError
pub type StoreResult<T> = Result<T, StoreError>;
