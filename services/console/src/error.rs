//! Custom error types for the console service

use common::StoreError;
use thiserror::Error;

use crate::backend::BackendError;
use crate::forms::FormError;

/// Custom error type for the console service
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// Form input was rejected before reaching the backend
    #[error("{0}")]
    Form(#[from] FormError),

    /// Backend call failed
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Session store failure
    #[error("Session store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Type alias for console results
pub type ConsoleResult<T> = Result<T, ConsoleError>;
