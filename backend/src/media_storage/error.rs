//! Error types for storage gateway operations

use thiserror::Error;

/// Result type for storage gateway operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while authorizing uploads
#[derive(Error, Debug)]
pub enum StorageError {
    /// The S3 control plane rejected the authorization request
    #[error("Storage authorization failed: {0}")]
    AuthorizationError(String),

    /// Presigning configuration could not be built
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
