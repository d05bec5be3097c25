//! Error types for image store operations

use thiserror::Error;

/// Result type for image store operations
pub type ImageStoreResult<T> = Result<T, ImageStoreError>;

/// Errors that can occur during image store operations
#[derive(Error, Debug)]
pub enum ImageStoreError {
    /// Redis operation failed
    #[error("Redis operation failed: {0}")]
    Redis(#[from] redis::RedisError),

    /// Redis operation exceeded its deadline
    #[error("Redis operation timed out")]
    Timeout,
}
