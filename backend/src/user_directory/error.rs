//! Error types for user directory operations

use thiserror::Error;

/// Result type for user directory operations
pub type UserDirectoryResult<T> = Result<T, UserDirectoryError>;

/// Errors that can occur during user directory operations
#[derive(Error, Debug)]
pub enum UserDirectoryError {
    /// Redis operation failed
    #[error("Redis operation failed: {0}")]
    Redis(#[from] redis::RedisError),

    /// Redis operation exceeded its deadline
    #[error("Redis operation timed out")]
    Timeout,
}
