//! Error types for API key operations

use thiserror::Error;

/// Errors that can occur when issuing or verifying API keys
#[derive(Error, Debug)]
pub enum ApiKeyError {
    /// The token is malformed, tampered with, or signed with another secret
    #[error("invalid or tampered API key")]
    InvalidToken,

    /// Claims could not be serialized
    #[error("failed to serialize claims: {0}")]
    Serialization(#[from] serde_json::Error),
}
