//! Error types for upload orchestration

use thiserror::Error;

use crate::{image_store::ImageStoreError, media_storage::StorageError};

/// Errors that can occur during upload orchestration
#[derive(Error, Debug)]
pub enum UploadError {
    /// A required field is missing or malformed
    #[error("{0}")]
    Validation(&'static str),

    /// The referenced image does not exist
    #[error("image not found")]
    NotFound,

    /// The storage gateway could not authorize the upload (server fault)
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The image store failed
    #[error(transparent)]
    Store(#[from] ImageStoreError),
}
