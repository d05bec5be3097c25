//! Two-phase upload orchestration
//!
//! Upload state is implicit in what exists in storage: after phase 1 a grant
//! exists only in the response, after phase 2 the metadata record and index
//! entry exist. There is no reservation record, so a client that never
//! completes leaves an orphaned grant behind - tolerable because the id
//! space is large and unguessable, and documented as a gap rather than a
//! guarantee.

mod error;

use std::sync::Arc;

use chrono::Utc;

pub use error::UploadError;

use crate::{
    image_store::{Image, ImageStore},
    media_storage::{MediaStorage, UploadGrant},
};

/// Coordinates the storage gateway and the image store
pub struct Uploader {
    media_storage: Arc<MediaStorage>,
    image_store: Arc<ImageStore>,
}

impl Uploader {
    /// Creates a new uploader from injected dependencies
    #[must_use]
    pub const fn new(media_storage: Arc<MediaStorage>, image_store: Arc<ImageStore>) -> Self {
        Self {
            media_storage,
            image_store,
        }
    }

    /// Phase 1: validates the declared upload and hands back a presigned
    /// single-use PUT authorization. Nothing is persisted yet.
    ///
    /// # Errors
    ///
    /// - `UploadError::Validation` - empty or path-like filename, or
    ///   unparseable mime type
    /// - `UploadError::Storage` - the gateway could not sign the authorization
    pub async fn initiate_upload(
        &self,
        owner_uid: &str,
        filename: &str,
        mime_type: &str,
    ) -> Result<UploadGrant, UploadError> {
        validate_filename(filename)?;
        validate_mime_type(mime_type)?;

        let grant = self
            .media_storage
            .authorize_upload(owner_uid, filename, mime_type)
            .await?;

        tracing::info!(
            image_id = %grant.image_id,
            storage_key = %grant.storage_key,
            "authorized upload"
        );

        Ok(grant)
    }

    /// Phase 2: persists metadata for an upload the client reports finished.
    /// Terminal - the record is immutable afterwards.
    ///
    /// The caller's `image_id`/`storage_key` pair is trusted as returned by
    /// phase 1; the object's existence in the bucket is not re-verified. A
    /// retried completion overwrites the record with equivalent data.
    ///
    /// # Errors
    ///
    /// - `UploadError::Validation` - a required field is empty or malformed
    /// - `UploadError::Store` - the metadata write failed
    pub async fn complete_upload(
        &self,
        owner_uid: &str,
        image_id: &str,
        storage_key: &str,
        filename: &str,
        mime_type: &str,
    ) -> Result<Image, UploadError> {
        validate_required(image_id, "image_id must not be empty")?;
        validate_required(storage_key, "storage_key must not be empty")?;
        validate_filename(filename)?;
        validate_mime_type(mime_type)?;

        let image = Image {
            id: image_id.to_string(),
            owner_uid: owner_uid.to_string(),
            key: storage_key.to_string(),
            url: self.media_storage.public_url(storage_key),
            filename: filename.to_string(),
            mime: mime_type.to_string(),
            private: false,
            created_at: Utc::now().timestamp(),
            views: 0,
        };

        self.image_store.put_image(&image).await?;

        tracing::info!(image_id = %image.id, owner_uid = %image.owner_uid, "completed upload");

        Ok(image)
    }

    /// Up to `limit` of the owner's images, most recent first
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Store` if the listing fails
    pub async fn list_images(
        &self,
        owner_uid: &str,
        limit: usize,
    ) -> Result<Vec<Image>, UploadError> {
        Ok(self.image_store.list_images(owner_uid, limit).await?)
    }

    /// Public URL of a stored image, for the redirect route
    ///
    /// # Errors
    ///
    /// - `UploadError::NotFound` - no record for `image_id`
    /// - `UploadError::Store` - the lookup failed
    pub async fn get_image_url(&self, image_id: &str) -> Result<String, UploadError> {
        self.image_store
            .get_image(image_id)
            .await?
            .map(|image| image.url)
            .ok_or(UploadError::NotFound)
    }
}

pub(crate) fn validate_required(value: &str, message: &'static str) -> Result<(), UploadError> {
    if value.trim().is_empty() {
        return Err(UploadError::Validation(message));
    }
    Ok(())
}

/// The filename becomes the last segment of `uploads/{owner}/{image_id}/`;
/// anything that could escape that prefix is rejected.
pub(crate) fn validate_filename(filename: &str) -> Result<(), UploadError> {
    validate_required(filename, "filename must not be empty")?;
    if filename.contains(['/', '\\']) {
        return Err(UploadError::Validation(
            "filename must not contain path separators",
        ));
    }
    if filename == "." || filename == ".." {
        return Err(UploadError::Validation("filename must be a plain file name"));
    }
    Ok(())
}

pub(crate) fn validate_mime_type(mime_type: &str) -> Result<(), UploadError> {
    validate_required(mime_type, "mime_type must not be empty")?;
    mime_type
        .parse::<mime::Mime>()
        .map_err(|_| UploadError::Validation("mime_type is not a valid MIME type"))?;
    Ok(())
}
