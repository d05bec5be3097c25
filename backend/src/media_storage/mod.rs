//! S3-based upload authorization
//!
//! The gateway only talks to the S3 control plane: it signs time-bounded PUT
//! authorizations locally and computes public object URLs. The actual byte
//! transfer happens directly between the client and the bucket, so file
//! content never flows through this server.

mod error;

use std::sync::Arc;
use std::time::Duration;

use aws_sdk_s3::{presigning::PresigningConfig, Client as S3Client};
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use error::{StorageError, StorageResult};

/// A single-use, time-bounded authorization to upload one object
#[derive(Debug, Clone)]
pub struct UploadGrant {
    /// Freshly generated image identifier, reserved for this upload
    pub image_id: String,
    /// Object key the upload must land under
    pub storage_key: String,
    /// Presigned URL for the PUT operation
    pub presigned_url: String,
    /// ISO-8601 UTC timestamp when the authorization expires
    pub expires_at: DateTime<Utc>,
    /// Authorization lifetime in seconds
    pub expires_in: u64,
}

/// Storage gateway for S3 operations
pub struct MediaStorage {
    s3_client: Arc<S3Client>,
    bucket_name: String,
    region: String,
    presigned_url_expiry_secs: u64,
}

impl MediaStorage {
    /// Creates a new storage gateway
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - S3 bucket name for image storage
    /// * `region` - AWS region, used for public URL computation
    /// * `presigned_url_expiry_secs` - Expiry time for presigned URLs in seconds
    #[must_use]
    pub const fn new(
        s3_client: Arc<S3Client>,
        bucket_name: String,
        region: String,
        presigned_url_expiry_secs: u64,
    ) -> Self {
        Self {
            s3_client,
            bucket_name,
            region,
            presigned_url_expiry_secs,
        }
    }

    /// Generates a fresh image identifier.
    ///
    /// UUIDv4 keeps the reservation space large and unguessable; ids are
    /// reserved in the grant only, never persisted before completion.
    #[must_use]
    pub fn generate_image_id() -> String {
        format!("img_{}", Uuid::new_v4().simple())
    }

    /// Builds the object key an upload lands under, namespaced by owner and
    /// image id
    #[must_use]
    pub fn storage_key(owner_uid: &str, image_id: &str, filename: &str) -> String {
        format!("uploads/{owner_uid}/{image_id}/{filename}")
    }

    /// Computes the externally reachable URL for an object key. No network
    /// call.
    #[must_use]
    pub fn public_url(&self, storage_key: &str) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{storage_key}",
            self.bucket_name, self.region
        )
    }

    /// Authorizes exactly one upload: reserves a fresh image id and signs a
    /// PUT authorization for its storage key with the declared content type.
    ///
    /// Signing is local cryptographic work against the client's credentials;
    /// no data-plane call is made here.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ConfigError` if the presigning config cannot be
    /// built and `StorageError::AuthorizationError` if signing fails (e.g.
    /// missing credentials) - both are server-side faults
    pub async fn authorize_upload(
        &self,
        owner_uid: &str,
        filename: &str,
        mime_type: &str,
    ) -> StorageResult<UploadGrant> {
        let image_id = Self::generate_image_id();
        let storage_key = Self::storage_key(owner_uid, &image_id, filename);

        let presigning_config =
            PresigningConfig::expires_in(Duration::from_secs(self.presigned_url_expiry_secs))
                .map_err(|e| {
                    StorageError::ConfigError(format!("Failed to create presigning config: {e}"))
                })?;

        let presigned = self
            .s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&storage_key)
            .content_type(mime_type)
            .presigned(presigning_config)
            .await
            .map_err(|e| {
                StorageError::AuthorizationError(format!("Failed to generate presigned URL: {e}"))
            })?;

        let expires_at: DateTime<Utc> =
            Utc::now() + Duration::from_secs(self.presigned_url_expiry_secs);

        Ok(UploadGrant {
            image_id,
            storage_key,
            presigned_url: presigned.uri().to_string(),
            expires_at,
            expires_in: self.presigned_url_expiry_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::BehaviorVersion;
    use std::collections::HashSet;

    fn gateway() -> MediaStorage {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .build();
        MediaStorage::new(
            Arc::new(S3Client::from_conf(config)),
            "imagehost-media".to_string(),
            "us-east-1".to_string(),
            3600,
        )
    }

    #[test]
    fn test_storage_key_layout() {
        assert_eq!(
            MediaStorage::storage_key("u_alice", "img_abc", "cat.png"),
            "uploads/u_alice/img_abc/cat.png"
        );
    }

    #[test]
    fn test_public_url_shape() {
        assert_eq!(
            gateway().public_url("uploads/u_alice/img_abc/cat.png"),
            "https://imagehost-media.s3.us-east-1.amazonaws.com/uploads/u_alice/img_abc/cat.png"
        );
    }

    #[test]
    fn test_image_ids_are_prefixed_and_unique() {
        let ids: HashSet<String> = (0..100).map(|_| MediaStorage::generate_image_id()).collect();
        assert_eq!(ids.len(), 100);
        for id in &ids {
            assert!(id.starts_with("img_"));
            // img_ + 32 hex chars of a simple-format UUIDv4
            assert_eq!(id.len(), 36);
        }
    }
}
