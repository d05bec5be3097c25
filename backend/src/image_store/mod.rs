//! Image metadata storage in Redis
//!
//! One hash per image under `img:{iid}`, plus a per-owner sorted set
//! `user:{uid}:images` (member = image id, score = creation timestamp) that
//! answers "list my images most-recent-first".

mod error;

use std::collections::HashMap;
use std::time::Duration;

use redis::AsyncCommands;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;

pub use error::{ImageStoreError, ImageStoreResult};

use crate::redis_client::RedisClient;

const REDIS_TIMEOUT: Duration = Duration::from_secs(5);

/// Default and maximum page size for listings
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// A stored image record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Image {
    /// Server-generated identifier
    pub id: String,
    /// Owner's user identifier, fixed at creation
    pub owner_uid: String,
    /// Object key in the bucket
    pub key: String,
    /// Public URL of the object
    pub url: String,
    /// Original filename as uploaded
    pub filename: String,
    /// Declared content type
    pub mime: String,
    /// Visibility flag, reserved for future access control - never enforced
    pub private: bool,
    /// Unix timestamp of completion
    pub created_at: i64,
    /// View counter, reserved - never incremented
    pub views: u64,
}

impl Image {
    fn to_field_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("id", self.id.clone()),
            ("owner_uid", self.owner_uid.clone()),
            ("key", self.key.clone()),
            ("url", self.url.clone()),
            ("filename", self.filename.clone()),
            ("mime", self.mime.clone()),
            ("private", u8::from(self.private).to_string()),
            ("created_at", self.created_at.to_string()),
            ("views", self.views.to_string()),
        ]
    }

    /// Rebuilds a record from its Redis hash; `None` when required fields
    /// are missing or unparseable (treated as corruption by callers)
    fn from_hash(id: &str, hash: &HashMap<String, String>) -> Option<Self> {
        Some(Self {
            id: id.to_string(),
            owner_uid: hash.get("owner_uid")?.clone(),
            key: hash.get("key")?.clone(),
            url: hash.get("url")?.clone(),
            filename: hash.get("filename")?.clone(),
            mime: hash.get("mime")?.clone(),
            private: hash.get("private").is_some_and(|v| v == "1"),
            created_at: hash.get("created_at")?.parse().ok()?,
            views: hash.get("views").and_then(|v| v.parse().ok()).unwrap_or(0),
        })
    }
}

fn image_key(image_id: &str) -> String {
    format!("img:{image_id}")
}

fn owner_index_key(owner_uid: &str) -> String {
    format!("user:{owner_uid}:images")
}

/// Image store client for Redis operations
pub struct ImageStore {
    redis_client: RedisClient,
}

impl ImageStore {
    /// Creates a new image store client
    #[must_use]
    pub const fn new(redis_client: RedisClient) -> Self {
        Self { redis_client }
    }

    /// Writes the record and appends it to the owner's index.
    ///
    /// Both writes go through one MULTI/EXEC pipeline, so readers never
    /// observe one without the other. Atomicity against a crash mid-request
    /// is whatever Redis provides, not a stronger contract. Re-writing the
    /// same id with equivalent data (a client retry of completion) is safe:
    /// the hash is overwritten and ZADD updates the score in place.
    ///
    /// # Errors
    ///
    /// Returns `ImageStoreError` if the Redis operation fails or times out
    pub async fn put_image(&self, image: &Image) -> ImageStoreResult<()> {
        let mut conn = self.redis_client.conn();
        let mut pipe = redis::pipe();
        pipe.atomic()
            .hset_multiple(image_key(&image.id), &image.to_field_pairs())
            .ignore()
            .zadd(
                owner_index_key(&image.owner_uid),
                &image.id,
                image.created_at,
            )
            .ignore();

        timeout(REDIS_TIMEOUT, pipe.query_async::<()>(&mut conn))
            .await
            .map_err(|_| ImageStoreError::Timeout)??;

        Ok(())
    }

    /// Fetches one record, `None` when absent
    ///
    /// # Errors
    ///
    /// Returns `ImageStoreError` if the Redis operation fails or times out
    pub async fn get_image(&self, image_id: &str) -> ImageStoreResult<Option<Image>> {
        let mut conn = self.redis_client.conn();
        let hash: HashMap<String, String> =
            timeout(REDIS_TIMEOUT, conn.hgetall(image_key(image_id)))
                .await
                .map_err(|_| ImageStoreError::Timeout)??;

        if hash.is_empty() {
            return Ok(None);
        }

        Ok(Image::from_hash(image_id, &hash))
    }

    /// Returns up to `limit` most recently created images for the owner,
    /// most recent first.
    ///
    /// Reads the index with ZREVRANGE, then batch-fetches every record in
    /// one pipeline. Index entries whose record is missing or unreadable are
    /// skipped, not treated as fatal.
    ///
    /// # Errors
    ///
    /// Returns `ImageStoreError` if a Redis operation fails or times out
    pub async fn list_images(
        &self,
        owner_uid: &str,
        limit: usize,
    ) -> ImageStoreResult<Vec<Image>> {
        let limit = limit.min(DEFAULT_LIST_LIMIT);
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut conn = self.redis_client.conn();
        let stop = limit as isize - 1;
        let ids: Vec<String> = timeout(
            REDIS_TIMEOUT,
            conn.zrevrange(owner_index_key(owner_uid), 0, stop),
        )
        .await
        .map_err(|_| ImageStoreError::Timeout)??;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for id in &ids {
            pipe.hgetall(image_key(id));
        }
        let hashes: Vec<HashMap<String, String>> =
            timeout(REDIS_TIMEOUT, pipe.query_async(&mut conn))
                .await
                .map_err(|_| ImageStoreError::Timeout)??;

        Ok(ids
            .iter()
            .zip(hashes.iter())
            .filter_map(|(id, hash)| {
                if hash.is_empty() {
                    None
                } else {
                    Image::from_hash(id, hash)
                }
            })
            .collect())
    }
}
