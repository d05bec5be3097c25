//! User records in Redis
//!
//! One hash per user under `user:{uid}`. Users are created on first key
//! issuance and never deleted.

mod error;

use std::time::Duration;

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;

pub use error::{UserDirectoryError, UserDirectoryResult};

use crate::redis_client::RedisClient;

const REDIS_TIMEOUT: Duration = Duration::from_secs(5);

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct User {
    /// Stable identifier derived from the username
    pub uid: String,
    /// Display username
    pub username: String,
    /// Unix timestamp of first registration
    pub created_at: i64,
}

/// Derives the stable user identifier for a username.
///
/// Deterministic: the same username always maps to the same uid, which makes
/// `ensure_user` idempotent.
#[must_use]
pub fn derive_uid(username: &str) -> String {
    let sanitized: String = username
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();

    format!("u_{sanitized}")
}

fn user_key(uid: &str) -> String {
    format!("user:{uid}")
}

/// User directory client for Redis operations
pub struct UserDirectory {
    redis_client: RedisClient,
}

impl UserDirectory {
    /// Creates a new user directory client
    #[must_use]
    pub const fn new(redis_client: RedisClient) -> Self {
        Self { redis_client }
    }

    /// Creates the user record if absent and returns it.
    ///
    /// Every field is written with HSETNX inside one MULTI/EXEC pipeline, so
    /// re-issuing a key for an existing user never rewrites the original
    /// `created_at`.
    ///
    /// # Errors
    ///
    /// Returns `UserDirectoryError` if the Redis operation fails or times out
    pub async fn ensure_user(&self, username: &str) -> UserDirectoryResult<User> {
        let uid = derive_uid(username);
        let key = user_key(&uid);
        let now = Utc::now().timestamp();

        let mut conn = self.redis_client.conn();
        let mut pipe = redis::pipe();
        pipe.atomic()
            .hset_nx(&key, "uid", &uid)
            .ignore()
            .hset_nx(&key, "username", username)
            .ignore()
            .hset_nx(&key, "created_at", now)
            .ignore()
            .hget(&key, "username")
            .hget(&key, "created_at");

        let (username, created_at): (String, i64) =
            timeout(REDIS_TIMEOUT, pipe.query_async(&mut conn))
                .await
                .map_err(|_| UserDirectoryError::Timeout)??;

        Ok(User {
            uid,
            username,
            created_at,
        })
    }
}
