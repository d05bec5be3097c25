//! Image hosting backend service
//!
//! Clients obtain a development API key, request a presigned S3 upload
//! authorization, upload directly to the bucket, confirm completion to
//! persist metadata in Redis, and list their images.

/// Opaque signed API keys
pub mod api_key;

/// Image metadata storage
pub mod image_store;

/// S3 upload authorizations and public URLs
pub mod media_storage;

/// Authentication middleware
pub mod middleware;

/// Shared Redis connection handling
pub mod redis_client;

/// Route handlers
pub mod routes;

/// Server startup
pub mod server;

/// Environment, errors and response envelopes
pub mod types;

/// Two-phase upload orchestration
pub mod uploader;

/// User records
pub mod user_directory;
