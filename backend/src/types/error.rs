//! Universal error handling for the API

use aide::OperationOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use schemars::JsonSchema;
use serde::Serialize;

use crate::{
    api_key::ApiKeyError, image_store::ImageStoreError, uploader::UploadError,
    user_directory::UserDirectoryError,
};

/// API error response envelope: `{"error": {"code", "message"}}`
#[derive(Debug, Serialize, JsonSchema)]
pub struct ApiErrorResponse {
    /// Error details
    error: ErrorBody,
}

/// Error body containing code and message
#[derive(Debug, Serialize, JsonSchema)]
struct ErrorBody {
    /// Machine-readable error code
    pub code: &'static str,
    /// Human-readable error message
    pub message: &'static str,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub const fn new(status: StatusCode, code: &'static str, msg: &'static str) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                error: ErrorBody { code, message: msg },
            },
        }
    }

    /// 401 for a missing, malformed or unverifiable API key
    #[must_use]
    pub const fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "Missing or invalid API key",
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error based on status code
        match self.status.as_u16() {
            400..=499 => tracing::warn!(
                "Client error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

/// Convert upload orchestration errors to application errors
impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Validation(msg) => {
                tracing::warn!("Validation error: {msg}");
                Self::new(StatusCode::BAD_REQUEST, "validation", msg)
            }
            UploadError::NotFound => {
                Self::new(StatusCode::NOT_FOUND, "not_found", "Image not found")
            }
            UploadError::Storage(e) => {
                // The client did nothing wrong; the S3 control plane rejected us
                tracing::error!("Storage authorization error: {e}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage_authorization",
                    "Failed to authorize upload",
                )
            }
            UploadError::Store(e) => {
                tracing::error!("Image store error: {e}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "persistence",
                    "Image store operation failed",
                )
            }
        }
    }
}

/// Convert user directory errors to application errors
impl From<UserDirectoryError> for AppError {
    fn from(err: UserDirectoryError) -> Self {
        tracing::error!("User directory error: {err}");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "persistence",
            "User store operation failed",
        )
    }
}

/// Convert image store errors to application errors
impl From<ImageStoreError> for AppError {
    fn from(err: ImageStoreError) -> Self {
        tracing::error!("Image store error: {err}");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "persistence",
            "Image store operation failed",
        )
    }
}

/// Convert API key errors to application errors
impl From<ApiKeyError> for AppError {
    fn from(err: ApiKeyError) -> Self {
        match err {
            ApiKeyError::InvalidToken => Self::unauthorized(),
            ApiKeyError::Serialization(e) => {
                tracing::error!("Failed to serialize API key claims: {e}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Failed to issue API key",
                )
            }
        }
    }
}

impl OperationOutput for AppError {
    type Inner = ApiErrorResponse;
}
