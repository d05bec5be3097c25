use std::borrow::Cow;
use std::sync::Arc;

use axum::{Extension, Json};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::{Validate, ValidationError};

use crate::{
    middleware::auth::AuthenticatedUser,
    types::{AppError, Data, ValidatedJson},
    uploader::{self, UploadError, Uploader},
};

#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct UploadRequest {
    /// Original filename, becomes the last segment of the storage key
    #[validate(custom(function = "filename_field"))]
    pub filename: String,
    /// Declared content type the upload authorization is bound to
    #[validate(custom(function = "mime_type_field"))]
    pub mime_type: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct UploadRequestResponse {
    /// Reserved image identifier, echoed back on completion
    pub image_id: String,
    /// Object key the upload must land under
    pub storage_key: String,
    /// Presigned URL for the direct PUT to the bucket
    pub presigned_url: String,
    /// ISO-8601 UTC timestamp when the authorization expires
    pub expires_at: String,
    /// Authorization lifetime in seconds
    pub expires_in: u64,
}

/// Phase 1 of the upload protocol: authorizes one direct-to-bucket upload.
///
/// No metadata is persisted here; the returned identifier is reserved in the
/// response only.
///
/// # Errors
///
/// - `AppError` 400 - empty filename or invalid mime type
/// - `AppError` 500 - the storage gateway could not sign the authorization
#[instrument(skip(uploader, payload), fields(uid = %user.uid))]
pub async fn request_upload(
    user: AuthenticatedUser,
    Extension(uploader): Extension<Arc<Uploader>>,
    ValidatedJson(payload): ValidatedJson<UploadRequest>,
) -> Result<Json<Data<UploadRequestResponse>>, AppError> {
    let grant = uploader
        .initiate_upload(&user.uid, &payload.filename, &payload.mime_type)
        .await?;

    Ok(Json(Data::new(UploadRequestResponse {
        image_id: grant.image_id,
        storage_key: grant.storage_key,
        presigned_url: grant.presigned_url,
        expires_at: grant.expires_at.to_rfc3339(),
        expires_in: grant.expires_in,
    })))
}

#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct CompleteUploadRequest {
    /// Identifier returned by the upload request
    #[validate(custom(function = "image_id_field"))]
    pub image_id: String,
    /// Storage key returned by the upload request
    #[validate(custom(function = "storage_key_field"))]
    pub storage_key: String,
    /// Original filename
    #[validate(custom(function = "filename_field"))]
    pub filename: String,
    /// Declared content type
    #[validate(custom(function = "mime_type_field"))]
    pub mime_type: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CompleteUploadResponse {
    /// Image identifier
    pub id: String,
    /// Public URL of the uploaded object
    pub url: String,
}

/// Phase 2 of the upload protocol: persists the image metadata.
///
/// Trusts the caller's `image_id`/`storage_key` as returned by phase 1 and
/// does not verify the object against the bucket. Retrying a completion
/// overwrites the record with equivalent data.
///
/// # Errors
///
/// - `AppError` 400 - a required field is empty or malformed
/// - `AppError` 500 - the metadata write failed
#[instrument(skip(uploader, payload), fields(uid = %user.uid))]
pub async fn complete_upload(
    user: AuthenticatedUser,
    Extension(uploader): Extension<Arc<Uploader>>,
    ValidatedJson(payload): ValidatedJson<CompleteUploadRequest>,
) -> Result<Json<Data<CompleteUploadResponse>>, AppError> {
    let image = uploader
        .complete_upload(
            &user.uid,
            &payload.image_id,
            &payload.storage_key,
            &payload.filename,
            &payload.mime_type,
        )
        .await?;

    Ok(Json(Data::new(CompleteUploadResponse {
        id: image.id,
        url: image.url,
    })))
}

// Field rules delegate to the uploader's validators so the extractor and the
// orchestrator enforce the same checks with the same messages.

fn filename_field(filename: &str) -> Result<(), ValidationError> {
    field_result(uploader::validate_filename(filename))
}

fn mime_type_field(mime_type: &str) -> Result<(), ValidationError> {
    field_result(uploader::validate_mime_type(mime_type))
}

fn image_id_field(image_id: &str) -> Result<(), ValidationError> {
    field_result(uploader::validate_required(
        image_id,
        "image_id must not be empty",
    ))
}

fn storage_key_field(storage_key: &str) -> Result<(), ValidationError> {
    field_result(uploader::validate_required(
        storage_key,
        "storage_key must not be empty",
    ))
}

fn field_result(result: Result<(), UploadError>) -> Result<(), ValidationError> {
    result.map_err(|err| {
        let mut field_error = ValidationError::new("validation");
        if let UploadError::Validation(message) = err {
            field_error.message = Some(Cow::Borrowed(message));
        }
        field_error
    })
}
