use std::sync::Arc;

use axum::{extract::Path, response::Redirect, Extension, Json};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::{
    image_store::{Image, DEFAULT_LIST_LIMIT},
    middleware::auth::AuthenticatedUser,
    types::{AppError, Data, ValidatedQuery},
    uploader::Uploader,
};

#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct ListImagesQuery {
    /// Page size, defaults to 50 and is capped at 50
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ListImagesResponse {
    /// The caller's images, most recent first
    pub images: Vec<Image>,
}

/// Lists the caller's images, most recent first
///
/// # Errors
///
/// - `AppError` 500 - the listing failed
#[instrument(skip(uploader), fields(uid = %user.uid))]
pub async fn list_my_images(
    user: AuthenticatedUser,
    ValidatedQuery(query): ValidatedQuery<ListImagesQuery>,
    Extension(uploader): Extension<Arc<Uploader>>,
) -> Result<Json<Data<ListImagesResponse>>, AppError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .min(DEFAULT_LIST_LIMIT);

    let images = uploader.list_images(&user.uid, limit).await?;

    Ok(Json(Data::new(ListImagesResponse { images })))
}

/// Redirects to the public URL of a stored image
///
/// # Errors
///
/// - `AppError` 404 - no record for this identifier
/// - `AppError` 500 - the lookup failed
#[instrument(skip(uploader))]
pub async fn redirect_to_image(
    Path(image_id): Path<String>,
    Extension(uploader): Extension<Arc<Uploader>>,
) -> Result<Redirect, AppError> {
    let url = uploader.get_image_url(&image_id).await?;
    Ok(Redirect::temporary(&url))
}
