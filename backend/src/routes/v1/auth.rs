use std::sync::Arc;

use axum::{Extension, Json};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::{
    api_key::{ApiKeyClaims, ApiKeySigner},
    types::{AppError, Data, ValidatedJson},
    user_directory::UserDirectory,
};

#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct IssueKeyRequest {
    /// Username to register the key under, defaults to "demo"
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct IssueKeyResponse {
    /// Opaque signed API key, sent back via the `X-API-Key` header
    pub api_key: String,
    /// Stable user identifier the key was issued for
    pub uid: String,
}

/// Issues a development API key, creating the user record on first use.
///
/// Safe to call repeatedly for the same username: the uid derivation is
/// deterministic and the user's creation timestamp is preserved.
///
/// # Errors
///
/// - `AppError` - the user record could not be written or the key could not
///   be signed
#[instrument(skip(signer, user_directory, payload))]
pub async fn issue_key(
    Extension(signer): Extension<Arc<ApiKeySigner>>,
    Extension(user_directory): Extension<Arc<UserDirectory>>,
    ValidatedJson(payload): ValidatedJson<IssueKeyRequest>,
) -> Result<Json<Data<IssueKeyResponse>>, AppError> {
    let username = payload
        .username
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| "demo".to_string());

    let user = user_directory.ensure_user(&username).await?;
    let api_key = signer.issue(&ApiKeyClaims {
        uid: user.uid.clone(),
    })?;

    Ok(Json(Data::new(IssueKeyResponse {
        api_key,
        uid: user.uid,
    })))
}
