use std::sync::Arc;

use aide::OperationIo;
use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::Response,
    Extension,
};

use crate::{api_key::ApiKeySigner, types::AppError};

/// Header carrying the opaque API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Authenticated user extracted from a verified API key
#[derive(Debug, Clone, OperationIo)]
pub struct AuthenticatedUser {
    /// Stable user identifier from the key's claims
    pub uid: String,
}

/// Axum extractor for authenticated user
///
/// Use this in handlers behind the auth middleware to get the verified
/// caller:
/// ```ignore
/// async fn protected_handler(
///     user: AuthenticatedUser,
///     // ... other extractors
/// ) -> Result<impl IntoResponse, AppError> {
///     // Access user.uid
///     Ok("Protected content")
/// }
/// ```
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or_else(|| {
            AppError::new(
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Authentication required but user not found in request extensions",
            )
        })
    }
}

/// API key authentication middleware
///
/// This middleware:
/// 1. Extracts the token from the `X-API-Key` header
/// 2. Verifies it with the [`ApiKeySigner`]
/// 3. Adds [`AuthenticatedUser`] to request extensions
/// 4. Returns 401 for invalid/missing keys, before any handler logic runs
///
/// # Errors
///
/// - `AppError` - Invalid/missing key with 401 status code
pub async fn auth_middleware(
    Extension(signer): Extension<Arc<ApiKeySigner>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|header| header.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(AppError::unauthorized)?;

    let claims = signer
        .verify(token)
        .map_err(|_| AppError::unauthorized())?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { uid: claims.uid });

    Ok(next.run(request).await)
}
