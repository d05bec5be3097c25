//! Custom extractors for request validation
//!
//! axum's stock `Json` and `Query` rejections are plain-text responses
//! (422/400), which would leak past the `{"error": {...}}` envelope. These
//! wrappers run the same extraction, then `validator`, and report every
//! failure as a 400 `validation` error.

use std::borrow::Cow;

use aide::operation::OperationInput;
use aide::OperationOutput;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use schemars::JsonSchema;
use validator::{Validate, ValidationErrors};

use crate::types::AppError;

/// Custom JSON extractor that validates the payload
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: serde::de::DeserializeOwned + Validate + JsonSchema,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // First extract JSON
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|err| match err {
                JsonRejection::MissingJsonContentType(_) => AppError::new(
                    StatusCode::BAD_REQUEST,
                    "validation",
                    "Missing Content-Type: application/json header",
                ),
                _ => AppError::new(StatusCode::BAD_REQUEST, "validation", "Invalid request body"),
            })?;

        // Then validate
        payload
            .validate()
            .map_err(|errors| validation_error(&errors))?;

        Ok(Self(payload))
    }
}

impl<T> OperationInput for ValidatedJson<T>
where
    T: JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        // Delegate to Json<T>'s implementation since ValidatedJson has the same structure
        Json::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        // Document validation error responses
        AppError::inferred_responses(ctx, operation)
    }
}

/// Custom query-string extractor that validates the parameters
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: serde::de::DeserializeOwned + Validate + JsonSchema,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(payload) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                AppError::new(StatusCode::BAD_REQUEST, "validation", "Invalid query parameters")
            })?;

        payload
            .validate()
            .map_err(|errors| validation_error(&errors))?;

        Ok(Self(payload))
    }
}

impl<T> OperationInput for ValidatedQuery<T>
where
    T: JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        Query::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        AppError::inferred_responses(ctx, operation)
    }
}

/// Surfaces the first field error's message; field rules carry static
/// messages, so anything else falls back to a generic one
fn validation_error(errors: &ValidationErrors) -> AppError {
    for field_errors in errors.field_errors().values() {
        if let Some(error) = field_errors.first() {
            if let Some(Cow::Borrowed(message)) = &error.message {
                return AppError::new(StatusCode::BAD_REQUEST, "validation", *message);
            }
        }
    }
    AppError::new(StatusCode::BAD_REQUEST, "validation", "Invalid request body")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::Request as HttpRequest,
        routing::{get, post},
        Router,
    };
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize, JsonSchema, Validate)]
    struct CreateThing {
        #[validate(length(min = 1, message = "name must not be empty"))]
        name: String,
    }

    #[derive(Debug, Deserialize, JsonSchema, Validate)]
    struct PageQuery {
        #[serde(default)]
        limit: Option<usize>,
    }

    async fn create(ValidatedJson(payload): ValidatedJson<CreateThing>) -> String {
        payload.name
    }

    async fn page(ValidatedQuery(query): ValidatedQuery<PageQuery>) -> String {
        query.limit.unwrap_or(0).to_string()
    }

    fn router() -> Router {
        Router::new().route("/things", post(create).get(page))
    }

    async fn send(request: HttpRequest<Body>) -> axum::response::Response {
        router().oneshot(request).await.unwrap()
    }

    fn json_post(body: &str) -> HttpRequest<Body> {
        HttpRequest::post("/things")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn error_body(response: axum::response::Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_valid_payload_passes_through() {
        let response = send(json_post(r#"{"name":"cat"}"#)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_field_is_enveloped_400() {
        let response = send(json_post("{}")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = error_body(response).await;
        assert_eq!(body["error"]["code"], "validation");
        assert_eq!(body["error"]["message"], "Invalid request body");
    }

    #[tokio::test]
    async fn test_malformed_json_is_enveloped_400() {
        let response = send(json_post("{not json")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = error_body(response).await;
        assert_eq!(body["error"]["code"], "validation");
    }

    #[tokio::test]
    async fn test_missing_content_type_is_enveloped_400() {
        let request = HttpRequest::post("/things")
            .body(Body::from(r#"{"name":"cat"}"#))
            .unwrap();
        let response = send(request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = error_body(response).await;
        assert_eq!(body["error"]["code"], "validation");
    }

    #[tokio::test]
    async fn test_field_rule_failure_reports_its_message() {
        let response = send(json_post(r#"{"name":""}"#)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = error_body(response).await;
        assert_eq!(body["error"]["code"], "validation");
        assert_eq!(body["error"]["message"], "name must not be empty");
    }

    #[tokio::test]
    async fn test_query_accepts_valid_and_missing_limit() {
        let response = send(HttpRequest::get("/things?limit=3").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(HttpRequest::get("/things").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_undeserializable_query_is_enveloped_400() {
        for uri in ["/things?limit=-1", "/things?limit=abc"] {
            let response = send(HttpRequest::get(uri).body(Body::empty()).unwrap()).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri {uri}");

            let body = error_body(response).await;
            assert_eq!(body["error"]["code"], "validation");
        }
    }
}
