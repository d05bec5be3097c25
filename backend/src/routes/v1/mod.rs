pub mod auth;
pub mod images;
pub mod uploads;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};
use axum::middleware;

use crate::middleware::auth::auth_middleware;

/// Creates the v1 API router with all v1 handler routes
pub fn handler() -> ApiRouter {
    let public_routes = ApiRouter::new()
        .api_route("/dev/issue-key", post(auth::issue_key))
        .route("/image/{id}", axum::routing::get(images::redirect_to_image));

    let protected_routes = ApiRouter::new()
        .api_route("/upload/request", post(uploads::request_upload))
        .api_route("/upload/complete", post(uploads::complete_upload))
        .api_route("/me/images", get(images::list_my_images))
        .layer(middleware::from_fn(auth_middleware));

    public_routes.merge(protected_routes)
}
