use std::sync::Arc;

use aws_credential_types::Credentials;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_sdk_s3::Client as S3Client;
use axum::{body::Body, http::Request, response::Response, Extension, Router};
use tower::ServiceExt;

use imagehost_backend::{
    api_key::{ApiKeyClaims, ApiKeySigner},
    image_store::ImageStore,
    media_storage::MediaStorage,
    middleware::auth::API_KEY_HEADER,
    redis_client::RedisClient,
    routes,
    types::Environment,
    uploader::Uploader,
    user_directory::UserDirectory,
};

pub const TEST_BUCKET: &str = "imagehost-test";
pub const TEST_REGION: &str = "us-east-1";
pub const TEST_SECRET: &str = "test-secret";

/// Initialize tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// S3 client that signs locally with fixed credentials. Presigning never
/// touches the network, so tests built on this run without AWS or LocalStack.
pub fn offline_s3_client() -> S3Client {
    let credentials = Credentials::from_keys("test-access-key", "test-secret-key", None);
    let config = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(TEST_REGION))
        .credentials_provider(credentials)
        .build();
    S3Client::from_conf(config)
}

pub fn offline_media_storage(expiry_secs: u64) -> Arc<MediaStorage> {
    Arc::new(MediaStorage::new(
        Arc::new(offline_s3_client()),
        TEST_BUCKET.to_string(),
        TEST_REGION.to_string(),
        expiry_secs,
    ))
}

pub fn test_signer() -> Arc<ApiKeySigner> {
    Arc::new(ApiKeySigner::new(TEST_SECRET))
}

pub fn api_key_for(signer: &ApiKeySigner, uid: &str) -> String {
    signer
        .issue(&ApiKeyClaims {
            uid: uid.to_string(),
        })
        .expect("issue test key")
}

/// Router plus the signer used to mint keys for it
pub struct TestContext {
    pub router: Router,
    pub signer: Arc<ApiKeySigner>,
}

impl TestContext {
    /// Full router wired against LocalStack S3 and a local Redis.
    /// Only usable from tests that require those services.
    pub async fn new() -> Self {
        setup_test_env();

        let environment = Environment::Development {
            presign_expiry_override: None,
        };

        let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
        let media_storage = Arc::new(MediaStorage::new(
            s3_client,
            environment.s3_bucket(),
            environment.aws_region(),
            environment.presigned_url_expiry_secs(),
        ));

        let redis_client = RedisClient::new(&environment.redis_url())
            .await
            .expect("connect to local Redis");
        let user_directory = Arc::new(UserDirectory::new(redis_client.clone()));
        let image_store = Arc::new(ImageStore::new(redis_client));

        let signer = test_signer();
        let uploader = Arc::new(Uploader::new(media_storage, image_store));

        let router: Router = routes::handler()
            .layer(Extension(environment))
            .layer(Extension(signer.clone()))
            .layer(Extension(user_directory))
            .layer(Extension(uploader))
            .into();

        Self { router, signer }
    }

    /// Offline router: signer and environment only. Enough for routes that
    /// reject before touching Redis or S3.
    pub fn offline() -> Self {
        setup_test_env();

        let environment = Environment::Development {
            presign_expiry_override: None,
        };
        let signer = test_signer();

        let router: Router = routes::handler()
            .layer(Extension(environment))
            .layer(Extension(signer.clone()))
            .into();

        Self { router, signer }
    }

    pub async fn send_post_request(
        &self,
        route: &str,
        payload: serde_json::Value,
        api_key: Option<&str>,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let mut builder = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json");

        if let Some(api_key) = api_key {
            builder = builder.header(API_KEY_HEADER, api_key);
        }

        let request = builder.body(Body::from(payload.to_string()))?;
        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    /// POST a raw (possibly malformed) body string as JSON
    pub async fn send_post_request_raw(
        &self,
        route: &str,
        body: String,
        api_key: Option<&str>,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let mut builder = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json");

        if let Some(api_key) = api_key {
            builder = builder.header(API_KEY_HEADER, api_key);
        }

        let request = builder.body(Body::from(body))?;
        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_get_request(
        &self,
        route: &str,
        api_key: Option<&str>,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let mut builder = Request::builder().uri(route).method("GET");

        if let Some(api_key) = api_key {
            builder = builder.header(API_KEY_HEADER, api_key);
        }

        let request = builder.body(Body::empty())?;
        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn parse_response_body(
        &self,
        response: Response,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
        use http_body_util::BodyExt;

        let body = response.into_body().collect().await?.to_bytes();
        let json = serde_json::from_slice(&body)?;
        Ok(json)
    }
}
