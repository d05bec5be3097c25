use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;

use imagehost_backend::{
    api_key::ApiKeySigner, image_store::ImageStore, media_storage::MediaStorage,
    redis_client::RedisClient, server, types::Environment, uploader::Uploader,
    user_directory::UserDirectory,
};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    // Configure logging format based on environment
    // Use JSON format for staging/production (Datadog), regular format for development
    match environment {
        Environment::Production | Environment::Staging => {
            fmt()
                .json()
                .with_env_filter(EnvFilter::from_default_env())
                .init();
        }
        Environment::Development { .. } => {
            fmt().with_env_filter(EnvFilter::from_default_env()).init();
        }
    }

    let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
    let media_storage = Arc::new(MediaStorage::new(
        s3_client,
        environment.s3_bucket(),
        environment.aws_region(),
        environment.presigned_url_expiry_secs(),
    ));

    let redis_client = RedisClient::new(&environment.redis_url()).await?;
    let user_directory = Arc::new(UserDirectory::new(redis_client.clone()));
    let image_store = Arc::new(ImageStore::new(redis_client));

    let signer = Arc::new(ApiKeySigner::new(&environment.api_key_secret()));
    let uploader = Arc::new(Uploader::new(media_storage, image_store));

    server::start(environment, signer, user_directory, uploader).await
}
