use crate::config::StorageConfig;
use crate::services::storage::S3StorageService;
use aws_sdk_s3::config::Region;
use std::sync::Arc;
use tracing::info;

pub async fn setup_storage(config: &StorageConfig) -> Arc<S3StorageService> {
    info!(
        "☁️  S3 Storage: {} (Bucket: {})",
        config.endpoint.as_deref().unwrap_or("aws"),
        config.bucket
    );

    let mut loader = aws_config::from_env().region(Region::new(config.region.clone()));
    if let Some(endpoint) = &config.endpoint {
        loader = loader.endpoint_url(endpoint);
    }
    if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
        loader = loader.credentials_provider(aws_sdk_s3::config::Credentials::new(
            access_key.clone(),
            secret_key.clone(),
            None,
            None,
            "static",
        ));
    }
    let aws_config = loader.load().await;

    // MinIO only understands path-style addressing
    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(config.endpoint.is_some())
        .build();

    let s3_client = aws_sdk_s3::Client::from_conf(s3_config);

    // Ensure bucket exists
    match s3_client.head_bucket().bucket(&config.bucket).send().await {
        Ok(_) => info!("✅ Bucket '{}' is ready", config.bucket),
        Err(_) => {
            info!("🪣 Bucket '{}' not found, creating...", config.bucket);
            if let Err(e) = s3_client.create_bucket().bucket(&config.bucket).send().await {
                tracing::error!("❌ Failed to create bucket '{}': {}", config.bucket, e);
            } else {
                info!("✅ Bucket '{}' created successfully", config.bucket);
            }
        }
    }

    Arc::new(S3StorageService::new(
        s3_client,
        config.bucket.clone(),
        config.public_base_url.clone(),
    ))
}
