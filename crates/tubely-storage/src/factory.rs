use crate::{LocalStorage, S3Storage, Storage, StorageBackend, StorageError, StorageResult};
use std::sync::Arc;
use tubely_core::Config;

/// Create the video storage backend selected by `STORAGE_BACKEND`.
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend {
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;

            let storage = S3Storage::new(bucket, region, config.s3_endpoint.clone())?;
            tracing::info!(backend = %StorageBackend::S3, "Video storage initialized");
            Ok(Arc::new(storage))
        }

        StorageBackend::Local => {
            let base_path = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let base_url = config.local_storage_base_url.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
            })?;

            let storage = LocalStorage::new(base_path, base_url).await?;
            tracing::info!(backend = %StorageBackend::Local, "Video storage initialized");
            Ok(Arc::new(storage))
        }
    }
}

/// Create the thumbnail asset store rooted at `ASSETS_ROOT`.
pub async fn create_asset_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    let storage =
        LocalStorage::new(config.assets_root.clone(), config.assets_base_url.clone()).await?;
    Ok(Arc::new(storage))
}
