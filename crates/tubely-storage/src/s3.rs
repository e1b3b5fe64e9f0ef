use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path;
use object_store::{
    Attribute, Attributes, ObjectStore, PutOptions, PutPayload, Result as ObjectResult,
    WriteMultipart,
};
use std::path::Path as FsPath;
use std::sync::Arc;
use tokio::io::AsyncReadExt;

/// Files up to this size go up in a single PUT; larger ones use a
/// multipart upload with parts of this size.
const MULTIPART_PART_SIZE: usize = 8 * 1024 * 1024;

/// Parts buffered or in flight per upload.
const MAX_PARTS_IN_FLIGHT: usize = 4;

fn content_type_attributes(content_type: &str) -> Attributes {
    let mut attributes = Attributes::new();
    attributes.insert(Attribute::ContentType, content_type.to_string().into());
    attributes
}

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// Credentials come from the standard AWS environment variables.
    /// `endpoint_url` points at an S3-compatible provider such as MinIO
    /// (`http://localhost:9000`).
    pub fn new(bucket: String, region: String, endpoint_url: Option<String>) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(Self::with_store(Arc::new(store), bucket, region, endpoint_url))
    }

    /// Wrap an already-built object store. URLs are still derived from
    /// `bucket`, `region` and `endpoint_url`.
    pub fn with_store(
        store: Arc<dyn ObjectStore>,
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> Self {
        S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        }
    }

    /// Public URL for an object.
    ///
    /// AWS: `https://{bucket}.s3.{region}.amazonaws.com/{key}`.
    /// S3-compatible endpoints use path style: `{endpoint}/{bucket}/{key}`.
    pub fn generate_url(&self, key: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }

    fn validate_key(storage_key: &str) -> StorageResult<()> {
        if storage_key.is_empty() || storage_key.contains("..") || storage_key.starts_with('/') {
            return Err(StorageError::InvalidKey(storage_key.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        Self::validate_key(storage_key)?;

        let size = data.len() as u64;
        let location = Path::from(storage_key);
        let opts = PutOptions {
            attributes: content_type_attributes(content_type),
            ..Default::default()
        };
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self
            .store
            .put_opts(&location, PutPayload::from(Bytes::from(data)), opts)
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %storage_key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        let url = self.generate_url(storage_key);

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(url)
    }

    /// Stream a file from disk. Memory use is bounded by
    /// `MULTIPART_PART_SIZE * MAX_PARTS_IN_FLIGHT` regardless of file size.
    async fn upload_file(
        &self,
        storage_key: &str,
        path: &FsPath,
        content_type: &str,
    ) -> StorageResult<String> {
        Self::validate_key(storage_key)?;

        let mut file = tokio::fs::File::open(path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to open {}: {}", path.display(), e))
        })?;
        let size = file
            .metadata()
            .await
            .map_err(|e| {
                StorageError::UploadFailed(format!("Failed to stat {}: {}", path.display(), e))
            })?
            .len();

        if size <= MULTIPART_PART_SIZE as u64 {
            let mut data = Vec::with_capacity(size as usize);
            file.read_to_end(&mut data).await.map_err(|e| {
                StorageError::UploadFailed(format!("Failed to read {}: {}", path.display(), e))
            })?;
            return self.upload_with_key(storage_key, data, content_type).await;
        }

        let location = Path::from(storage_key);
        let start = std::time::Instant::now();

        let upload = self
            .store
            .put_multipart_opts(&location, content_type_attributes(content_type).into())
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
        let mut writer = WriteMultipart::new_with_chunk_size(upload, MULTIPART_PART_SIZE);

        let mut buf = vec![0u8; MULTIPART_PART_SIZE];
        loop {
            let n = match file.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    let _ = writer.abort().await;
                    return Err(StorageError::UploadFailed(format!(
                        "Failed to read {}: {}",
                        path.display(),
                        e
                    )));
                }
            };
            if let Err(e) = writer.wait_for_capacity(MAX_PARTS_IN_FLIGHT).await {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    "S3 multipart part upload failed"
                );
                let _ = writer.abort().await;
                return Err(StorageError::UploadFailed(e.to_string()));
            }
            writer.write(&buf[..n]);
        }

        writer.finish().await.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %storage_key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 multipart upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 multipart upload successful"
        );

        Ok(self.generate_url(storage_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use object_store::ObjectStoreExt;

    async fn read_object(memory: &InMemory, key: &str) -> Vec<u8> {
        let stored = memory.get(&Path::from(key)).await.unwrap();
        stored.bytes().await.unwrap().to_vec()
    }

    fn memory_storage(endpoint: Option<&str>) -> (S3Storage, Arc<InMemory>) {
        let memory = Arc::new(InMemory::new());
        let storage = S3Storage::with_store(
            memory.clone(),
            "tubely-videos".to_string(),
            "us-east-2".to_string(),
            endpoint.map(String::from),
        );
        (storage, memory)
    }

    #[test]
    fn test_generate_url_aws() {
        let (storage, _) = memory_storage(None);
        assert_eq!(
            storage.generate_url("landscape/abc.mp4"),
            "https://tubely-videos.s3.us-east-2.amazonaws.com/landscape/abc.mp4"
        );
    }

    #[test]
    fn test_generate_url_custom_endpoint() {
        let (storage, _) = memory_storage(Some("http://localhost:9000/"));
        assert_eq!(
            storage.generate_url("other/abc.mp4"),
            "http://localhost:9000/tubely-videos/other/abc.mp4"
        );
    }

    #[tokio::test]
    async fn test_upload_sets_content_type() {
        let (storage, memory) = memory_storage(None);
        let url = storage
            .upload_with_key("portrait/abc.mp4", b"fake mp4".to_vec(), "video/mp4")
            .await
            .unwrap();
        assert!(url.ends_with("/portrait/abc.mp4"));

        let stored = memory.get(&Path::from("portrait/abc.mp4")).await.unwrap();
        let content_type: Option<&str> = stored
            .attributes
            .get(&Attribute::ContentType)
            .map(AsRef::as_ref);
        assert_eq!(content_type, Some("video/mp4"));
        assert_eq!(stored.bytes().await.unwrap().as_ref(), b"fake mp4");
    }

    #[tokio::test]
    async fn test_upload_overwrites_existing_key() {
        let (storage, memory) = memory_storage(None);
        storage
            .upload_with_key("other/present.mp4", vec![1, 2, 3], "video/mp4")
            .await
            .unwrap();
        storage
            .upload_with_key("other/present.mp4", vec![4, 5], "video/mp4")
            .await
            .unwrap();
        assert_eq!(read_object(&memory, "other/present.mp4").await, vec![4, 5]);
    }

    #[tokio::test]
    async fn test_upload_file_reads_from_disk() {
        let (storage, memory) = memory_storage(None);
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"processed").unwrap();

        storage
            .upload_file("landscape/f.mp4", file.path(), "video/mp4")
            .await
            .unwrap();
        assert_eq!(read_object(&memory, "landscape/f.mp4").await, b"processed");
    }

    #[tokio::test]
    async fn test_upload_file_streams_large_files_in_parts() {
        let (storage, memory) = memory_storage(None);
        let data: Vec<u8> = (0..MULTIPART_PART_SIZE * 2 + 12345)
            .map(|i| (i % 251) as u8)
            .collect();
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), &data).unwrap();

        let url = storage
            .upload_file("landscape/big.mp4", file.path(), "video/mp4")
            .await
            .unwrap();
        assert_eq!(
            url,
            "https://tubely-videos.s3.us-east-2.amazonaws.com/landscape/big.mp4"
        );

        let stored = memory.get(&Path::from("landscape/big.mp4")).await.unwrap();
        let content_type: Option<&str> = stored
            .attributes
            .get(&Attribute::ContentType)
            .map(AsRef::as_ref);
        assert_eq!(content_type, Some("video/mp4"));
        assert_eq!(stored.bytes().await.unwrap().as_ref(), data.as_slice());
    }

    #[tokio::test]
    async fn test_upload_file_missing_source() {
        let (storage, _) = memory_storage(None);
        let dir = tempfile::tempdir().unwrap();
        let result = storage
            .upload_file("other/x.mp4", &dir.path().join("gone.mp4"), "video/mp4")
            .await;
        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
    }

    #[tokio::test]
    async fn test_rejects_traversal_keys() {
        let (storage, _) = memory_storage(None);
        let result = storage
            .upload_with_key("../escape.mp4", vec![0], "video/mp4")
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }
}
