//! S3-compatible blob storage
//!
//! Flat key namespace inside one bucket. The gateway writes originals under
//! their bare file name; the detection service reads them back and writes
//! annotated images under a prediction-scoped prefix.

use std::path::Path;
use std::sync::Arc;

use object_store::{aws::AmazonS3Builder, path::Path as ObjectPath, ObjectStore, PutPayload};

use crate::error::{StorageError, StorageResult};

/// Handle to a single bucket, cheap to clone
#[derive(Clone)]
pub struct BlobStorage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl std::fmt::Debug for BlobStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobStorage").field("bucket", &self.bucket).finish()
    }
}

impl BlobStorage {
    /// Wraps an existing store (tests use `object_store::memory::InMemory`)
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    /// Builds an S3 client for `bucket`
    ///
    /// Credentials, region and endpoint come from the standard `AWS_*`
    /// environment variables.
    pub fn s3_from_env(bucket: &str) -> StorageResult<Self> {
        let store = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| StorageError::Configuration(e.to_string()))?;

        Ok(Self::new(Arc::new(store), bucket))
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Uploads the file at `local_path` under `key`
    pub async fn upload_file(&self, local_path: &Path, key: &str) -> StorageResult<()> {
        let data = tokio::fs::read(local_path)
            .await
            .map_err(|e| StorageError::io(local_path, e))?;
        let size = data.len();

        self.store
            .put(&ObjectPath::from(key), PutPayload::from(data))
            .await
            .map_err(|e| self.map_err(key, e))?;

        log::info!("Uploaded {} ({} bytes) to s3://{}/{}", local_path.display(), size, self.bucket, key);
        Ok(())
    }

    /// Downloads `key` into `local_path`, creating parent directories
    pub async fn download_file(&self, key: &str, local_path: &Path) -> StorageResult<()> {
        let result = self
            .store
            .get(&ObjectPath::from(key))
            .await
            .map_err(|e| self.map_err(key, e))?;
        let bytes = result.bytes().await.map_err(|e| self.map_err(key, e))?;

        if let Some(parent) = local_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StorageError::io(parent, e))?;
            }
        }
        tokio::fs::write(local_path, &bytes)
            .await
            .map_err(|e| StorageError::io(local_path, e))?;

        log::info!(
            "Downloaded s3://{}/{} ({} bytes) to {}",
            self.bucket,
            key,
            bytes.len(),
            local_path.display()
        );
        Ok(())
    }

    /// Reads `key` fully into memory
    pub async fn get_bytes(&self, key: &str) -> StorageResult<bytes::Bytes> {
        let result = self
            .store
            .get(&ObjectPath::from(key))
            .await
            .map_err(|e| self.map_err(key, e))?;
        result.bytes().await.map_err(|e| self.map_err(key, e))
    }

    fn map_err(&self, key: &str, err: object_store::Error) -> StorageError {
        match err {
            object_store::Error::NotFound { .. } => StorageError::NotFound {
                bucket: self.bucket.clone(),
                key: key.to_string(),
            },
            other => StorageError::ObjectStore {
                key: key.to_string(),
                source: other,
            },
        }
    }
}
