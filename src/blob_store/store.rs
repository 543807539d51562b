/// Blob Store handle
///
/// Owns the long-lived backend for one bucket and instruments every call
use crate::{
    blob_store::{disk::DiskBlobBackend, memory::MemoryBlobBackend, BlobBackend, ObjectMetadata, ObjectSummary},
    config::{BlobstoreConfig, StorageConfig},
    error::{StoreError, StoreResult},
    metrics,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Main blob store handle
///
/// Cloning is cheap: clones share the same backend client.
#[derive(Clone)]
pub struct BlobStore {
    bucket: String,
    backend: Arc<dyn BlobBackend>,
}

impl BlobStore {
    /// Wrap an existing backend
    pub fn new(bucket: impl Into<String>, backend: Arc<dyn BlobBackend>) -> Self {
        Self {
            bucket: bucket.into(),
            backend,
        }
    }

    /// Build the backend selected by configuration
    pub async fn from_config(config: &StorageConfig) -> StoreResult<Self> {
        let backend: Arc<dyn BlobBackend> = match &config.blobstore {
            BlobstoreConfig::Memory => {
                tracing::warn!("Using in-memory blob storage; records are lost on restart");
                Arc::new(MemoryBlobBackend::new())
            }
            BlobstoreConfig::Disk { location } => {
                tracing::info!(
                    "Using disk blob storage at {:?} (bucket: {})",
                    location,
                    config.bucket_name
                );
                Arc::new(DiskBlobBackend::new(location.clone(), &config.bucket_name))
            }
            #[cfg(feature = "s3")]
            BlobstoreConfig::S3 {
                region,
                endpoint,
                access_key_id,
                secret_access_key,
            } => {
                let s3_config = crate::blob_store::s3::S3Config {
                    bucket: config.bucket_name.clone(),
                    region: region.clone(),
                    endpoint: endpoint.clone(),
                    access_key_id: access_key_id.clone(),
                    secret_access_key: secret_access_key.clone(),
                };
                Arc::new(crate::blob_store::s3::S3BlobBackend::new(s3_config).await?)
            }
            #[cfg(not(feature = "s3"))]
            BlobstoreConfig::S3 { .. } => {
                return Err(StoreError::Configuration(
                    "S3 backend requires building with the `s3` feature".to_string(),
                ));
            }
        };

        Ok(Self::new(config.bucket_name.clone(), backend))
    }

    /// Bucket this store writes to
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        metadata: Option<&ObjectMetadata>,
    ) -> StoreResult<()> {
        tracing::debug!(bucket = %self.bucket, key, bytes = data.len(), "put object");
        observe("put", self.backend.put(key, data, metadata)).await
    }

    pub async fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        tracing::debug!(bucket = %self.bucket, key, "get object");
        observe("get", self.backend.get(key)).await
    }

    pub async fn get_metadata(&self, key: &str) -> StoreResult<ObjectMetadata> {
        tracing::debug!(bucket = %self.bucket, key, "get object metadata");
        observe("get_metadata", self.backend.get_metadata(key)).await
    }

    pub async fn delete(&self, key: &str) -> StoreResult<()> {
        tracing::debug!(bucket = %self.bucket, key, "delete object");
        observe("delete", self.backend.delete(key)).await
    }

    pub async fn list(&self, prefix: &str) -> StoreResult<Vec<ObjectSummary>> {
        tracing::debug!(bucket = %self.bucket, prefix, "list objects");
        observe("list", self.backend.list(prefix)).await
    }
}

/// Record outcome and latency of one backend call
async fn observe<T>(
    operation: &'static str,
    call: impl Future<Output = StoreResult<T>>,
) -> StoreResult<T> {
    let started = Instant::now();
    let result = call.await;

    let outcome = match &result {
        Ok(_) => "ok",
        Err(StoreError::NotFound(_)) => "not_found",
        Err(_) => "error",
    };
    metrics::record_blob_operation(operation, outcome, started.elapsed().as_secs_f64());

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn storage(blobstore: BlobstoreConfig) -> StorageConfig {
        StorageConfig {
            bucket_name: "records".to_string(),
            agents_path: None,
            transcriptions_directory: None,
            object_name: None,
            blobstore,
        }
    }

    #[tokio::test]
    async fn test_from_config_memory() {
        let store = BlobStore::from_config(&storage(BlobstoreConfig::Memory))
            .await
            .unwrap();

        store.put("a.json", b"{}".to_vec(), None).await.unwrap();
        assert_eq!(store.bucket(), "records");
        assert_eq!(store.list("").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_from_config_disk_uses_bucket_directory() {
        let dir = tempdir().unwrap();
        let store = BlobStore::from_config(&storage(BlobstoreConfig::Disk {
            location: dir.path().to_path_buf(),
        }))
        .await
        .unwrap();

        store.put("a.json", b"{}".to_vec(), None).await.unwrap();
        assert!(dir.path().join("records/objects/a.json").exists());
    }

    #[tokio::test]
    async fn test_clones_share_backend() {
        let store = BlobStore::new("records", Arc::new(MemoryBlobBackend::new()));
        let clone = store.clone();

        store.put("shared", b"1".to_vec(), None).await.unwrap();
        assert_eq!(clone.get("shared").await.unwrap(), b"1".to_vec());
    }

    #[cfg(not(feature = "s3"))]
    #[tokio::test]
    async fn test_s3_requires_feature() {
        let result = BlobStore::from_config(&storage(BlobstoreConfig::S3 {
            region: "us-east-1".to_string(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
        }))
        .await;

        assert!(matches!(result, Err(StoreError::Configuration(_))));
    }
}
