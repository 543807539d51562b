/// S3-compatible blob storage backend
use crate::blob_store::{merge_metadata, BlobBackend, ObjectMetadata, ObjectSummary};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, info};

/// S3 blob storage backend
///
/// Supports AWS S3 and S3-compatible storage providers (MinIO, GCS interop, etc.).
/// Object metadata maps onto S3 user metadata. S3 keeps no creation time, so
/// listings report `LastModified` for both `created` and `updated`.
#[derive(Clone)]
pub struct S3BlobBackend {
    client: Arc<Client>,
    bucket: String,
}

/// Configuration for S3 storage
#[derive(Debug, Clone)]
pub struct S3Config {
    /// S3 bucket name
    pub bucket: String,

    /// AWS region (e.g., "us-east-1")
    pub region: String,

    /// Custom endpoint for S3-compatible services
    /// Example: "https://storage.googleapis.com" or "http://localhost:9000"
    pub endpoint: Option<String>,

    /// Static credentials; the default AWS provider chain is used when absent
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: "us-east-1".to_string(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
        }
    }
}

fn is_not_found<E: std::fmt::Debug>(e: &E) -> bool {
    let error_msg = format!("{:?}", e);
    error_msg.contains("NoSuchKey") || error_msg.contains("NotFound")
}

fn to_chrono(value: Option<&aws_sdk_s3::primitives::DateTime>) -> DateTime<Utc> {
    value
        .and_then(|dt| DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()))
        .unwrap_or_else(Utc::now)
}

impl S3BlobBackend {
    /// Create a new S3 blob backend
    pub async fn new(config: S3Config) -> StoreResult<Self> {
        info!(
            "Initializing S3 blob storage (bucket: {}, region: {})",
            config.bucket, config.region
        );

        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));

        if let (Some(access_key_id), Some(secret_access_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                access_key_id,
                secret_access_key,
                None, // session token
                None, // expiration
                "agent-store",
            ));
        }

        let aws_config = loader.load().await;
        let mut s3_config_builder = S3ConfigBuilder::from(&aws_config);

        if let Some(endpoint) = &config.endpoint {
            debug!("Using custom S3 endpoint: {}", endpoint);
            s3_config_builder = s3_config_builder
                .endpoint_url(endpoint)
                .force_path_style(true); // Required for MinIO and some S3-compatible services
        }

        let client = Client::from_conf(s3_config_builder.build());

        info!("✓ S3 blob storage initialized");

        Ok(Self {
            client: Arc::new(client),
            bucket: config.bucket,
        })
    }

    /// HEAD an object; `None` when it does not exist
    async fn head(
        &self,
        key: &str,
    ) -> StoreResult<Option<aws_sdk_s3::operation::head_object::HeadObjectOutput>> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(response) => Ok(Some(response)),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => {
                error!("Failed to head object in S3: {}", e);
                Err(StoreError::BlobStorage(format!("S3 head object failed: {}", e)))
            }
        }
    }
}

#[async_trait]
impl BlobBackend for S3BlobBackend {
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        metadata: Option<&ObjectMetadata>,
    ) -> StoreResult<()> {
        // PutObject replaces user metadata wholesale, so merge with what is there
        let mut merged = self
            .head(key)
            .await?
            .and_then(|head| head.metadata().cloned())
            .unwrap_or_default();
        merge_metadata(&mut merged, metadata);

        debug!("Uploading object to S3: {} ({} bytes)", key, data.len());

        let content_type = if key.ends_with(".json") {
            "application/json"
        } else {
            "application/octet-stream"
        };

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .set_metadata(Some(merged))
            .send()
            .await
            .map_err(|e| {
                error!("Failed to upload object to S3: {}", e);
                StoreError::BlobStorage(format!("S3 upload failed: {}", e))
            })?;

        debug!("✓ Object uploaded to S3: {}", key);
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        debug!("Downloading object from S3: {}", key);

        match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(response) => {
                let data = response
                    .body
                    .collect()
                    .await
                    .map_err(|e| {
                        error!("Failed to read S3 object body: {}", e);
                        StoreError::BlobStorage(format!("Failed to read S3 object: {}", e))
                    })?
                    .into_bytes()
                    .to_vec();

                Ok(data)
            }
            Err(e) if is_not_found(&e) => Err(StoreError::NotFound(key.to_string())),
            Err(e) => {
                error!("Failed to download object from S3: {}", e);
                Err(StoreError::BlobStorage(format!("S3 download failed: {}", e)))
            }
        }
    }

    async fn get_metadata(&self, key: &str) -> StoreResult<ObjectMetadata> {
        self.head(key)
            .await?
            .map(|head| head.metadata().cloned().unwrap_or_default())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        // DeleteObject succeeds for absent keys
        if self.head(key).await?.is_none() {
            return Err(StoreError::NotFound(key.to_string()));
        }

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to delete object from S3: {}", e);
                StoreError::BlobStorage(format!("S3 delete failed: {}", e))
            })?;

        debug!("✓ Object deleted from S3: {}", key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<ObjectSummary>> {
        let mut summaries = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let page = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| {
                    error!("Failed to list objects in S3: {}", e);
                    StoreError::BlobStorage(format!("S3 list failed: {}", e))
                })?;

            for object in page.contents() {
                let Some(key) = object.key() else { continue };
                let updated = to_chrono(object.last_modified());
                // Listings carry no user metadata; HEAD fetches it without the body
                let metadata = match self.head(key).await? {
                    Some(head) => head.metadata().cloned().unwrap_or_default(),
                    None => continue,
                };

                summaries.push(ObjectSummary {
                    key: key.to_string(),
                    metadata,
                    created: updated,
                    updated,
                });
            }

            match page.next_continuation_token() {
                Some(token) if page.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_s3_config_default() {
        let config = S3Config::default();
        assert_eq!(config.region, "us-east-1");
        assert!(config.endpoint.is_none());
        assert!(config.access_key_id.is_none());
    }

    #[test]
    fn test_not_found_detection() {
        assert!(is_not_found(&"NoSuchKey: the key does not exist"));
        assert!(is_not_found(&"NotFound"));
        assert!(!is_not_found(&"AccessDenied"));
    }

    #[test]
    fn test_missing_timestamp_falls_back_to_now() {
        let before = Utc::now();
        assert!(to_chrono(None) >= before);

        let fixed = aws_sdk_s3::primitives::DateTime::from_secs(1_700_000_000);
        assert_eq!(to_chrono(Some(&fixed)).timestamp(), 1_700_000_000);
    }
}
