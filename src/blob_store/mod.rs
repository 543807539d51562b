/// Blob Storage System
///
/// Stores byte payloads under string keys inside one named bucket, with a
/// key-value metadata map per object. Supports multiple backend
/// implementations (memory, disk, S3).

pub mod disk;
pub mod memory;
pub mod models;
#[cfg(feature = "s3")]
pub mod s3;
pub mod store;

pub use models::*;
pub use store::BlobStore;

use crate::error::StoreResult;
use async_trait::async_trait;

/// Blob storage backend trait
///
/// Implementations handle the actual storage and retrieval of objects.
/// Absent keys are reported as `StoreError::NotFound` by `get`,
/// `get_metadata` and `delete`.
#[async_trait]
pub trait BlobBackend: Send + Sync {
    /// Store an object, replacing any existing payload at `key`
    ///
    /// Supplied metadata entries overwrite entries with the same name; other
    /// existing entries are kept. `None` leaves the metadata untouched.
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        metadata: Option<&ObjectMetadata>,
    ) -> StoreResult<()>;

    /// Retrieve the full payload of an object
    async fn get(&self, key: &str) -> StoreResult<Vec<u8>>;

    /// Retrieve the metadata map of an object
    async fn get_metadata(&self, key: &str) -> StoreResult<ObjectMetadata>;

    /// Delete an object and its metadata
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// List every object whose key starts with `prefix`, without payloads
    async fn list(&self, prefix: &str) -> StoreResult<Vec<ObjectSummary>>;
}

/// Merge supplied metadata over existing metadata
pub(crate) fn merge_metadata(existing: &mut ObjectMetadata, supplied: Option<&ObjectMetadata>) {
    if let Some(supplied) = supplied {
        for (name, value) in supplied {
            existing.insert(name.clone(), value.clone());
        }
    }
}
