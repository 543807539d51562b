/// In-memory blob storage backend
use crate::{
    blob_store::{merge_metadata, BlobBackend, ObjectMetadata, ObjectSummary, StoredObjectMeta},
    error::{StoreError, StoreResult},
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct MemoryObject {
    data: Vec<u8>,
    meta: StoredObjectMeta,
}

/// Memory storage backend
///
/// Keeps every object in a sorted map, so listings come back in key order.
/// Contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryBlobBackend {
    objects: RwLock<BTreeMap<String, MemoryObject>>,
    writes: std::sync::atomic::AtomicUsize,
}

impl MemoryBlobBackend {
    /// Create an empty memory backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `put` calls served so far
    pub fn write_count(&self) -> usize {
        self.writes.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Number of stored objects
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl BlobBackend for MemoryBlobBackend {
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        metadata: Option<&ObjectMetadata>,
    ) -> StoreResult<()> {
        let now = Utc::now();
        let mut objects = self.objects.write().await;
        self.writes.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        match objects.get_mut(key) {
            Some(object) => {
                object.data = data;
                merge_metadata(&mut object.meta.metadata, metadata);
                object.meta.updated = now;
            }
            None => {
                let mut initial = ObjectMetadata::new();
                merge_metadata(&mut initial, metadata);
                objects.insert(
                    key.to_string(),
                    MemoryObject {
                        data,
                        meta: StoredObjectMeta::new(initial, now),
                    },
                );
            }
        }

        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|object| object.data.clone())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn get_metadata(&self, key: &str) -> StoreResult<ObjectMetadata> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|object| object.meta.metadata.clone())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.objects
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<ObjectSummary>> {
        let objects = self.objects.read().await;

        Ok(objects
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, object)| object.meta.clone().into_summary(key.clone()))
            .collect())
    }
}
