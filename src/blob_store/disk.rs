/// Disk-based blob storage backend
use crate::{
    blob_store::{merge_metadata, BlobBackend, ObjectMetadata, ObjectSummary, StoredObjectMeta},
    error::{StoreError, StoreResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

const OBJECTS_DIR: &str = "objects";
const METADATA_DIR: &str = "metadata";
const TMP_DIR: &str = "tmp";
const SIDECAR_EXTENSION: &str = ".json";

/// Disk storage backend
///
/// Emulates a bucket on the local filesystem:
/// {base}/objects/{key} holds the payload, {base}/metadata/{key}.json the
/// metadata sidecar. Key segments separated by `/` become directories.
/// Writes land in {base}/tmp first and are renamed into place.
#[derive(Clone)]
pub struct DiskBlobBackend {
    base_path: PathBuf,
}

impl DiskBlobBackend {
    /// Create a backend for `bucket` under `location`
    pub fn new(location: PathBuf, bucket: &str) -> Self {
        Self {
            base_path: location.join(bucket),
        }
    }

    /// Reject keys that would escape the bucket directory or collapse on disk
    fn check_key(key: &str) -> StoreResult<()> {
        let valid = !key.is_empty()
            && !key.starts_with('/')
            && !key.contains('\\')
            && key
                .split('/')
                .all(|segment| !segment.is_empty() && segment != "." && segment != "..");

        if valid {
            Ok(())
        } else {
            Err(StoreError::BlobStorage(format!("Invalid object key: {:?}", key)))
        }
    }

    fn object_path(&self, key: &str) -> StoreResult<PathBuf> {
        Self::check_key(key)?;
        Ok(self.base_path.join(OBJECTS_DIR).join(key))
    }

    fn metadata_path(&self, key: &str) -> StoreResult<PathBuf> {
        Self::check_key(key)?;
        Ok(self
            .base_path
            .join(METADATA_DIR)
            .join(format!("{}{}", key, SIDECAR_EXTENSION)))
    }

    /// Write `data` to `target` through a temp file and an atomic rename
    async fn write_atomic(&self, target: &Path, data: &[u8]) -> StoreResult<()> {
        let tmp_dir = self.base_path.join(TMP_DIR);
        fs::create_dir_all(&tmp_dir).await.map_err(|e| {
            StoreError::BlobStorage(format!("Failed to create temp directory: {}", e))
        })?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                StoreError::BlobStorage(format!("Failed to create object directory: {}", e))
            })?;
        }

        let tmp_path = tmp_dir.join(Uuid::new_v4().to_string());
        fs::write(&tmp_path, data).await.map_err(|e| {
            StoreError::BlobStorage(format!("Failed to write temp file: {}", e))
        })?;

        if let Err(e) = fs::rename(&tmp_path, target).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::BlobStorage(format!(
                "Failed to move object into place: {}",
                e
            )));
        }

        Ok(())
    }

    /// Read a sidecar; objects written without one fall back to file times
    async fn read_sidecar(&self, key: &str) -> StoreResult<Option<StoredObjectMeta>> {
        match fs::read(self.metadata_path(key)?).await {
            Ok(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::BlobStorage(format!(
                "Failed to read metadata for {}: {}",
                key, e
            ))),
        }
    }

    async fn fallback_meta(path: &Path) -> StoreResult<StoredObjectMeta> {
        let stat = fs::metadata(path).await?;
        let updated = stat
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        let created = stat.created().map(DateTime::<Utc>::from).unwrap_or(updated);
        Ok(StoredObjectMeta {
            metadata: ObjectMetadata::new(),
            created,
            updated,
        })
    }

    /// Map a path under the objects directory back to its key
    fn key_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(self.base_path.join(OBJECTS_DIR)).ok()?;
        let segments: Option<Vec<&str>> = relative
            .components()
            .map(|component| component.as_os_str().to_str())
            .collect();
        Some(segments?.join("/"))
    }

    /// Directory to start a prefix walk from: the deepest whole-segment
    /// directory contained in the prefix
    fn walk_root(&self, prefix: &str) -> PathBuf {
        let root = self.base_path.join(OBJECTS_DIR);
        match prefix.rfind('/') {
            Some(idx) if Self::check_key(&prefix[..idx]).is_ok() => root.join(&prefix[..idx]),
            _ => root,
        }
    }
}

#[async_trait]
impl BlobBackend for DiskBlobBackend {
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        metadata: Option<&ObjectMetadata>,
    ) -> StoreResult<()> {
        let object_path = self.object_path(key)?;
        let now = Utc::now();

        let existing = if fs::try_exists(&object_path).await? {
            match self.read_sidecar(key).await? {
                Some(meta) => Some(meta),
                None => Some(Self::fallback_meta(&object_path).await?),
            }
        } else {
            None
        };

        let sidecar = match existing {
            Some(mut meta) => {
                merge_metadata(&mut meta.metadata, metadata);
                meta.updated = now;
                meta
            }
            None => {
                let mut initial = ObjectMetadata::new();
                merge_metadata(&mut initial, metadata);
                StoredObjectMeta::new(initial, now)
            }
        };

        self.write_atomic(&object_path, &data).await?;
        self.write_atomic(&self.metadata_path(key)?, &serde_json::to_vec(&sidecar)?)
            .await?;

        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        match fs::read(self.object_path(key)?).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(key.to_string()))
            }
            Err(e) => Err(StoreError::BlobStorage(format!(
                "Failed to read object {}: {}",
                key, e
            ))),
        }
    }

    async fn get_metadata(&self, key: &str) -> StoreResult<ObjectMetadata> {
        if !fs::try_exists(self.object_path(key)?).await? {
            return Err(StoreError::NotFound(key.to_string()));
        }

        Ok(self
            .read_sidecar(key)
            .await?
            .map(|meta| meta.metadata)
            .unwrap_or_default())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        match fs::remove_file(self.object_path(key)?).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(key.to_string()));
            }
            Err(e) => {
                return Err(StoreError::BlobStorage(format!(
                    "Failed to delete object {}: {}",
                    key, e
                )))
            }
        }

        match fs::remove_file(self.metadata_path(key)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::BlobStorage(format!(
                "Failed to delete metadata for {}: {}",
                key, e
            ))),
        }
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<ObjectSummary>> {
        let mut summaries = Vec::new();
        let mut pending = vec![self.walk_root(prefix)];

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    // A prefix that names a file rather than a directory has no children
                    if fs::metadata(&dir).await.is_ok_and(|meta| !meta.is_dir()) {
                        continue;
                    }
                    return Err(StoreError::BlobStorage(format!(
                        "Failed to list {:?}: {}",
                        dir, e
                    )))
                }
            };

            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                    continue;
                }

                let Some(key) = self.key_for(&path) else {
                    tracing::warn!("Skipping non UTF-8 object path {:?}", path);
                    continue;
                };
                if !key.starts_with(prefix) {
                    continue;
                }

                let meta = match self.read_sidecar(&key).await? {
                    Some(meta) => meta,
                    None => Self::fallback_meta(&path).await?,
                };
                summaries.push(meta.into_summary(key));
            }
        }

        summaries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(summaries)
    }
}
