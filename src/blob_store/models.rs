/// Blob storage data models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key-value metadata attached to an object
pub type ObjectMetadata = HashMap<String, String>;

/// Listing entry for an object; never carries the payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSummary {
    pub key: String,
    pub metadata: ObjectMetadata,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Metadata sidecar persisted next to an object by the disk backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredObjectMeta {
    #[serde(default)]
    pub metadata: ObjectMetadata,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl StoredObjectMeta {
    /// Sidecar for an object written for the first time
    pub fn new(metadata: ObjectMetadata, now: DateTime<Utc>) -> Self {
        Self {
            metadata,
            created: now,
            updated: now,
        }
    }

    pub fn into_summary(self, key: String) -> ObjectSummary {
        ObjectSummary {
            key,
            metadata: self.metadata,
            created: self.created,
            updated: self.updated,
        }
    }
}
