/// Record repository
///
/// Translates record operations into blob store calls. Every write is a full
/// replace of the payload; there is no existence check before a create and
/// no merge of payload fields on update.
use crate::{
    blob_store::{BlobStore, ObjectMetadata},
    config::StorageConfig,
    error::{StoreError, StoreResult},
    records::{
        derive_key, recover_id, validate_id, Message, Record, RecordKind, RecordPayload,
        RecordSummary, NAME_METADATA_KEY,
    },
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Repository for agents and transcriptions
#[derive(Clone)]
pub struct RecordRepository {
    store: BlobStore,
    config: Arc<StorageConfig>,
}

impl RecordRepository {
    pub fn new(store: BlobStore, config: Arc<StorageConfig>) -> Self {
        Self { store, config }
    }

    /// Underlying blob store
    pub fn store(&self) -> &BlobStore {
        &self.store
    }

    fn key_for(&self, kind: RecordKind, id: &str) -> StoreResult<String> {
        let prefix = self.config.directory_for(kind)?;
        Ok(derive_key(prefix, id))
    }

    fn name_metadata(name: Option<&str>) -> Option<ObjectMetadata> {
        name.map(|name| ObjectMetadata::from([(NAME_METADATA_KEY.to_string(), name.to_string())]))
    }

    /// Shared write path of create and update
    async fn write(
        &self,
        kind: RecordKind,
        id: &str,
        name: Option<&str>,
        payload: RecordPayload,
    ) -> StoreResult<Record> {
        validate_id(id, "id")?;
        payload.expect_kind(kind)?;

        // Names are only projected for kinds that expose them
        let name = name.filter(|_| kind.exposes_name());
        let key = self.key_for(kind, id)?;
        let body = payload.encode()?;

        self.store
            .put(&key, body, Self::name_metadata(name).as_ref())
            .await?;

        Ok(Record {
            kind,
            id: id.to_string(),
            name: name.map(String::from),
            payload,
        })
    }

    /// Store a new record, silently replacing any record with the same id
    ///
    /// Kinds that expose a name require one.
    pub async fn create(
        &self,
        kind: RecordKind,
        id: &str,
        name: Option<&str>,
        payload: RecordPayload,
    ) -> StoreResult<Record> {
        if kind.exposes_name() && name.map_or(true, |n| n.trim().is_empty()) {
            return Err(StoreError::Validation("name is required".to_string()));
        }

        let record = self.write(kind, id, name, payload).await?;
        info!(kind = %kind, id, "created record");
        Ok(record)
    }

    /// Replace a record's payload
    ///
    /// When `name` is `None` the stored name is left unchanged.
    pub async fn update(
        &self,
        kind: RecordKind,
        id: &str,
        name: Option<&str>,
        payload: RecordPayload,
    ) -> StoreResult<Record> {
        let record = self.write(kind, id, name, payload).await?;
        info!(kind = %kind, id, "updated record");
        Ok(record)
    }

    /// Load a record and, for named kinds, its display name
    ///
    /// A named kind stored without a name is reported as not found.
    pub async fn get(&self, kind: RecordKind, id: &str) -> StoreResult<Record> {
        validate_id(id, "id")?;
        let key = self.key_for(kind, id)?;

        let bytes = self.store.get(&key).await?;
        let payload = RecordPayload::decode(kind, &bytes)?;

        let name = if kind.exposes_name() {
            let name = self
                .store
                .get_metadata(&key)
                .await?
                .remove(NAME_METADATA_KEY)
                .ok_or_else(|| StoreError::NotFound(format!("{} has no name metadata", key)))?;
            Some(name)
        } else {
            None
        };

        Ok(Record {
            kind,
            id: id.to_string(),
            name,
            payload,
        })
    }

    /// List records of a kind from object metadata, without reading payloads
    pub async fn list(&self, kind: RecordKind) -> StoreResult<Vec<RecordSummary>> {
        let prefix = self.config.directory_for(kind)?;
        let objects = self.store.list(prefix).await?;
        debug!(kind = %kind, count = objects.len(), "listed records");

        Ok(objects
            .into_iter()
            .map(|mut object| RecordSummary {
                id: recover_id(prefix, &object.key).to_string(),
                name: if kind.exposes_name() {
                    object.metadata.remove(NAME_METADATA_KEY)
                } else {
                    None
                },
                created: object.created,
                updated: object.updated,
            })
            .collect())
    }

    /// Delete a record
    pub async fn delete(&self, kind: RecordKind, id: &str) -> StoreResult<()> {
        validate_id(id, "id")?;
        let key = self.key_for(kind, id)?;

        self.store.delete(&key).await?;
        info!(kind = %kind, id, "deleted record");
        Ok(())
    }

    /// Read a transcription without its system messages
    ///
    /// The stored object keeps them; they are only hidden from readers.
    pub async fn get_transcription(&self, call_sid: &str) -> StoreResult<Vec<Message>> {
        validate_id(call_sid, "callSid")?;

        match self.get(RecordKind::Transcription, call_sid).await?.payload {
            RecordPayload::Transcription(messages) => Ok(messages
                .into_iter()
                .filter(|message| !message.is_system())
                .collect()),
            RecordPayload::Agent(_) => Err(StoreError::Internal(
                "transcription decoded as agent".to_string(),
            )),
        }
    }

    /// Write `contents` to the configured document object at bucket root
    ///
    /// Strings are stored as their raw text, other values as JSON.
    pub async fn save_document(&self, contents: &Value) -> StoreResult<String> {
        let object_name = self.config.object_name()?;

        let body = match contents {
            Value::String(text) => text.clone().into_bytes(),
            other => serde_json::to_vec(other)?,
        };

        self.store.put(object_name, body, None).await?;
        info!(object = object_name, "saved document");
        Ok(object_name.to_string())
    }
}
