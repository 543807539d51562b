/// Record data models
use crate::{
    error::{StoreError, StoreResult},
    records::{RecordKind, NAME_METADATA_KEY},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Role whose messages are hidden when a transcription is read
pub const SYSTEM_ROLE: &str = "system";

/// Agent configuration stored as the agent payload
///
/// Fields other than `systemInstruction` are kept as they were written.
/// `system_instruction` is `None` when the key is absent and `Some(None)` when
/// it was written as `null`, so both shapes survive a round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDetails {
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub system_instruction: Option<Option<String>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AgentDetails {
    pub fn with_instruction(instruction: impl Into<String>) -> Self {
        Self {
            system_instruction: Some(Some(instruction.into())),
            extra: Map::new(),
        }
    }

    /// The instruction text, if one is set
    pub fn instruction(&self) -> Option<&str> {
        self.system_instruction.as_ref()?.as_deref()
    }
}

// Only called when the key is present, so `null` becomes `Some(None)`
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// One entry of a call transcription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Message {
    pub fn is_system(&self) -> bool {
        self.role == SYSTEM_ROLE
    }
}

/// Typed record payload, one variant per record kind
#[derive(Debug, Clone, PartialEq)]
pub enum RecordPayload {
    Agent(AgentDetails),
    Transcription(Vec<Message>),
}

impl RecordPayload {
    pub fn kind(&self) -> RecordKind {
        match self {
            RecordPayload::Agent(_) => RecordKind::Agent,
            RecordPayload::Transcription(_) => RecordKind::Transcription,
        }
    }

    /// Serialize to the stored JSON body
    ///
    /// The display name lives in metadata, so a top-level `name` in agent
    /// details is dropped.
    pub fn encode(&self) -> StoreResult<Vec<u8>> {
        let bytes = match self {
            RecordPayload::Agent(details) => {
                if details.extra.contains_key(NAME_METADATA_KEY) {
                    let mut details = details.clone();
                    details.extra.remove(NAME_METADATA_KEY);
                    serde_json::to_vec(&details)?
                } else {
                    serde_json::to_vec(details)?
                }
            }
            RecordPayload::Transcription(messages) => serde_json::to_vec(messages)?,
        };

        Ok(bytes)
    }

    /// Parse a stored JSON body for the given kind
    pub fn decode(kind: RecordKind, bytes: &[u8]) -> StoreResult<Self> {
        Ok(match kind {
            RecordKind::Agent => RecordPayload::Agent(serde_json::from_slice(bytes)?),
            RecordKind::Transcription => {
                RecordPayload::Transcription(serde_json::from_slice(bytes)?)
            }
        })
    }

    /// Ensure the payload variant matches the kind being written
    pub fn expect_kind(&self, kind: RecordKind) -> StoreResult<()> {
        if self.kind() == kind {
            Ok(())
        } else {
            Err(StoreError::Validation(format!(
                "{} payload cannot be stored as {}",
                self.kind(),
                kind
            )))
        }
    }
}

/// A fully loaded record
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub kind: RecordKind,
    pub id: String,
    pub name: Option<String>,
    pub payload: RecordPayload,
}

/// Listing entry built from object metadata alone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}
