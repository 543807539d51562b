/// Record storage
///
/// Maps agents and transcriptions onto objects in the blob store: one JSON
/// object per record at `<directory-prefix><id>.json`, with the agent name
/// kept in object metadata instead of the payload.

pub mod id;
pub mod keys;
pub mod models;
pub mod repository;

pub use id::IdGenerator;
pub use keys::{derive_key, recover_id, validate_id, JSON_EXTENSION};
pub use models::*;
pub use repository::RecordRepository;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Metadata entry holding a record's display name
pub const NAME_METADATA_KEY: &str = "name";

/// Kind of record; selects the directory prefix and payload shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Agent,
    Transcription,
}

impl RecordKind {
    /// Whether records of this kind carry a display name in metadata
    pub fn exposes_name(self) -> bool {
        matches!(self, RecordKind::Agent)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Agent => "agent",
            RecordKind::Transcription => "transcription",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
