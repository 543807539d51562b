/// Object key derivation for records
use crate::error::{StoreError, StoreResult};

/// Extension appended to every record key
pub const JSON_EXTENSION: &str = ".json";

/// Build the object key for a record id
///
/// The prefix is used verbatim; no separator is inserted.
pub fn derive_key(prefix: &str, id: &str) -> String {
    format!("{}{}{}", prefix, id, JSON_EXTENSION)
}

/// Recover a record id from an object key
///
/// Keys outside `prefix` or without the `.json` extension are returned
/// unchanged and used as the id.
pub fn recover_id<'a>(prefix: &str, key: &'a str) -> &'a str {
    key.strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(JSON_EXTENSION))
        .unwrap_or(key)
}

/// Reject ids that cannot round-trip through a key
pub fn validate_id(id: &str, field: &str) -> StoreResult<()> {
    if id.trim().is_empty() {
        return Err(StoreError::Validation(format!("{} is required", field)));
    }

    if id.contains('/') || id == "." || id == ".." {
        return Err(StoreError::Validation(format!("invalid {}: {}", field, id)));
    }

    Ok(())
}
