use serde_json::{Map, Value};
use uuid::Uuid;
use crate::error::{CResult, Error};

/// The two reserved attribute names every document carries once stored.
pub const ID_FIELD: &str = "_id";
pub const REV_FIELD: &str = "_rev";

/// Reads `_id` out of a JSON object, if present and a string.
pub fn extract_id(doc: &Value) -> Option<String> {
    doc.as_object()?.get(ID_FIELD)?.as_str().map(str::to_owned)
}

/// Reads `_rev` out of a JSON object, if present and a string.
pub fn extract_rev(doc: &Value) -> Option<String> {
    doc.as_object()?.get(REV_FIELD)?.as_str().map(str::to_owned)
}

/// Generates a fresh `_id` for a document whose caller did not supply one.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Merges `input` over `existing` (key-wise object overlay, input wins on
/// collision, non-overlapping existing fields survive), forces `_id` to
/// `id` and `_rev` to `rev` on the result.
///
/// `existing` is `None` for a document being created. Both `existing` and
/// `input` must be JSON objects; anything else is an `InvalidPayload` error,
/// since a document is a mapping from attribute name to value, never a
/// scalar or array at the top level.
pub fn merge(existing: Option<&Value>, input: &Value, id: &str, rev: &str) -> CResult<Value> {
    let mut merged = match existing {
        Some(existing) => as_object(existing)?.clone(),
        None => Map::new(),
    };

    for (key, value) in as_object(input)? {
        merged.insert(key.clone(), value.clone());
    }

    merged.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    merged.insert(REV_FIELD.to_string(), Value::String(rev.to_string()));

    Ok(Value::Object(merged))
}

/// Forces `_id` onto a verbatim document, used by the rollback and
/// remote-apply paths which store the caller's document byte-for-byte
/// except for the key it is addressed by.
pub fn with_forced_id(doc: &Value, id: &str) -> CResult<Value> {
    let mut obj = as_object(doc)?.clone();
    obj.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    Ok(Value::Object(obj))
}

fn as_object(value: &Value) -> CResult<&Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| Error::InvalidPayload("document must be a JSON object".to_string()))
}
