//! Raw record representation shared by the source and destination stores.

use serde_json::{Map, Value};

/// A single record as read from the source store or written to the destination.
///
/// Records are schemaless: field names and values are carried through the
/// migration untouched except for identifiers and foreign keys.
pub type Record = Map<String, Value>;

/// Native document identifier assigned by the source store.
pub const SOURCE_ID_FIELD: &str = "_id";

/// Internal version marker maintained by the source store's ODM.
pub const REVISION_FIELD: &str = "__v";

/// Surrogate identifier attribute in the destination store.
pub const DESTINATION_ID_FIELD: &str = "id";

/// Returns the string form of an identifier-like value.
///
/// Accepts plain strings, numbers and extended-JSON object ids
/// (`{"$oid": "..."}`), so an ObjectId and its hex string resolve to the same
/// key. Returns `None` for anything else, including `null`.
pub fn key_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(obj) => match obj.get("$oid") {
            Some(Value::String(oid)) if obj.len() == 1 => Some(oid.clone()),
            _ => None,
        },
        _ => None,
    }
}
