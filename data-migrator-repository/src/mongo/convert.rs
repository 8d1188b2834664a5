//! BSON to JSON conversion for source documents.
//!
//! ObjectIds become their hex string so foreign keys compare equal to the
//! referenced `_id`. Datetimes become RFC 3339 strings. Types without a natural
//! JSON shape fall back to relaxed extended JSON.

use data_migrator_shared::Record;
use mongodb::bson::{Bson, Document};
use serde_json::{Number, Value};

use crate::errors::SourceError;

/// Convert a BSON document into a record, preserving field order.
///
/// Fails on values JSON cannot carry (`NaN`, infinities) rather than dropping
/// them.
pub fn document_to_record(document: Document) -> Result<Record, SourceError> {
    convert_document(document, "")
}

fn convert_document(document: Document, prefix: &str) -> Result<Record, SourceError> {
    document
        .into_iter()
        .map(|(key, value)| {
            let path = field_path(prefix, &key);
            bson_to_json(value, &path).map(|value| (key, value))
        })
        .collect()
}

fn field_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Convert a single BSON value found at `path`.
pub fn bson_to_json(value: Bson, path: &str) -> Result<Value, SourceError> {
    let value = match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::String(s) => Value::String(s),
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Int32(i) => Value::from(i),
        Bson::Int64(i) => Value::from(i),
        Bson::Double(f) => Number::from_f64(f).map(Value::Number).ok_or_else(|| {
            SourceError::conversion(format!("Field {} holds non-finite number {}", path, f))
        })?,
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(s) => Value::String(s),
            Err(_) => Value::from(dt.timestamp_millis()),
        },
        Bson::Array(items) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| bson_to_json(item, &field_path(path, &i.to_string())))
                .collect::<Result<_, _>>()?,
        ),
        Bson::Document(doc) => Value::Object(convert_document(doc, path)?),
        other => other.into_relaxed_extjson(),
    };
    Ok(value)
}
