//! Conversion between JSON records and DynamoDB attribute maps.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use data_migrator_shared::Record;
use serde_json::{Number, Value};

use crate::errors::DestinationError;

/// Convert a record into a DynamoDB item.
pub fn record_to_item(record: &Record) -> HashMap<String, AttributeValue> {
    record
        .iter()
        .map(|(key, value)| (key.clone(), json_to_attribute(value)))
        .collect()
}

/// Convert a JSON value into an attribute value.
pub fn json_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(json_to_attribute).collect()),
        Value::Object(obj) => AttributeValue::M(
            obj.iter()
                .map(|(key, value)| (key.clone(), json_to_attribute(value)))
                .collect(),
        ),
    }
}

/// Convert a DynamoDB item back into a record.
pub fn item_to_record(item: &HashMap<String, AttributeValue>) -> Result<Record, DestinationError> {
    item.iter()
        .map(|(key, value)| Ok((key.clone(), attribute_to_json(value)?)))
        .collect()
}

/// Convert an attribute value into JSON.
///
/// Binary attributes have no JSON form and are rejected.
pub fn attribute_to_json(value: &AttributeValue) -> Result<Value, DestinationError> {
    match value {
        AttributeValue::Null(_) => Ok(Value::Null),
        AttributeValue::Bool(b) => Ok(Value::Bool(*b)),
        AttributeValue::S(s) => Ok(Value::String(s.clone())),
        AttributeValue::N(n) => parse_number(n).map(Value::Number),
        AttributeValue::Ss(items) => Ok(Value::Array(
            items.iter().cloned().map(Value::String).collect(),
        )),
        AttributeValue::Ns(items) => items
            .iter()
            .map(|n| parse_number(n).map(Value::Number))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        AttributeValue::L(items) => items
            .iter()
            .map(attribute_to_json)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        AttributeValue::M(map) => item_to_record(map).map(Value::Object),
        other => Err(DestinationError::conversion(format!(
            "Unsupported attribute value: {:?}",
            other
        ))),
    }
}

fn parse_number(raw: &str) -> Result<Number, DestinationError> {
    raw.parse::<Number>()
        .map_err(|e| DestinationError::conversion(format!("Invalid number {}: {}", raw, e)))
}
