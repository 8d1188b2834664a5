//! DynamoDB destination store - configuration, writes, scans and batched deletes.

mod config;
mod convert;
mod store;

pub use config::DynamoDbConfig;
pub use convert::{attribute_to_json, item_to_record, json_to_attribute, record_to_item};
pub use store::{DynamoDbDestinationStore, MAX_BATCH_WRITE_ITEMS};
