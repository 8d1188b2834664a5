//! MongoDB source store - connection, reading, and BSON conversion.

mod convert;
mod reader;

pub use convert::{bson_to_json, document_to_record};
pub use reader::{MongoSourceReader, DEFAULT_DATABASE};
