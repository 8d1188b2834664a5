//! # Data Migrator Repository
//!
//! This crate provides the store interfaces consumed by the migration
//! pipeline, along with concrete implementations: a MongoDB source reader, a
//! DynamoDB destination store, in-memory stores for tests and local runs, and
//! the UUID-based surrogate identifier generator.

pub mod dynamo;
pub mod errors;
pub mod identifiers;
pub mod interfaces;
pub mod memory;
pub mod mongo;

pub use dynamo::{DynamoDbConfig, DynamoDbDestinationStore};
pub use errors::{DestinationError, SourceError};
pub use identifiers::UuidGenerator;
pub use interfaces::{DestinationStore, IdGenerator, SourceReader};
pub use memory::{InMemoryDestinationStore, InMemorySourceReader, SequentialIdGenerator};
pub use mongo::MongoSourceReader;
