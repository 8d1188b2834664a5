//! In-memory stores for testing and local development.
//!
//! The in-memory source can be pre-populated with records per entity type and
//! the in-memory destination keeps everything in process memory, so the whole
//! pipeline runs without MongoDB or DynamoDB.
//!
//! # Example
//!
//! ```ignore
//! use data_migrator_repository::{InMemoryDestinationStore, InMemorySourceReader};
//! use data_migrator_shared::EntityType;
//!
//! let source = InMemorySourceReader::new();
//! source.insert(EntityType::Project, project_record);
//!
//! let destination = InMemoryDestinationStore::new();
//! destination.fail_writes_for(EntityType::Issue);
//! ```

mod destination;
mod identifiers;
mod source;

pub use destination::InMemoryDestinationStore;
pub use identifiers::SequentialIdGenerator;
pub use source::InMemorySourceReader;
