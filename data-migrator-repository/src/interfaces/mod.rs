//! Interface definitions for the stores and identifier generation.
//!
//! The pipeline only depends on these traits, so the MongoDB and DynamoDB
//! implementations can be swapped for in-memory ones in tests.

mod destination_store;
mod id_generator;
mod source_reader;

pub use destination_store::DestinationStore;
pub use id_generator::IdGenerator;
pub use source_reader::SourceReader;
