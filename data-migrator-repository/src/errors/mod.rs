//! Error types for the data migrator repository.
//!
//! One error type per side of the migration: reading from the source store
//! and writing to or cleaning the destination store.

mod destination_error;
mod source_error;

pub use destination_error::DestinationError;
pub use source_error::SourceError;
