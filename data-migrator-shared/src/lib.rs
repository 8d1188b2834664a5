//! # Data Migrator Shared
//!
//! This crate defines the data structures shared by the data migrator crates:
//! the migrated entity types, the raw record shape flowing between the stores,
//! and the descriptors used to express foreign-key dependencies.

pub mod types;

pub use types::descriptor::{EntityDescriptor, ForeignKey};
pub use types::entity_type::EntityType;
pub use types::record::{
    key_string, Record, DESTINATION_ID_FIELD, REVISION_FIELD, SOURCE_ID_FIELD,
};
