//! Core data structures used across the data migrator.

pub mod descriptor;
pub mod entity_type;
pub mod record;

pub use descriptor::{EntityDescriptor, ForeignKey};
pub use entity_type::EntityType;
pub use record::Record;
