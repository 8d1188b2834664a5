//! Descriptors for entity types and their foreign-key dependencies.

use crate::types::entity_type::EntityType;

/// A foreign-key field that must be rewritten to the parent's surrogate id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// Name of the field holding the parent's source-native id.
    pub field: String,
    /// Entity type the field refers to.
    pub parent: EntityType,
}

impl ForeignKey {
    pub fn new(field: impl Into<String>, parent: EntityType) -> Self {
        Self {
            field: field.into(),
            parent,
        }
    }
}

/// One step of a migration: an entity type and its optional parent reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub entity: EntityType,
    pub foreign_key: Option<ForeignKey>,
}

impl EntityDescriptor {
    /// Describe an entity type with no dependencies.
    pub fn independent(entity: EntityType) -> Self {
        Self {
            entity,
            foreign_key: None,
        }
    }

    /// Describe an entity type whose `field` references `parent`.
    pub fn dependent(entity: EntityType, field: impl Into<String>, parent: EntityType) -> Self {
        Self {
            entity,
            foreign_key: Some(ForeignKey::new(field, parent)),
        }
    }

    /// Returns the parent entity type, if any.
    pub fn parent(&self) -> Option<EntityType> {
        self.foreign_key.as_ref().map(|fk| fk.parent)
    }
}
