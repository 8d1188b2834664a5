//! Run-scoped mapping from source-native identifiers to surrogate identifiers.
//!
//! The map is owned by the orchestrator for the duration of one run and lent
//! to each entity migrator. Parent types write their entries once their stage
//! has fully succeeded; dependent types only read.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use data_migrator_shared::EntityType;
use thiserror::Error;

/// Lookup of an id that was never recorded for the parent type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no surrogate id recorded for {parent} {old_id}")]
pub struct MissingMappingError {
    pub parent: EntityType,
    pub old_id: String,
}

/// A second record of the same type resolved to an already mapped source id.
///
/// Source ids are compared by their string form, so `1` and `"1"` collide.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{entity} source id {old_id} is mapped more than once")]
pub struct DuplicateMappingError {
    pub entity: EntityType,
    pub old_id: String,
}

/// Source id to surrogate id associations, partitioned by entity type.
#[derive(Debug, Default)]
pub struct IdentifierMap {
    entries: HashMap<EntityType, HashMap<String, String>>,
}

impl IdentifierMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `old_id` of `entity` was migrated as `new_id`.
    ///
    /// An existing entry is never overwritten.
    pub fn put(
        &mut self,
        entity: EntityType,
        old_id: impl Into<String>,
        new_id: impl Into<String>,
    ) -> Result<(), DuplicateMappingError> {
        match self.entries.entry(entity).or_default().entry(old_id.into()) {
            Entry::Occupied(existing) => Err(DuplicateMappingError {
                entity,
                old_id: existing.key().clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(new_id.into());
                Ok(())
            }
        }
    }

    /// Move every entry of `other` into this map.
    ///
    /// Fails on the first source id already present; entries moved before it
    /// are kept.
    pub fn merge(&mut self, other: IdentifierMap) -> Result<(), DuplicateMappingError> {
        for (entity, ids) in other.entries {
            for (old_id, new_id) in ids {
                self.put(entity, old_id, new_id)?;
            }
        }
        Ok(())
    }

    /// Resolve the surrogate id of a migrated `entity` record.
    pub fn get(&self, entity: EntityType, old_id: &str) -> Result<&str, MissingMappingError> {
        self.entries
            .get(&entity)
            .and_then(|ids| ids.get(old_id))
            .map(String::as_str)
            .ok_or_else(|| MissingMappingError {
                parent: entity,
                old_id: old_id.to_string(),
            })
    }

    /// Number of entries recorded for an entity type.
    pub fn len(&self, entity: EntityType) -> usize {
        self.entries.get(&entity).map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(HashMap::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_get() {
        let mut map = IdentifierMap::new();
        map.put(EntityType::Project, "p1", "new-1").unwrap();

        assert_eq!(map.get(EntityType::Project, "p1"), Ok("new-1"));
        assert_eq!(map.len(EntityType::Project), 1);
        assert!(!map.is_empty());
    }

    #[test]
    fn test_unknown_id_is_missing_mapping() {
        let map = IdentifierMap::new();
        assert!(map.is_empty());

        let err = map.get(EntityType::Project, "p1").unwrap_err();
        assert_eq!(err.parent, EntityType::Project);
        assert_eq!(err.old_id, "p1");
    }

    #[test]
    fn test_entries_are_scoped_by_entity_type() {
        let mut map = IdentifierMap::new();
        map.put(EntityType::User, "shared", "user-new").unwrap();
        map.put(EntityType::Project, "shared", "project-new").unwrap();

        assert_eq!(map.get(EntityType::User, "shared"), Ok("user-new"));
        assert_eq!(map.get(EntityType::Project, "shared"), Ok("project-new"));
        assert!(map.get(EntityType::Issue, "shared").is_err());
    }

    #[test]
    fn test_duplicate_source_id_is_rejected() {
        let mut map = IdentifierMap::new();
        map.put(EntityType::Project, "1", "new-1").unwrap();

        let err = map.put(EntityType::Project, "1", "new-2").unwrap_err();

        assert_eq!(err.entity, EntityType::Project);
        assert_eq!(err.old_id, "1");
        assert_eq!(map.get(EntityType::Project, "1"), Ok("new-1"));
    }

    #[test]
    fn test_merge_moves_entries() {
        let mut staged = IdentifierMap::new();
        staged.put(EntityType::Project, "p1", "g1").unwrap();
        staged.put(EntityType::Project, "p2", "g2").unwrap();

        let mut map = IdentifierMap::new();
        map.merge(staged).unwrap();
        assert_eq!(map.len(EntityType::Project), 2);

        let mut conflicting = IdentifierMap::new();
        conflicting.put(EntityType::Project, "p2", "g9").unwrap();
        assert!(map.merge(conflicting).is_err());
        assert_eq!(map.get(EntityType::Project, "p2"), Ok("g2"));
    }
}
