use std::time::Duration;

use data_migrator_shared::EntityType;
use serde::{Serialize, Serializer};

/// Outcome of one entity type within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityReport {
    pub entity: EntityType,
    /// Records deleted from the destination during cleanup.
    pub removed: usize,
    /// Records written to the destination during migration.
    pub migrated: usize,
}

/// Summary of a completed migration run.
///
/// Serializes to the JSON summary logged when a run completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// One entry per entity type, in migration order.
    pub entities: Vec<EntityReport>,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

impl MigrationReport {
    /// Number of records migrated for an entity type.
    pub fn migrated(&self, entity: EntityType) -> usize {
        self.find(entity).map_or(0, |report| report.migrated)
    }

    /// Number of records removed for an entity type during cleanup.
    pub fn removed(&self, entity: EntityType) -> usize {
        self.find(entity).map_or(0, |report| report.removed)
    }

    pub fn total_migrated(&self) -> usize {
        self.entities.iter().map(|report| report.migrated).sum()
    }

    pub fn total_removed(&self) -> usize {
        self.entities.iter().map(|report| report.removed).sum()
    }

    fn find(&self, entity: EntityType) -> Option<&EntityReport> {
        self.entities.iter().find(|report| report.entity == entity)
    }
}
