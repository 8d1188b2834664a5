use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use data_migrator_shared::{key_string, EntityType, Record, DESTINATION_ID_FIELD};

use crate::errors::DestinationError;
use crate::interfaces::DestinationStore;

/// Destination store that keeps tables in process memory.
///
/// Writes and deletes can be made to fail per entity type to exercise the
/// pipeline's abort paths.
#[derive(Default)]
pub struct InMemoryDestinationStore {
    tables: RwLock<HashMap<EntityType, Vec<Record>>>,
    failing_writes: RwLock<HashSet<EntityType>>,
    failing_deletes: RwLock<HashSet<EntityType>>,
    write_count: AtomicUsize,
}

impl InMemoryDestinationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write to `entity` fail.
    pub fn fail_writes_for(&self, entity: EntityType) {
        self.failing_writes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(entity);
    }

    /// Make every subsequent delete on `entity` fail.
    pub fn fail_deletes_for(&self, entity: EntityType) {
        self.failing_deletes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(entity);
    }

    /// Snapshot of the records stored for an entity type.
    pub fn records(&self, entity: EntityType) -> Vec<Record> {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&entity)
            .cloned()
            .unwrap_or_default()
    }

    pub fn count(&self, entity: EntityType) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&entity)
            .map_or(0, Vec::len)
    }

    /// Total number of successful `create` calls since construction.
    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }

    fn is_failing(set: &RwLock<HashSet<EntityType>>, entity: EntityType) -> bool {
        set.read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&entity)
    }
}

#[async_trait]
impl DestinationStore for InMemoryDestinationStore {
    async fn create(&self, entity: EntityType, record: &Record) -> Result<(), DestinationError> {
        if Self::is_failing(&self.failing_writes, entity) {
            return Err(DestinationError::write(format!(
                "Simulated write failure for {}",
                entity
            )));
        }

        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(entity)
            .or_default()
            .push(record.clone());
        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn scan_all(&self, entity: EntityType) -> Result<Vec<Record>, DestinationError> {
        Ok(self.records(entity))
    }

    async fn remove_all(
        &self,
        entity: EntityType,
        records: &[Record],
    ) -> Result<(), DestinationError> {
        if Self::is_failing(&self.failing_deletes, entity) {
            return Err(DestinationError::delete(format!(
                "Simulated delete failure for {}",
                entity
            )));
        }

        let ids = records
            .iter()
            .map(|record| {
                record
                    .get(DESTINATION_ID_FIELD)
                    .and_then(key_string)
                    .ok_or_else(|| DestinationError::delete("Record has no id key"))
            })
            .collect::<Result<HashSet<_>, _>>()?;

        if let Some(table) = self
            .tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&entity)
        {
            table.retain(|stored| {
                stored
                    .get(DESTINATION_ID_FIELD)
                    .and_then(key_string)
                    .map_or(true, |id| !ids.contains(&id))
            });
        }

        Ok(())
    }
}
