use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use data_migrator_shared::{EntityType, Record};

use crate::errors::SourceError;
use crate::interfaces::SourceReader;

/// Source reader returning pre-registered records.
#[derive(Default)]
pub struct InMemorySourceReader {
    records: RwLock<HashMap<EntityType, Vec<Record>>>,
    failing_reads: RwLock<HashSet<EntityType>>,
}

impl InMemorySourceReader {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record for an entity type.
    pub fn insert(&self, entity: EntityType, record: Record) {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(entity)
            .or_default()
            .push(record);
    }

    /// Make every subsequent read of `entity` fail.
    pub fn fail_reads_for(&self, entity: EntityType) {
        self.failing_reads
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(entity);
    }
}

#[async_trait]
impl SourceReader for InMemorySourceReader {
    async fn find_all(&self, entity: EntityType) -> Result<Vec<Record>, SourceError> {
        if self
            .failing_reads
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&entity)
        {
            return Err(SourceError::read(format!("Simulated read failure for {}", entity)));
        }

        Ok(self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&entity)
            .cloned()
            .unwrap_or_default())
    }
}
