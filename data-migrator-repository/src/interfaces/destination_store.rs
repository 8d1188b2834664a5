//! Destination store trait definition.
//!
//! This module defines the abstract interface for the key-value store the
//! migration writes to.

use async_trait::async_trait;
use data_migrator_shared::{EntityType, Record};

use crate::errors::DestinationError;

/// Abstracts the key-value store records are migrated into.
///
/// Every record is addressed by its surrogate `id` attribute. Implementations
/// are injected into the orchestrator, which makes testing with in-memory
/// stores straightforward.
#[async_trait]
pub trait DestinationStore: Send + Sync {
    /// Insert a single record.
    ///
    /// # Arguments
    ///
    /// * `entity` - The entity type (table) to write to
    /// * `record` - The fully transformed record, including its `id`
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the record was stored
    /// * `Err(DestinationError)` - If the write fails
    async fn create(&self, entity: EntityType, record: &Record) -> Result<(), DestinationError>;

    /// List every record currently stored for the entity type.
    ///
    /// Only the `id` attribute is guaranteed to be present; implementations
    /// may project away the rest since the result feeds `remove_all`.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Record>)` - All stored records, possibly empty
    /// * `Err(DestinationError)` - If the scan fails
    async fn scan_all(&self, entity: EntityType) -> Result<Vec<Record>, DestinationError>;

    /// Delete the given records.
    ///
    /// Records are identified by their `id` attribute. An empty slice is a
    /// no-op.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If every record was deleted
    /// * `Err(DestinationError)` - If any deletion fails
    async fn remove_all(
        &self,
        entity: EntityType,
        records: &[Record],
    ) -> Result<(), DestinationError>;
}
