//! Source reader trait definition.

use async_trait::async_trait;
use data_migrator_shared::{EntityType, Record};

use crate::errors::SourceError;

/// Read access to the document store the migration starts from.
///
/// Implementations return every stored record of an entity type, including the
/// source-native identifier (`_id`) and any revision marker. Stripping those
/// fields is the pipeline's job, not the reader's.
#[async_trait]
pub trait SourceReader: Send + Sync {
    /// Fetch all records of the given entity type.
    ///
    /// # Arguments
    ///
    /// * `entity` - The entity type whose collection is read
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Record>)` - Every record currently stored, possibly empty
    /// * `Err(SourceError)` - If the store is unreachable or the query fails
    async fn find_all(&self, entity: EntityType) -> Result<Vec<Record>, SourceError>;
}
