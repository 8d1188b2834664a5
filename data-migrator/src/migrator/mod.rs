//! Entity migrators.
//!
//! One migrator runs per entity type: it reads every source record, assigns
//! surrogate ids, rewrites foreign keys and writes the results to the
//! destination through a bounded pool of write tasks. The stage is fail-fast:
//! the first error stops it and no identifier mappings are committed.

mod transform;

use std::sync::Arc;
use std::time::Instant;

use data_migrator_repository::{DestinationStore, IdGenerator, SourceReader};
use data_migrator_shared::EntityDescriptor;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument};

use crate::errors::MigrationError;
use crate::id_map::IdentifierMap;

pub use transform::{transform_record, TransformedRecord};

/// Default number of concurrent destination writes within a stage.
pub const DEFAULT_WRITE_CONCURRENCY: usize = 16;

/// Default number of written records between progress log lines.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 500;

/// Collaborators shared by every stage of a run.
#[derive(Clone)]
pub struct Stores {
    pub source: Arc<dyn SourceReader>,
    pub destination: Arc<dyn DestinationStore>,
    pub id_generator: Arc<dyn IdGenerator>,
}

impl Stores {
    pub fn new(
        source: Arc<dyn SourceReader>,
        destination: Arc<dyn DestinationStore>,
        id_generator: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            source,
            destination,
            id_generator,
        }
    }
}

/// Tuning for a single entity stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageConfig {
    /// Maximum number of in-flight destination writes. `1` writes sequentially.
    pub write_concurrency: usize,
    /// Number of written records between progress log lines.
    pub progress_interval: usize,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            write_concurrency: DEFAULT_WRITE_CONCURRENCY,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Migrates every record of one entity type.
pub struct EntityMigrator {
    descriptor: EntityDescriptor,
    records_parent_ids: bool,
    stores: Stores,
    config: StageConfig,
}

impl EntityMigrator {
    /// Create a migrator for `descriptor`.
    ///
    /// When `records_parent_ids` is set, the stage adds an identifier map entry
    /// per migrated record so later stages can resolve references to it.
    pub fn new(
        descriptor: EntityDescriptor,
        records_parent_ids: bool,
        stores: Stores,
        config: StageConfig,
    ) -> Self {
        Self {
            descriptor,
            records_parent_ids,
            stores,
            config,
        }
    }

    /// Run the stage and return the number of migrated records.
    ///
    /// All records are transformed before the first write, so an unresolved
    /// foreign key aborts the stage without writing anything. Identifier map
    /// entries are committed only after every write has succeeded.
    #[instrument(skip(self, id_map), fields(entity = %self.descriptor.entity))]
    pub async fn migrate(&self, id_map: &mut IdentifierMap) -> Result<usize, MigrationError> {
        let entity = self.descriptor.entity;
        let start_time = Instant::now();

        let records = self
            .stores
            .source
            .find_all(entity)
            .await
            .map_err(|source| MigrationError::Read { entity, source })?;

        info!(entity = %entity, count = records.len(), "Read source records");

        if records.is_empty() {
            return Ok(0);
        }

        let transformed = records
            .into_iter()
            .map(|record| {
                let new_id = self.stores.id_generator.new_id();
                transform_record(&self.descriptor, record, new_id, id_map)
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Staged before writing so colliding source ids fail the stage up front.
        let staged = if self.records_parent_ids {
            let mut staged = IdentifierMap::new();
            for t in &transformed {
                staged.put(entity, t.source_id.clone(), t.new_id.clone())?;
            }
            Some(staged)
        } else {
            None
        };

        let written = self.write_all(transformed).await?;

        if let Some(staged) = staged {
            id_map.merge(staged)?;
            debug!(entity = %entity, mappings = id_map.len(entity), "Recorded identifier mappings");
        }

        info!(
            entity = %entity,
            migrated = written,
            elapsed_secs = format!("{:.2}", start_time.elapsed().as_secs_f64()),
            "Migrated records"
        );

        Ok(written)
    }

    /// Write records through a semaphore-bounded set of tasks, stopping at the
    /// first failure.
    async fn write_all(&self, records: Vec<TransformedRecord>) -> Result<usize, MigrationError> {
        let entity = self.descriptor.entity;
        let total = records.len();
        let semaphore = Arc::new(Semaphore::new(self.config.write_concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for transformed in records {
            let semaphore = semaphore.clone();
            let destination = self.stores.destination.clone();

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.map_err(|e| MigrationError::Task {
                    entity,
                    message: e.to_string(),
                })?;

                destination
                    .create(entity, &transformed.record)
                    .await
                    .map_err(|source| MigrationError::Write { entity, source })
            });
        }

        let progress_interval = self.config.progress_interval.max(1);
        let mut written = 0;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => {
                    written += 1;
                    if written % progress_interval == 0 || written == total {
                        info!(entity = %entity, "  Progress: {}/{} records", written, total);
                    }
                }
                Ok(Err(e)) => {
                    tasks.abort_all();
                    return Err(e);
                }
                Err(e) => {
                    tasks.abort_all();
                    return Err(MigrationError::Task {
                        entity,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(written)
    }
}
