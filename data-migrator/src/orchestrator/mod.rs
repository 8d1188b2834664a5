//! Orchestrator module for the data migrator.
//!
//! Runs cleanup, then one entity migrator per plan step, sharing a single
//! identifier map across the run.

mod report;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use data_migrator_repository::{DestinationStore, IdGenerator, SourceReader};
use tracing::{error, info, instrument};

use crate::cleanup::cleanup;
use crate::errors::MigrationError;
use crate::id_map::IdentifierMap;
use crate::migrator::{EntityMigrator, StageConfig, Stores};
use crate::plan::MigrationPlan;

pub use report::{EntityReport, MigrationReport};

/// Orchestrator that coordinates a full migration run.
///
/// The orchestrator:
/// - Validates the plan before touching either store
/// - Empties the destination in reverse dependency order
/// - Migrates each entity type in plan order, stopping at the first failure
pub struct Orchestrator {
    plan: MigrationPlan,
    stores: Stores,
    config: StageConfig,
}

impl Orchestrator {
    /// Create a new orchestrator with the default stage configuration.
    pub fn new(
        plan: MigrationPlan,
        source: Arc<dyn SourceReader>,
        destination: Arc<dyn DestinationStore>,
        id_generator: Arc<dyn IdGenerator>,
    ) -> Self {
        Self::with_config(plan, source, destination, id_generator, StageConfig::default())
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        plan: MigrationPlan,
        source: Arc<dyn SourceReader>,
        destination: Arc<dyn DestinationStore>,
        id_generator: Arc<dyn IdGenerator>,
        config: StageConfig,
    ) -> Self {
        Self {
            plan,
            stores: Stores::new(source, destination, id_generator),
            config,
        }
    }

    /// Run the migration to completion.
    ///
    /// A fresh identifier map is created for every run. On error the run
    /// stops immediately; records already written by earlier stages stay in
    /// the destination until the next run's cleanup removes them.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<MigrationReport, MigrationError> {
        let start_time = Instant::now();

        self.plan.validate()?;

        info!(steps = self.plan.steps().len(), "Starting cleanup");
        let removed: HashMap<_, _> = cleanup(self.stores.destination.as_ref(), &self.plan)
            .await
            .inspect_err(|e| error!(error = %e, "Cleanup failed"))?
            .into_iter()
            .collect();

        let mut id_map = IdentifierMap::new();
        let mut entities = Vec::with_capacity(self.plan.steps().len());

        for descriptor in self.plan.steps() {
            let entity = descriptor.entity;
            info!(entity = %entity, "Migrating {}", entity);

            let migrator = EntityMigrator::new(
                descriptor.clone(),
                self.plan.is_dependency_target(entity),
                self.stores.clone(),
                self.config.clone(),
            );

            let migrated = migrator
                .migrate(&mut id_map)
                .await
                .inspect_err(|e| error!(entity = %entity, error = %e, "Stage failed"))?;

            entities.push(EntityReport {
                entity,
                removed: removed.get(&entity).copied().unwrap_or(0),
                migrated,
            });
        }

        let report = MigrationReport {
            entities,
            elapsed: start_time.elapsed(),
        };

        info!(
            total_migrated = report.total_migrated(),
            total_removed = report.total_removed(),
            elapsed_secs = format!("{:.2}", report.elapsed.as_secs_f64()),
            "Migration complete"
        );

        Ok(report)
    }
}
