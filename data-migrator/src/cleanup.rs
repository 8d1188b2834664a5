//! Destination cleanup.
//!
//! Every table in the plan is emptied before migration starts, dependents
//! before their parents, so reruns start from a clean destination.

use data_migrator_repository::DestinationStore;
use data_migrator_shared::EntityType;
use tracing::{info, instrument};

use crate::errors::MigrationError;
use crate::plan::MigrationPlan;

/// Remove every record from the plan's destination tables in cleanup order.
///
/// Returns the number of records removed per entity type, in the order they
/// were processed. Stops at the first scan or delete failure.
#[instrument(skip_all)]
pub async fn cleanup(
    destination: &dyn DestinationStore,
    plan: &MigrationPlan,
) -> Result<Vec<(EntityType, usize)>, MigrationError> {
    let mut removed = Vec::with_capacity(plan.steps().len());

    for entity in plan.cleanup_order() {
        let records = destination
            .scan_all(entity)
            .await
            .map_err(|source| MigrationError::Cleanup { entity, source })?;

        if !records.is_empty() {
            destination
                .remove_all(entity, &records)
                .await
                .map_err(|source| MigrationError::Cleanup { entity, source })?;
        }

        info!(entity = %entity, removed = records.len(), "Cleaned destination table");
        removed.push((entity, records.len()));
    }

    Ok(removed)
}
