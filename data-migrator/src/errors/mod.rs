//! Error types for the migration pipeline.
//!
//! Every variant names the entity type being processed so a failed run reports
//! which stage and collection stopped it.

use data_migrator_repository::{DestinationError, SourceError};
use data_migrator_shared::EntityType;
use thiserror::Error;

use crate::id_map::DuplicateMappingError;

/// Phase of a run an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationStage {
    /// Validating the migration plan, before touching any store.
    Plan,
    /// Emptying the destination store.
    Cleanup,
    /// Migrating records of one entity type.
    Migrate,
}

impl std::fmt::Display for MigrationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MigrationStage::Plan => "plan",
            MigrationStage::Cleanup => "cleanup",
            MigrationStage::Migrate => "migrate",
        };
        write!(f, "{}", name)
    }
}

/// Errors that abort a migration run.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The migration plan is inconsistent.
    #[error("Invalid migration plan: {0}")]
    InvalidPlan(String),

    /// Reading the source collection failed.
    #[error("Failed to read {entity} records: {source}")]
    Read {
        entity: EntityType,
        #[source]
        source: SourceError,
    },

    /// Writing a transformed record failed.
    #[error("Failed to write {entity} record: {source}")]
    Write {
        entity: EntityType,
        #[source]
        source: DestinationError,
    },

    /// Scanning or deleting destination records during cleanup failed.
    #[error("Failed to clean {entity} table: {source}")]
    Cleanup {
        entity: EntityType,
        #[source]
        source: DestinationError,
    },

    /// A foreign key references a parent that has no surrogate id.
    #[error("Missing identifier mapping while migrating {entity}: {parent} {old_id} was never migrated")]
    MissingMapping {
        entity: EntityType,
        parent: EntityType,
        old_id: String,
    },

    /// A dependent record has no value for its foreign-key field.
    #[error("{entity} record {record_id} has no value for foreign key {field}")]
    MissingForeignKey {
        entity: EntityType,
        field: String,
        record_id: String,
    },

    /// Two records of a parent type share the same source id.
    #[error("Duplicate {entity} source id {old_id}: references to it would be ambiguous")]
    DuplicateSourceId { entity: EntityType, old_id: String },

    /// A source record cannot be migrated as-is.
    #[error("Malformed {entity} record: {reason}")]
    MalformedRecord { entity: EntityType, reason: String },

    /// A write task panicked or was cancelled.
    #[error("Write task for {entity} failed: {message}")]
    Task { entity: EntityType, message: String },
}

impl From<DuplicateMappingError> for MigrationError {
    fn from(err: DuplicateMappingError) -> Self {
        MigrationError::DuplicateSourceId {
            entity: err.entity,
            old_id: err.old_id,
        }
    }
}

impl MigrationError {
    /// Create an invalid plan error.
    pub fn invalid_plan(msg: impl Into<String>) -> Self {
        Self::InvalidPlan(msg.into())
    }

    /// Create a malformed record error.
    pub fn malformed(entity: EntityType, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            entity,
            reason: reason.into(),
        }
    }

    /// Returns the phase of the run this error stopped.
    pub fn stage(&self) -> MigrationStage {
        match self {
            MigrationError::InvalidPlan(_) => MigrationStage::Plan,
            MigrationError::Cleanup { .. } => MigrationStage::Cleanup,
            _ => MigrationStage::Migrate,
        }
    }

    /// Returns the entity type being processed when the error occurred.
    pub fn entity(&self) -> Option<EntityType> {
        match self {
            MigrationError::InvalidPlan(_) => None,
            MigrationError::Read { entity, .. }
            | MigrationError::Write { entity, .. }
            | MigrationError::Cleanup { entity, .. }
            | MigrationError::MissingMapping { entity, .. }
            | MigrationError::MissingForeignKey { entity, .. }
            | MigrationError::DuplicateSourceId { entity, .. }
            | MigrationError::MalformedRecord { entity, .. }
            | MigrationError::Task { entity, .. } => Some(*entity),
        }
    }
}
