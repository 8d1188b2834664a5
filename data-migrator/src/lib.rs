//! # Data Migrator
//!
//! Migrates entity collections from MongoDB into DynamoDB, replacing native
//! document identifiers with generated surrogate identifiers and rewriting
//! foreign keys so dependent records point at their parent's new identity.
//!
//! ## Architecture
//!
//! 1. **Cleanup**: Empties every destination table, dependents first
//! 2. **Entity migrators**: Read, transform and write one entity type each
//! 3. **Identifier map**: Carries parent id mappings between migrators
//! 4. **Orchestrator**: Runs cleanup and the migrators in plan order
//!
//! ## Modules
//!
//! - [`config`]: Environment configuration and dependency initialization
//! - [`plan`]: The ordered, validated list of entity types to migrate
//! - [`id_map`]: Run-scoped source id to surrogate id mapping
//! - [`migrator`]: Per-entity transform and write stage
//! - [`cleanup`]: Destination cleanup
//! - [`orchestrator`]: Coordinates a full run
//! - [`errors`]: Error types for the pipeline

pub mod cleanup;
pub mod config;
pub mod errors;
pub mod id_map;
pub mod migrator;
pub mod orchestrator;
pub mod plan;

pub use config::{Dependencies, MigratorConfig};
pub use errors::{MigrationError, MigrationStage};
pub use id_map::IdentifierMap;
pub use migrator::{EntityMigrator, StageConfig, Stores};
pub use orchestrator::{EntityReport, MigrationReport, Orchestrator};
pub use plan::MigrationPlan;

use data_migrator_repository::{DestinationError, SourceError};
use thiserror::Error;

/// Errors that can occur during migrator initialization or execution.
#[derive(Error, Debug)]
pub enum MigratorError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Source store could not be initialized.
    #[error("Source store error: {0}")]
    Source(#[from] SourceError),

    /// Destination store could not be initialized.
    #[error("Destination store error: {0}")]
    Destination(#[from] DestinationError),

    /// The migration run failed.
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),
}

impl MigratorError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
