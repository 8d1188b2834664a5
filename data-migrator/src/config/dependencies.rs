//! Dependency initialization and wiring for the data migrator.

use std::sync::Arc;

use data_migrator_repository::{DynamoDbDestinationStore, MongoSourceReader, UuidGenerator};
use tracing::info;

use crate::config::MigratorConfig;
use crate::orchestrator::Orchestrator;
use crate::plan::MigrationPlan;
use crate::MigratorError;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// See [`MigratorConfig::from_env`] for the variables read.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(MigratorError)` - If configuration is invalid or a store is unreachable
    pub async fn new() -> Result<Self, MigratorError> {
        let config = MigratorConfig::from_env()?;
        Self::from_config(config).await
    }

    /// Connect both stores and build the orchestrator from an explicit config.
    pub async fn from_config(config: MigratorConfig) -> Result<Self, MigratorError> {
        info!(
            mongodb_database = ?config.mongodb_database,
            aws_region = %config.dynamodb.region,
            dynamodb_endpoint = ?config.dynamodb.endpoint,
            table_prefix = %config.dynamodb.table_prefix,
            write_concurrency = config.stage.write_concurrency,
            "Initializing dependencies"
        );

        let plan = MigrationPlan::standard();
        plan.validate()?;

        let source =
            MongoSourceReader::connect(&config.mongodb_url, config.mongodb_database.as_deref())
                .await?;
        let destination = DynamoDbDestinationStore::connect(&config.dynamodb).await?;

        let orchestrator = Orchestrator::with_config(
            plan,
            Arc::new(source),
            Arc::new(destination),
            Arc::new(UuidGenerator::new()),
            config.stage,
        );

        Ok(Self { orchestrator })
    }
}
