//! Configuration and dependency initialization.

mod dependencies;

use std::env;

use data_migrator_repository::DynamoDbConfig;
use tracing::warn;

use crate::migrator::{StageConfig, DEFAULT_PROGRESS_INTERVAL, DEFAULT_WRITE_CONCURRENCY};
use crate::MigratorError;

pub use dependencies::Dependencies;

/// Default MongoDB connection string.
const DEFAULT_MONGODB_URL: &str = "mongodb://127.0.0.1:27017/topcoderx";

/// Default AWS region.
const DEFAULT_AWS_REGION: &str = "us-east-1";

/// Default DynamoDB Local endpoint.
const DEFAULT_DYNAMODB_ENDPOINT: &str = "http://localhost:8000";

/// Settings for a migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigratorConfig {
    pub mongodb_url: String,
    /// Overrides the database named in `mongodb_url`.
    pub mongodb_database: Option<String>,
    pub dynamodb: DynamoDbConfig,
    pub stage: StageConfig,
}

impl MigratorConfig {
    /// Load configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `MONGODB_URL`: Source connection string (default: mongodb://127.0.0.1:27017/topcoderx)
    /// - `MONGODB_DATABASE`: Database override (default: taken from the URL)
    /// - `AWS_REGION`: DynamoDB region (default: us-east-1)
    /// - `IS_LOCAL`: Target DynamoDB Local when truthy
    /// - `DYNAMODB_ENDPOINT`: Endpoint used when `IS_LOCAL` is set (default: http://localhost:8000)
    /// - `DYNAMODB_TABLE_PREFIX`: Prefix for every table name (default: empty)
    /// - `WRITE_CONCURRENCY`: Concurrent writes per stage (default: 16)
    /// - `PROGRESS_INTERVAL`: Records between progress log lines (default: 500)
    pub fn from_env() -> Result<Self, MigratorError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self, MigratorError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mongodb_url = var("MONGODB_URL").unwrap_or_else(|| DEFAULT_MONGODB_URL.to_string());
        let mongodb_database = var("MONGODB_DATABASE").filter(|db| !db.is_empty());

        let region = var("AWS_REGION").unwrap_or_else(|| DEFAULT_AWS_REGION.to_string());
        let mut dynamodb = DynamoDbConfig::new(region);

        if var("IS_LOCAL").is_some_and(|value| is_truthy(&value)) {
            let endpoint =
                var("DYNAMODB_ENDPOINT").unwrap_or_else(|| DEFAULT_DYNAMODB_ENDPOINT.to_string());
            dynamodb = dynamodb.with_endpoint(endpoint);
        } else if var("DYNAMODB_ENDPOINT").is_some() {
            warn!("DYNAMODB_ENDPOINT is ignored unless IS_LOCAL is set");
        }

        if let Some(prefix) = var("DYNAMODB_TABLE_PREFIX") {
            dynamodb = dynamodb.with_table_prefix(prefix);
        }

        let stage = StageConfig {
            write_concurrency: parse_positive(
                "WRITE_CONCURRENCY",
                var("WRITE_CONCURRENCY"),
                DEFAULT_WRITE_CONCURRENCY,
            )?,
            progress_interval: parse_positive(
                "PROGRESS_INTERVAL",
                var("PROGRESS_INTERVAL"),
                DEFAULT_PROGRESS_INTERVAL,
            )?,
        };

        Ok(Self {
            mongodb_url,
            mongodb_database,
            dynamodb,
            stage,
        })
    }
}

fn is_truthy(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    !value.is_empty() && !matches!(value.as_str(), "false" | "0" | "no")
}

fn parse_positive(name: &str, value: Option<String>, default: usize) -> Result<usize, MigratorError> {
    let Some(raw) = value else {
        return Ok(default);
    };

    match raw.trim().parse::<usize>() {
        Ok(0) => Err(MigratorError::config(format!("{} must be greater than zero", name))),
        Ok(parsed) => Ok(parsed),
        Err(e) => Err(MigratorError::config(format!(
            "Invalid {} '{}': {}",
            name, raw, e
        ))),
    }
}
