//! Data Migrator Main Entry Point
//!
//! One-shot binary that empties the DynamoDB tables and migrates every
//! MongoDB collection into them.

use data_migrator::{Dependencies, MigratorError};
use std::env;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("data_migrator=info,data_migrator_repository=info"));

    let json = env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .init();
    }

    info!(
        service_name = "data-migrator",
        service_version = env!("CARGO_PKG_VERSION"),
        json,
        "Tracing initialized"
    );
}

#[tokio::main]
async fn main() -> Result<(), MigratorError> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_tracing();

    info!("Starting data migration");

    let deps = match Dependencies::new().await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    match deps.orchestrator.run().await {
        Ok(report) => {
            for entity in &report.entities {
                info!(
                    entity = %entity.entity,
                    removed = entity.removed,
                    migrated = entity.migrated,
                    "Entity summary"
                );
            }
            let summary = serde_json::to_string(&report)
                .unwrap_or_else(|e| format!("unavailable: {}", e));
            info!(
                total_migrated = report.total_migrated(),
                summary = %summary,
                "Data migration completed successfully"
            );
            Ok(())
        }
        Err(e) => {
            error!(
                stage = %e.stage(),
                entity = ?e.entity(),
                error = %e,
                "Data migration failed"
            );
            Err(e.into())
        }
    }
}
