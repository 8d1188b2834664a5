// MongoDB connection setup and collection reads
use async_trait::async_trait;
use data_migrator_shared::{EntityType, Record};
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use tracing::{debug, info};

use super::convert::document_to_record;
use crate::errors::SourceError;
use crate::interfaces::SourceReader;

/// Database used when neither the URL nor the caller names one.
pub const DEFAULT_DATABASE: &str = "topcoderx";

const APP_NAME: &str = "data-migrator";

/// Reads whole collections from MongoDB.
pub struct MongoSourceReader {
    database: Database,
}

impl MongoSourceReader {
    /// Connect to MongoDB and verify the server answers.
    ///
    /// # Arguments
    ///
    /// * `url` - Connection string, e.g. `mongodb://127.0.0.1:27017/topcoderx`
    /// * `database` - Explicit database name; falls back to the URL path, then
    ///   to [`DEFAULT_DATABASE`]
    pub async fn connect(url: &str, database: Option<&str>) -> Result<Self, SourceError> {
        let mut options = ClientOptions::parse(url)
            .await
            .map_err(|e| SourceError::connection(format!("Invalid MongoDB URL: {}", e)))?;
        options.app_name = Some(APP_NAME.to_string());

        let database_name = database
            .map(str::to_string)
            .or_else(|| options.default_database.clone())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let client = Client::with_options(options)
            .map_err(|e| SourceError::connection(format!("Failed to create MongoDB client: {}", e)))?;
        let database = client.database(&database_name);

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| SourceError::connection(format!("MongoDB ping failed: {}", e)))?;

        info!(database = %database_name, "Connected to MongoDB");

        Ok(Self { database })
    }
}

#[async_trait]
impl SourceReader for MongoSourceReader {
    async fn find_all(&self, entity: EntityType) -> Result<Vec<Record>, SourceError> {
        let collection_name = entity.source_collection();
        let collection = self.database.collection::<Document>(collection_name);

        let cursor = collection.find(doc! {}).await.map_err(|e| {
            SourceError::read(format!("Failed to query collection {}: {}", collection_name, e))
        })?;

        let documents: Vec<Document> = cursor.try_collect().await.map_err(|e| {
            SourceError::read(format!("Failed to read collection {}: {}", collection_name, e))
        })?;

        debug!(
            collection = collection_name,
            count = documents.len(),
            "Read documents"
        );

        documents
            .into_iter()
            .map(document_to_record)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| match e {
                SourceError::ConversionError(msg) => {
                    SourceError::conversion(format!("Collection {}: {}", collection_name, msg))
                }
                other => other,
            })
    }
}
