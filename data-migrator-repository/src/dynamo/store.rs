// DynamoDB connection setup and table operations
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::operation::scan::builders::ScanFluentBuilder;
use aws_sdk_dynamodb::types::{AttributeValue, DeleteRequest, WriteRequest};
use aws_sdk_dynamodb::Client;
use data_migrator_shared::{key_string, EntityType, Record, DESTINATION_ID_FIELD};
use tracing::{debug, info, warn};

use super::config::DynamoDbConfig;
use super::convert::{item_to_record, record_to_item};
use crate::errors::DestinationError;
use crate::interfaces::DestinationStore;

/// Maximum number of requests DynamoDB accepts in one `BatchWriteItem` call.
pub const MAX_BATCH_WRITE_ITEMS: usize = 25;

// Unprocessed batch items are retried with exponential backoff
const MAX_UNPROCESSED_RETRIES: u32 = 5;
const UNPROCESSED_RETRY_BASE_DELAY_MS: u64 = 100;

// `id` is projected through a name placeholder
const ID_PLACEHOLDER: &str = "#id";

type Key = HashMap<String, AttributeValue>;
type RequestItems = HashMap<String, Vec<WriteRequest>>;

/// Destination store backed by DynamoDB tables keyed by `id`.
pub struct DynamoDbDestinationStore {
    client: Client,
    table_prefix: String,
}

impl DynamoDbDestinationStore {
    /// Build a client from the AWS default configuration chain and verify the
    /// service is reachable.
    pub async fn connect(config: &DynamoDbConfig) -> Result<Self, DestinationError> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint.clone());
        }
        let sdk_config = loader.load().await;
        let client = Client::new(&sdk_config);

        client.list_tables().limit(1).send().await.map_err(|e| {
            DestinationError::connection(format!(
                "Failed to reach DynamoDB: {}",
                DisplayErrorContext(&e)
            ))
        })?;

        info!(
            region = %config.region,
            endpoint = ?config.endpoint,
            table_prefix = %config.table_prefix,
            "Connected to DynamoDB"
        );

        Ok(Self::from_client(client, config.table_prefix.clone()))
    }

    /// Wrap an existing client.
    pub fn from_client(client: Client, table_prefix: impl Into<String>) -> Self {
        Self {
            client,
            table_prefix: table_prefix.into(),
        }
    }

    /// Returns the physical table name for an entity type.
    pub fn table_name(&self, entity: EntityType) -> String {
        format!("{}{}", self.table_prefix, entity.destination_table())
    }

    /// Scan request returning only the `id` key of each item.
    fn key_scan(&self, table: &str, start_key: Option<Key>) -> ScanFluentBuilder {
        self.client
            .scan()
            .table_name(table)
            .projection_expression(ID_PLACEHOLDER)
            .expression_attribute_names(ID_PLACEHOLDER, DESTINATION_ID_FIELD)
            .set_exclusive_start_key(start_key)
    }
}

#[async_trait]
impl DestinationStore for DynamoDbDestinationStore {
    async fn create(&self, entity: EntityType, record: &Record) -> Result<(), DestinationError> {
        let table = self.table_name(entity);

        self.client
            .put_item()
            .table_name(&table)
            .set_item(Some(record_to_item(record)))
            .send()
            .await
            .map_err(|e| {
                DestinationError::write(format!(
                    "PutItem on {} failed: {}",
                    table,
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(())
    }

    async fn scan_all(&self, entity: EntityType) -> Result<Vec<Record>, DestinationError> {
        let table = self.table_name(entity);

        let records = scan_pages(|start_key| {
            let request = self.key_scan(&table, start_key);
            let table = &table;
            async move {
                let output = request.send().await.map_err(|e| {
                    DestinationError::scan(format!(
                        "Scan on {} failed: {}",
                        table,
                        DisplayErrorContext(&e)
                    ))
                })?;
                let next = output.last_evaluated_key().cloned();
                Ok((output.items.unwrap_or_default(), next))
            }
        })
        .await?;

        debug!(table = %table, count = records.len(), "Scanned table");
        Ok(records)
    }

    async fn remove_all(
        &self,
        entity: EntityType,
        records: &[Record],
    ) -> Result<(), DestinationError> {
        if records.is_empty() {
            return Ok(());
        }

        let table = self.table_name(entity);
        let client = &self.client;

        delete_in_batches(&table, records, |items| async move {
            let output = client
                .batch_write_item()
                .set_request_items(Some(items))
                .send()
                .await
                .map_err(|e| {
                    DestinationError::delete(format!(
                        "BatchWriteItem failed: {}",
                        DisplayErrorContext(&e)
                    ))
                })?;
            Ok(output.unprocessed_items)
        })
        .await?;

        debug!(table = %table, count = records.len(), "Deleted items");
        Ok(())
    }
}

/// Follow `last_evaluated_key` until the table is exhausted.
///
/// `fetch` receives the start key of the page and returns its items together
/// with the key to continue from.
async fn scan_pages<F, Fut>(mut fetch: F) -> Result<Vec<Record>, DestinationError>
where
    F: FnMut(Option<Key>) -> Fut,
    Fut: Future<Output = Result<(Vec<Key>, Option<Key>), DestinationError>>,
{
    let mut records = Vec::new();
    let mut start_key = None;

    loop {
        let (items, next) = fetch(start_key.take()).await?;
        for item in &items {
            records.push(item_to_record(item)?);
        }

        match next {
            Some(key) if !key.is_empty() => start_key = Some(key),
            _ => return Ok(records),
        }
    }
}

/// Delete `records` in `BatchWriteItem`-sized chunks.
///
/// `send` issues one request and returns whatever DynamoDB left unprocessed.
async fn delete_in_batches<F, Fut>(
    table: &str,
    records: &[Record],
    mut send: F,
) -> Result<(), DestinationError>
where
    F: FnMut(RequestItems) -> Fut,
    Fut: Future<Output = Result<Option<RequestItems>, DestinationError>>,
{
    let requests = records
        .iter()
        .map(delete_request)
        .collect::<Result<Vec<_>, _>>()?;

    for chunk in requests.chunks(MAX_BATCH_WRITE_ITEMS) {
        let mut pending = HashMap::from([(table.to_string(), chunk.to_vec())]);
        let mut attempt = 0;

        loop {
            let Some(items) = remaining_requests(send(pending).await?) else {
                break;
            };

            let remaining: usize = items.values().map(Vec::len).sum();
            if attempt >= MAX_UNPROCESSED_RETRIES {
                return Err(DestinationError::delete(format!(
                    "{} deletes on {} still unprocessed after {} retries",
                    remaining, table, MAX_UNPROCESSED_RETRIES
                )));
            }

            attempt += 1;
            warn!(table, remaining, attempt, "Retrying unprocessed deletes");
            tokio::time::sleep(Duration::from_millis(
                UNPROCESSED_RETRY_BASE_DELAY_MS * 2u64.pow(attempt),
            ))
            .await;
            pending = items;
        }
    }

    Ok(())
}

/// Drops empty entries, returning `None` when nothing is left to send.
fn remaining_requests(unprocessed: Option<RequestItems>) -> Option<RequestItems> {
    let items: RequestItems = unprocessed?
        .into_iter()
        .filter(|(_, requests)| !requests.is_empty())
        .collect();
    (!items.is_empty()).then_some(items)
}

/// Build a delete request addressing the record by its `id` key.
fn delete_request(record: &Record) -> Result<WriteRequest, DestinationError> {
    let id = record
        .get(DESTINATION_ID_FIELD)
        .and_then(key_string)
        .ok_or_else(|| DestinationError::delete("Record has no id key"))?;

    let delete = DeleteRequest::builder()
        .key(DESTINATION_ID_FIELD, AttributeValue::S(id))
        .build()
        .map_err(|e| DestinationError::delete(format!("Invalid delete request: {}", e)))?;

    Ok(WriteRequest::builder().delete_request(delete).build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::config::Credentials;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    fn records(count: usize) -> Vec<Record> {
        (0..count)
            .map(|i| {
                json!({ "id": format!("r{}", i) })
                    .as_object()
                    .cloned()
                    .unwrap_or_default()
            })
            .collect()
    }

    fn key(id: &str) -> Key {
        HashMap::from([(
            DESTINATION_ID_FIELD.to_string(),
            AttributeValue::S(id.to_string()),
        )])
    }

    // Records every batch sent and answers with scripted unprocessed items
    #[derive(Clone, Default)]
    struct ScriptedBatches {
        sent: Arc<Mutex<Vec<usize>>>,
        leftovers: Arc<Mutex<VecDeque<usize>>>,
    }

    impl ScriptedBatches {
        fn leaving(leftovers: &[usize]) -> Self {
            Self {
                sent: Arc::default(),
                leftovers: Arc::new(Mutex::new(leftovers.iter().copied().collect())),
            }
        }

        fn sent(&self) -> Vec<usize> {
            self.sent.lock().unwrap().clone()
        }

        async fn send(self, items: RequestItems) -> Result<Option<RequestItems>, DestinationError> {
            let requests = items.into_values().next().unwrap_or_default();
            self.sent.lock().unwrap().push(requests.len());

            let leftover = self.leftovers.lock().unwrap().pop_front().unwrap_or(0);
            if leftover == 0 {
                return Ok(Some(HashMap::new()));
            }
            Ok(Some(HashMap::from([(
                "test_Issue".to_string(),
                requests.into_iter().take(leftover).collect(),
            )])))
        }
    }

    #[tokio::test]
    async fn test_deletes_are_chunked_to_batch_limit() {
        let batches = ScriptedBatches::default();

        delete_in_batches("test_Issue", &records(26), |items| batches.clone().send(items))
            .await
            .unwrap();

        assert_eq!(batches.sent(), vec![25, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unprocessed_deletes_are_retried() {
        let batches = ScriptedBatches::leaving(&[3, 1]);

        delete_in_batches("test_Issue", &records(10), |items| batches.clone().send(items))
            .await
            .unwrap();

        assert_eq!(batches.sent(), vec![10, 3, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unprocessed_deletes_fail_after_retries() {
        let batches = ScriptedBatches::leaving(&[2; 10]);

        let result =
            delete_in_batches("test_Issue", &records(5), |items| batches.clone().send(items)).await;

        match result {
            Err(DestinationError::DeleteError(msg)) => {
                assert!(msg.contains("still unprocessed after 5 retries"), "{}", msg);
            }
            other => panic!("expected DeleteError, got {:?}", other),
        }
        // The first attempt plus five retries.
        assert_eq!(batches.sent().len(), 1 + MAX_UNPROCESSED_RETRIES as usize);
    }

    #[tokio::test]
    async fn test_send_failure_stops_deletion() {
        let calls = Arc::new(Mutex::new(0));

        let result = delete_in_batches("test_Issue", &records(30), |_| {
            let calls = calls.clone();
            async move {
                *calls.lock().unwrap() += 1;
                Err(DestinationError::delete("throttled"))
            }
        })
        .await;

        assert!(matches!(result, Err(DestinationError::DeleteError(_))));
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_scan_follows_last_evaluated_key() {
        let pages = Arc::new(Mutex::new(VecDeque::from([
            (vec![key("a"), key("b")], Some(key("b"))),
            (vec![key("c")], Some(key("c"))),
            (vec![], Some(HashMap::new())),
        ])));
        let start_keys = Arc::new(Mutex::new(Vec::new()));

        let scanned = scan_pages(|start_key| {
            let pages = pages.clone();
            let start_keys = start_keys.clone();
            async move {
                start_keys.lock().unwrap().push(start_key);
                Ok(pages.lock().unwrap().pop_front().unwrap_or_default())
            }
        })
        .await
        .unwrap();

        let ids: Vec<_> = scanned.iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!("a"), json!("b"), json!("c")]);
        assert_eq!(
            *start_keys.lock().unwrap(),
            vec![None, Some(key("b")), Some(key("c"))]
        );
    }

    #[test]
    fn test_key_scan_projects_only_id() {
        let config = aws_sdk_dynamodb::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("akid", "secret", None, None, "test"))
            .build();
        let store = DynamoDbDestinationStore::from_client(Client::from_conf(config), "test_");

        let scan = store.key_scan(&store.table_name(EntityType::Issue), None);
        let input = scan.as_input();

        assert_eq!(input.get_table_name().as_deref(), Some("test_Issue"));
        assert_eq!(input.get_projection_expression().as_deref(), Some("#id"));
        assert_eq!(
            input
                .get_expression_attribute_names()
                .as_ref()
                .and_then(|names| names.get("#id"))
                .map(String::as_str),
            Some("id")
        );
    }

    #[test]
    fn test_delete_request_uses_id_key() {
        let record = json!({ "id": "abc", "name": "Alpha" })
            .as_object()
            .cloned()
            .unwrap_or_default();

        let request = delete_request(&record).unwrap();
        let key = request.delete_request().map(|d| d.key().clone()).unwrap_or_default();

        assert_eq!(key.len(), 1);
        assert_eq!(key.get("id"), Some(&AttributeValue::S("abc".to_string())));
    }

    #[test]
    fn test_delete_request_requires_id() {
        let record = json!({ "name": "Alpha" }).as_object().cloned().unwrap_or_default();
        assert!(matches!(
            delete_request(&record),
            Err(DestinationError::DeleteError(_))
        ));
    }
}
