//! Integration tests for the migration orchestrator.
//!
//! These tests use the real Orchestrator with in-memory stores, plus a
//! recording destination that logs the order of store operations.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use data_migrator::{MigrationError, MigrationPlan, MigrationStage, Orchestrator, StageConfig};
use data_migrator_repository::{
    DestinationError, DestinationStore, InMemoryDestinationStore, InMemorySourceReader,
    SequentialIdGenerator, UuidGenerator,
};
use data_migrator_shared::{EntityType, Record};
use serde_json::{json, Value};

fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap_or_default()
}

fn orchestrator(
    source: Arc<InMemorySourceReader>,
    destination: Arc<dyn DestinationStore>,
) -> Orchestrator {
    Orchestrator::new(
        MigrationPlan::standard(),
        source,
        destination,
        Arc::new(UuidGenerator::new()),
    )
}

/// Source with one record per entity type and the p1/i1 example relationship.
fn seeded_source() -> Arc<InMemorySourceReader> {
    let source = Arc::new(InMemorySourceReader::new());
    source.insert(EntityType::User, record(json!({ "_id": "u1", "__v": 0, "username": "alice" })));
    source.insert(
        EntityType::UserMapping,
        record(json!({ "_id": "m1", "__v": 0, "topcoderUsername": "alice" })),
    );
    source.insert(EntityType::Project, record(json!({ "_id": "p1", "__v": 2, "title": "Alpha" })));
    source.insert(EntityType::Project, record(json!({ "_id": "p2", "__v": 0, "title": "Beta" })));
    source.insert(
        EntityType::Issue,
        record(json!({ "_id": "i1", "__v": 0, "projectId": "p1", "title": "Bug" })),
    );
    source.insert(
        EntityType::Issue,
        record(json!({ "_id": "i2", "__v": 0, "projectId": "p2", "title": "Feature" })),
    );
    source.insert(
        EntityType::CopilotPayment,
        record(json!({ "_id": "c1", "__v": 0, "project": "p2", "amount": 100 })),
    );
    source.insert(EntityType::OwnerUserTeam, record(json!({ "_id": "t1", "teamId": "42" })));
    source.insert(EntityType::OwnerUserGroup, record(json!({ "_id": "g1", "groupId": "7" })));
    source
}

fn ids(records: &[Record]) -> HashSet<String> {
    records
        .iter()
        .filter_map(|r| r.get("id").and_then(Value::as_str).map(str::to_string))
        .collect()
}

// Destination that records every operation in order
struct RecordingDestination {
    inner: InMemoryDestinationStore,
    operations: Mutex<Vec<(&'static str, EntityType)>>,
}

impl RecordingDestination {
    fn new() -> Self {
        Self {
            inner: InMemoryDestinationStore::new(),
            operations: Mutex::new(Vec::new()),
        }
    }

    fn operations(&self) -> Vec<(&'static str, EntityType)> {
        self.operations.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DestinationStore for RecordingDestination {
    async fn create(&self, entity: EntityType, record: &Record) -> Result<(), DestinationError> {
        self.operations.lock().unwrap().push(("create", entity));
        self.inner.create(entity, record).await
    }

    async fn scan_all(&self, entity: EntityType) -> Result<Vec<Record>, DestinationError> {
        self.operations.lock().unwrap().push(("scan", entity));
        self.inner.scan_all(entity).await
    }

    async fn remove_all(
        &self,
        entity: EntityType,
        records: &[Record],
    ) -> Result<(), DestinationError> {
        self.operations.lock().unwrap().push(("remove", entity));
        self.inner.remove_all(entity, records).await
    }
}

#[tokio::test]
async fn test_full_run_rewrites_foreign_keys() {
    let destination = Arc::new(InMemoryDestinationStore::new());
    let report = orchestrator(seeded_source(), destination.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(report.total_migrated(), 9);
    assert_eq!(report.migrated(EntityType::Project), 2);
    assert_eq!(report.migrated(EntityType::Issue), 2);
    assert_eq!(report.migrated(EntityType::CopilotPayment), 1);
    let order: Vec<_> = report.entities.iter().map(|e| e.entity).collect();
    assert_eq!(order, EntityType::ALL.to_vec());

    let projects = destination.records(EntityType::Project);
    let project_ids = ids(&projects);
    let alpha_id = projects
        .iter()
        .find(|p| p["title"] == json!("Alpha"))
        .and_then(|p| p["id"].as_str())
        .unwrap()
        .to_string();
    let beta_id = projects
        .iter()
        .find(|p| p["title"] == json!("Beta"))
        .and_then(|p| p["id"].as_str())
        .unwrap()
        .to_string();

    let issues = destination.records(EntityType::Issue);
    let bug = issues.iter().find(|i| i["title"] == json!("Bug")).unwrap();
    assert_eq!(bug["projectId"], json!(alpha_id));
    let feature = issues.iter().find(|i| i["title"] == json!("Feature")).unwrap();
    assert_eq!(feature["projectId"], json!(beta_id));
    for issue in &issues {
        assert!(project_ids.contains(issue["projectId"].as_str().unwrap()));
    }

    let payments = destination.records(EntityType::CopilotPayment);
    assert_eq!(payments[0]["project"], json!(beta_id));
    assert_eq!(payments[0]["amount"], json!(100));
}

#[tokio::test]
async fn test_no_source_metadata_leaks_and_ids_are_unique() {
    let destination = Arc::new(InMemoryDestinationStore::new());
    orchestrator(seeded_source(), destination.clone())
        .run()
        .await
        .unwrap();

    let mut all_ids = HashSet::new();
    let mut total = 0;
    for entity in EntityType::ALL {
        for stored in destination.records(entity) {
            assert!(!stored.contains_key("_id"), "{} kept _id", entity);
            assert!(!stored.contains_key("__v"), "{} kept __v", entity);
            let id = stored["id"].as_str().unwrap().to_string();
            assert!(!id.is_empty());
            all_ids.insert(id);
            total += 1;
        }
    }
    assert_eq!(all_ids.len(), total);
}

#[tokio::test]
async fn test_empty_source_migrates_nothing() {
    let destination = Arc::new(InMemoryDestinationStore::new());
    let report = orchestrator(Arc::new(InMemorySourceReader::new()), destination.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(report.entities.len(), 7);
    assert_eq!(report.total_migrated(), 0);
    assert_eq!(destination.write_count(), 0);
}

#[tokio::test]
async fn test_rerun_replaces_previous_destination_contents() {
    let destination = Arc::new(InMemoryDestinationStore::new());
    destination
        .create(EntityType::Issue, &record(json!({ "id": "stale-issue" })))
        .await
        .unwrap();
    let source = seeded_source();

    let first = orchestrator(source.clone(), destination.clone())
        .run()
        .await
        .unwrap();
    assert_eq!(first.removed(EntityType::Issue), 1);
    let first_ids = ids(&destination.records(EntityType::Project));

    let second = orchestrator(source, destination.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(second.removed(EntityType::Issue), 2);
    assert_eq!(second.total_removed(), first.total_migrated());
    for entity in EntityType::ALL {
        assert_eq!(destination.count(entity), first.migrated(entity));
    }
    let second_ids = ids(&destination.records(EntityType::Project));
    assert!(first_ids.is_disjoint(&second_ids));
}

#[tokio::test]
async fn test_cleanup_runs_in_reverse_order_before_any_write() {
    let destination = Arc::new(RecordingDestination::new());
    destination
        .inner
        .create(EntityType::Project, &record(json!({ "id": "old-p" })))
        .await
        .unwrap();
    destination
        .inner
        .create(EntityType::Issue, &record(json!({ "id": "old-i" })))
        .await
        .unwrap();

    orchestrator(seeded_source(), destination.clone())
        .run()
        .await
        .unwrap();

    let operations = destination.operations();
    let first_create = operations.iter().position(|(op, _)| *op == "create").unwrap();
    assert!(operations[..first_create].iter().all(|(op, _)| *op != "create"));

    let removes: Vec<_> = operations
        .iter()
        .filter(|(op, _)| *op == "remove")
        .map(|(_, entity)| *entity)
        .collect();
    assert_eq!(removes, vec![EntityType::Issue, EntityType::Project]);

    let scans: Vec<_> = operations
        .iter()
        .filter(|(op, _)| *op == "scan")
        .map(|(_, entity)| *entity)
        .collect();
    let mut reversed = EntityType::ALL.to_vec();
    reversed.reverse();
    assert_eq!(scans, reversed);

    // Stages write in plan order.
    let creates: Vec<_> = operations[first_create..]
        .iter()
        .map(|(_, entity)| *entity)
        .collect();
    let mut stage_order = creates.clone();
    stage_order.dedup();
    assert_eq!(stage_order, EntityType::ALL.to_vec());
}

#[tokio::test]
async fn test_cleanup_failure_prevents_migration() {
    let destination = Arc::new(InMemoryDestinationStore::new());
    destination
        .create(EntityType::CopilotPayment, &record(json!({ "id": "old" })))
        .await
        .unwrap();
    destination.fail_deletes_for(EntityType::CopilotPayment);

    let err = orchestrator(seeded_source(), destination.clone())
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.stage(), MigrationStage::Cleanup);
    assert_eq!(err.entity(), Some(EntityType::CopilotPayment));
    // Only the pre-seeded record was ever written.
    assert_eq!(destination.write_count(), 1);
}

#[tokio::test]
async fn test_dangling_foreign_key_aborts_run() {
    let source = seeded_source();
    source.insert(
        EntityType::Issue,
        record(json!({ "_id": "i3", "projectId": "missing-project" })),
    );
    let destination = Arc::new(InMemoryDestinationStore::new());

    let err = orchestrator(source, destination.clone())
        .run()
        .await
        .unwrap_err();

    match err {
        MigrationError::MissingMapping {
            entity,
            parent,
            old_id,
        } => {
            assert_eq!(entity, EntityType::Issue);
            assert_eq!(parent, EntityType::Project);
            assert_eq!(old_id, "missing-project");
        }
        other => panic!("expected MissingMapping, got {:?}", other),
    }

    // Earlier stages were written, the failing stage and later ones were not.
    assert_eq!(destination.count(EntityType::Project), 2);
    assert_eq!(destination.count(EntityType::Issue), 0);
    assert_eq!(destination.count(EntityType::CopilotPayment), 0);
    assert_eq!(destination.count(EntityType::OwnerUserGroup), 0);
}

#[tokio::test]
async fn test_project_write_failure_stops_dependents() {
    let destination = Arc::new(InMemoryDestinationStore::new());
    destination.fail_writes_for(EntityType::Project);

    let err = orchestrator(seeded_source(), destination.clone())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        MigrationError::Write {
            entity: EntityType::Project,
            ..
        }
    ));
    assert_eq!(err.stage(), MigrationStage::Migrate);
    assert_eq!(destination.count(EntityType::User), 1);
    assert_eq!(destination.count(EntityType::Issue), 0);
    assert_eq!(destination.count(EntityType::CopilotPayment), 0);
}

#[tokio::test]
async fn test_read_failure_is_reported_with_entity() {
    let source = seeded_source();
    source.fail_reads_for(EntityType::OwnerUserTeam);
    let destination = Arc::new(InMemoryDestinationStore::new());

    let err = orchestrator(source, destination.clone())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        MigrationError::Read {
            entity: EntityType::OwnerUserTeam,
            ..
        }
    ));
    assert_eq!(destination.count(EntityType::CopilotPayment), 1);
    assert_eq!(destination.count(EntityType::OwnerUserGroup), 0);
}

#[tokio::test]
async fn test_sequential_ids_with_single_writer() {
    let destination = Arc::new(InMemoryDestinationStore::new());
    let ids_issued = Arc::new(SequentialIdGenerator::new("rec"));
    let report = Orchestrator::with_config(
        MigrationPlan::standard(),
        seeded_source(),
        destination.clone(),
        ids_issued.clone(),
        StageConfig {
            write_concurrency: 1,
            progress_interval: 1,
        },
    )
    .run()
    .await
    .unwrap();

    assert_eq!(ids_issued.issued(), report.total_migrated() as u64);
    let users = destination.records(EntityType::User);
    assert_eq!(users[0]["id"], json!("rec-1"));
}
