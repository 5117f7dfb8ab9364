//! Integration tests for scope resolution
//!
//! These tests run the resolver end to end against the in-memory graph
//! store and cover:
//! - Strategy priority between file, folder and KB scopes
//! - Relationship-type discrimination on edges
//! - Organization and soft-delete exclusion
//! - Duplicate rows from multiple qualifying edges
//! - Concurrent and repeated resolution
//! - Failure propagation from the executor

use async_trait::async_trait;
use kb_scope::{
    CollectionNames, MemoryGraphStore, QueryExecutor, QueryPlan, Record, ScopeError, ScopeFilter,
    ScopeResolver, ScopeStrategy,
};
use serde_json::json;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const PARENT_CHILD: &str = "PARENT_CHILD";

/// Org O1 with R1..R3 (R1, R2 in K1; R3 in K2 with a non parent-child edge
/// into K1), folder F1 holding R1 and a non parent-child edge from R2, plus
/// noise from another org and a deleted record.
async fn seeded_store() -> Arc<MemoryGraphStore> {
    let store = Arc::new(MemoryGraphStore::new(CollectionNames::default()));

    store
        .insert_record(Record::new("R1", "O1").with_field("recordName", json!("handbook.pdf")))
        .await;
    store.insert_record(Record::new("R2", "O1")).await;
    store.insert_record(Record::new("R3", "O1")).await;
    store.insert_record(Record::new("R4", "O1").deleted()).await;
    store.insert_record(Record::new("X1", "O2")).await;

    for kb in ["K1", "K2"] {
        store.insert_knowledge_base(kb).await;
    }
    for folder in ["F1", "F2"] {
        store.insert_folder(folder).await;
    }

    store.link_to_knowledge_base("R1", "K1", PARENT_CHILD).await;
    store.link_to_knowledge_base("R2", "K1", PARENT_CHILD).await;
    store.link_to_knowledge_base("R3", "K2", PARENT_CHILD).await;
    store.link_to_knowledge_base("R3", "K1", "ATTACHMENT").await;
    store.link_to_knowledge_base("R4", "K1", PARENT_CHILD).await;
    store.link_to_knowledge_base("X1", "K1", PARENT_CHILD).await;

    store.link_to_folder("R1", "F1", PARENT_CHILD).await;
    store.link_to_folder("R2", "F1", "ATTACHMENT").await;
    store.link_to_folder("R4", "F1", PARENT_CHILD).await;

    store
}

async fn resolver() -> ScopeResolver {
    ScopeResolver::new(seeded_store().await, CollectionNames::default()).unwrap()
}

fn ids(records: &[Record]) -> Vec<&str> {
    records.iter().map(|record| record.id.as_str()).collect()
}

fn id_set(records: &[Record]) -> HashSet<String> {
    records.iter().map(|record| record.id.clone()).collect()
}

#[tokio::test]
async fn test_kb_scope_single_kb() {
    let resolver = resolver().await;
    let scope = ScopeFilter::new().with_kb_ids(["K1"]);

    let records = resolver.resolve("u", "O1", Some(&scope)).await.unwrap();
    assert_eq!(ids(&records), vec!["R1", "R2"]);
}

#[tokio::test]
async fn test_kb_scope_multiple_kbs() {
    let resolver = resolver().await;
    let scope = ScopeFilter::new().with_kb_ids(["K1", "K2"]);

    let records = resolver.resolve("u", "O1", Some(&scope)).await.unwrap();
    assert_eq!(ids(&records), vec!["R1", "R2", "R3"]);
}

#[tokio::test]
async fn test_kb_scope_excludes_other_relationship_types() {
    let resolver = resolver().await;
    let scope = ScopeFilter::new().with_kb_ids(["K1"]);

    // R3 reaches K1 only through an ATTACHMENT edge
    let records = resolver.resolve("u", "O1", Some(&scope)).await.unwrap();
    assert_eq!(ids(&records), vec!["R1", "R2"]);
    assert!(!id_set(&records).contains("R3"));
}

#[tokio::test]
async fn test_folder_scope_excludes_other_relationship_types() {
    let resolver = resolver().await;
    let scope = ScopeFilter::new().with_folder_ids(["F1"]);

    let records = resolver.resolve("u", "O1", Some(&scope)).await.unwrap();
    assert_eq!(ids(&records), vec!["R1"]);
}

#[tokio::test]
async fn test_folder_scope_wins_over_kb_scope() {
    let resolver = resolver().await;
    let scope = ScopeFilter::new().with_kb_ids(["K1", "K2"]).with_folder_ids(["F2"]);

    let records = resolver.resolve("u", "O1", Some(&scope)).await.unwrap();
    assert!(records.is_empty(), "empty folder must not fall back to KB scope");
}

#[tokio::test]
async fn test_file_scope_wins_over_kb_scope() {
    let resolver = resolver().await;

    let scope = ScopeFilter::new().with_file_ids(["R2"]).with_kb_ids(["K2"]);
    let records = resolver.resolve("u", "O1", Some(&scope)).await.unwrap();
    assert_eq!(ids(&records), vec!["R2"]);

    // R3 is in K2 but outside the file set
    let scope = ScopeFilter::new()
        .with_file_ids(["R2"])
        .with_folder_ids(["F1"])
        .with_kb_ids(["K2"]);
    let records = resolver.resolve("u", "O1", Some(&scope)).await.unwrap();
    assert_eq!(ids(&records), vec!["R2"]);
}

#[tokio::test]
async fn test_file_scope_respects_org_and_soft_delete() {
    let resolver = resolver().await;
    let scope = ScopeFilter::new().with_file_ids(["R1", "R4", "X1", "missing"]);

    let records = resolver.resolve("u", "O1", Some(&scope)).await.unwrap();
    assert_eq!(ids(&records), vec!["R1"]);
    assert_eq!(records[0].fields.get("recordName"), Some(&json!("handbook.pdf")));
}

#[tokio::test]
async fn test_unscoped_returns_live_org_records() {
    let resolver = resolver().await;

    let absent = resolver.resolve("u", "O1", None).await.unwrap();
    let empty = resolver
        .resolve("u", "O1", Some(&ScopeFilter::new()))
        .await
        .unwrap();

    assert_eq!(ids(&absent), vec!["R1", "R2", "R3"]);
    assert_eq!(id_set(&absent), id_set(&empty));
}

#[tokio::test]
async fn test_every_strategy_excludes_other_orgs_and_deleted() {
    let resolver = resolver().await;
    let scopes = [
        ScopeFilter::new().with_file_ids(["R1", "R4", "X1"]),
        ScopeFilter::new().with_folder_ids(["F1"]),
        ScopeFilter::new().with_kb_ids(["K1"]),
        ScopeFilter::new(),
    ];

    for scope in &scopes {
        let records = resolver.resolve("u", "O1", Some(scope)).await.unwrap();
        assert!(!records.is_empty());
        for record in &records {
            assert_eq!(record.org_id, "O1");
            assert!(!record.is_deleted);
        }
    }
}

#[tokio::test]
async fn test_other_org_sees_only_its_records() {
    let resolver = resolver().await;
    let scope = ScopeFilter::new().with_kb_ids(["K1"]);

    let records = resolver.resolve("u", "O2", Some(&scope)).await.unwrap();
    assert_eq!(ids(&records), vec!["X1"]);
}

#[tokio::test]
async fn test_multiple_qualifying_edges_yield_duplicates() {
    let store = seeded_store().await;
    store.link_to_folder("R1", "F2", PARENT_CHILD).await;
    let resolver = ScopeResolver::new(store, CollectionNames::default()).unwrap();

    let scope = ScopeFilter::new().with_folder_ids(["F1", "F2"]);
    let records = resolver.resolve("u", "O1", Some(&scope)).await.unwrap();

    assert_eq!(ids(&records), vec!["R1", "R1"]);
}

#[tokio::test]
async fn test_extra_metadata_fields_are_ignored() {
    let resolver = resolver().await;
    let scope: ScopeFilter = serde_json::from_value(json!({
        "kb_ids": ["K2"],
        "departments": ["engineering"],
        "categories": ["policy"],
    }))
    .unwrap();

    let records = resolver.resolve("u", "O1", Some(&scope)).await.unwrap();
    assert_eq!(ids(&records), vec!["R3"]);
}

#[tokio::test]
async fn test_selection_strings_drive_resolution() {
    let resolver = resolver().await;

    let scope = ScopeFilter::from_selections(["kb:K1:folder:F1", "kb:K2"]);
    assert_eq!(ScopeStrategy::select(&scope), ScopeStrategy::Folders);
    let records = resolver.resolve("u", "O1", Some(&scope)).await.unwrap();
    assert_eq!(ids(&records), vec!["R1"]);

    let scope = ScopeFilter::from_selections(["kb:K2", "not-a-selection"]);
    let records = resolver.resolve("u", "O1", Some(&scope)).await.unwrap();
    assert_eq!(ids(&records), vec!["R3"]);
}

#[tokio::test]
async fn test_repeated_resolution_is_stable() {
    let resolver = resolver().await;
    let scope = ScopeFilter::new().with_kb_ids(["K1", "K2"]);

    let first = resolver.resolve("u", "O1", Some(&scope)).await.unwrap();
    let second = resolver.resolve("u", "O1", Some(&scope)).await.unwrap();

    assert_eq!(id_set(&first), id_set(&second));
}

#[tokio::test]
async fn test_concurrent_resolution() {
    let resolver = resolver().await;
    let scopes = vec![
        ScopeFilter::new().with_kb_ids(["K1"]),
        ScopeFilter::new().with_folder_ids(["F1"]),
        ScopeFilter::new().with_file_ids(["R3"]),
        ScopeFilter::new(),
    ];

    let tasks = scopes.iter().cycle().take(32).map(|scope| {
        let resolver = resolver.clone();
        let scope = scope.clone();
        tokio::spawn(async move { resolver.resolve("u", "O1", Some(&scope)).await })
    });

    let results = futures::future::join_all(tasks).await;
    assert_eq!(results.len(), 32);

    for (i, result) in results.into_iter().enumerate() {
        let records = result.expect("task panicked").unwrap();
        let expected: &[&str] = match i % 4 {
            0 => &["R1", "R2"],
            1 => &["R1"],
            2 => &["R3"],
            _ => &["R1", "R2", "R3"],
        };
        assert_eq!(ids(&records), expected);
    }
}

/// Executor that always fails and counts how often it was called
struct FailingExecutor {
    calls: AtomicUsize,
}

#[async_trait]
impl QueryExecutor for FailingExecutor {
    async fn execute(&self, _plan: &QueryPlan) -> kb_scope::Result<Vec<Record>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ScopeError::ConnectionError("store unreachable".to_string()))
    }
}

#[tokio::test]
async fn test_failure_propagates_without_retry() {
    let executor = Arc::new(FailingExecutor {
        calls: AtomicUsize::new(0),
    });
    let resolver = ScopeResolver::new(executor.clone(), CollectionNames::default()).unwrap();
    let scope = ScopeFilter::new().with_folder_ids(["F1", "F2"]).with_kb_ids(["K1"]);

    let error = resolver.resolve("u", "O1", Some(&scope)).await.unwrap_err();

    assert_eq!(executor.calls.load(Ordering::SeqCst), 1);
    match &error {
        ScopeError::ResolutionFailed {
            strategy,
            org_id,
            kb_ids,
            folder_ids,
            file_ids,
            ..
        } => {
            assert_eq!(*strategy, ScopeStrategy::Folders);
            assert_eq!(org_id, "O1");
            assert_eq!((*kb_ids, *folder_ids, *file_ids), (1, 2, 0));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(matches!(error.root_cause(), ScopeError::ConnectionError(_)));
}

#[tokio::test]
async fn test_unknown_collection_is_a_resolution_failure() {
    let store = seeded_store().await;
    let collections = CollectionNames {
        record_relations: "folderLinks".to_string(),
        ..CollectionNames::default()
    };
    let resolver = ScopeResolver::new(store, collections).unwrap();
    let scope = ScopeFilter::new().with_folder_ids(["F1"]);

    let error = resolver.resolve("u", "O1", Some(&scope)).await.unwrap_err();
    assert!(matches!(error.root_cause(), ScopeError::QueryError(_)));
}
