//! In-process graph store
//!
//! Holds records, container nodes (knowledge bases and folders) and edges in
//! named collections, and evaluates scope plans with the same semantics as
//! the Cypher rendering: an edge only counts when its discriminator matches
//! and its target container exists, and every qualifying edge yields a row.

use crate::config::CollectionNames;
use crate::error::{Result, ScopeError};
use crate::query::{params, QueryPlan, ScopeStrategy};
use crate::schema::Record;
use crate::store::QueryExecutor;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;

/// Directed edge from a record to a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub relationship_type: String,
}

impl Edge {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        relationship_type: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            relationship_type: relationship_type.into(),
        }
    }
}

#[derive(Default)]
struct GraphState {
    /// Record collections, in insertion order
    documents: HashMap<String, Vec<Record>>,
    /// Edge collections, keyed by source record id, in insertion order
    edges: HashMap<String, HashMap<String, Vec<Edge>>>,
    /// Ids of existing knowledge bases and folders
    containers: HashSet<String>,
}

/// Graph store kept entirely in memory
pub struct MemoryGraphStore {
    collections: CollectionNames,
    state: RwLock<GraphState>,
}

impl MemoryGraphStore {
    /// Create an empty store with the given collection layout
    ///
    /// The configured collections exist from the start; plans naming any
    /// other collection fail like an unknown collection would in a real store.
    pub fn new(collections: CollectionNames) -> Self {
        let mut state = GraphState::default();
        state.documents.insert(collections.records.clone(), Vec::new());
        state.documents.insert(collections.files.clone(), Vec::new());
        state.edges.insert(collections.belongs_to.clone(), HashMap::new());
        state.edges.insert(collections.record_relations.clone(), HashMap::new());

        Self {
            collections,
            state: RwLock::new(state),
        }
    }

    pub fn collections(&self) -> &CollectionNames {
        &self.collections
    }

    /// Add a record to the records collection
    pub async fn insert_record(&self, record: Record) {
        let mut state = self.state.write().await;
        state
            .documents
            .entry(self.collections.records.clone())
            .or_default()
            .push(record);
    }

    /// Register a knowledge base node
    pub async fn insert_knowledge_base(&self, kb_id: impl Into<String>) {
        self.state.write().await.containers.insert(kb_id.into());
    }

    /// Register a folder node
    pub async fn insert_folder(&self, folder_id: impl Into<String>) {
        self.state.write().await.containers.insert(folder_id.into());
    }

    /// Remove a knowledge base or folder node, leaving its edges dangling
    pub async fn remove_container(&self, container_id: &str) -> bool {
        self.state.write().await.containers.remove(container_id)
    }

    /// Add a record -> KB edge with the given discriminator
    pub async fn link_to_knowledge_base(
        &self,
        record_id: &str,
        kb_id: &str,
        relationship_type: &str,
    ) {
        let collection = self.collections.belongs_to.clone();
        self.insert_edge(&collection, Edge::new(record_id, kb_id, relationship_type))
            .await;
    }

    /// Add a record -> folder edge with the given discriminator
    pub async fn link_to_folder(&self, record_id: &str, folder_id: &str, relationship_type: &str) {
        let collection = self.collections.record_relations.clone();
        self.insert_edge(&collection, Edge::new(record_id, folder_id, relationship_type))
            .await;
    }

    /// Add an edge to an arbitrary edge collection
    pub async fn insert_edge(&self, collection: &str, edge: Edge) {
        let mut state = self.state.write().await;
        state
            .edges
            .entry(collection.to_string())
            .or_default()
            .entry(edge.from.clone())
            .or_default()
            .push(edge);
    }

    /// Number of records in the records collection
    pub async fn record_count(&self) -> usize {
        let state = self.state.read().await;
        state
            .documents
            .get(&self.collections.records)
            .map_or(0, Vec::len)
    }
}

fn required_text<'a>(plan: &'a QueryPlan, name: &str) -> Result<&'a str> {
    plan.text(name)
        .ok_or_else(|| ScopeError::QueryError(format!("bind parameter {} is not set", name)))
}

#[async_trait]
impl QueryExecutor for MemoryGraphStore {
    async fn execute(&self, plan: &QueryPlan) -> Result<Vec<Record>> {
        let org_id = required_text(plan, params::ORG_ID)?;
        let records_name = required_text(plan, params::RECORDS)?;

        let state = self.state.read().await;
        let records = state.documents.get(records_name).ok_or_else(|| {
            ScopeError::QueryError(format!("collection or view not found: {}", records_name))
        })?;

        let live = records.iter().filter(|record| record.is_visible_in(org_id));

        let matched: Vec<Record> = match plan.strategy {
            ScopeStrategy::Unscoped => live.cloned().collect(),
            ScopeStrategy::Files => {
                let ids: HashSet<&str> = plan
                    .target_ids()
                    .ok_or_else(|| {
                        ScopeError::QueryError(format!("bind parameter {} is not set", params::FILE_IDS))
                    })?
                    .iter()
                    .map(String::as_str)
                    .collect();
                live.filter(|record| ids.contains(record.id.as_str()))
                    .cloned()
                    .collect()
            }
            ScopeStrategy::Folders | ScopeStrategy::KnowledgeBases => {
                let edge_name = plan.edge_collection().ok_or_else(|| {
                    ScopeError::QueryError("edge collection parameter is not set".to_string())
                })?;
                let edges = state.edges.get(edge_name).ok_or_else(|| {
                    ScopeError::QueryError(format!("collection or view not found: {}", edge_name))
                })?;
                let relationship_type = required_text(plan, params::RELATIONSHIP_TYPE)?;
                let ids: HashSet<&str> = plan
                    .target_ids()
                    .ok_or_else(|| {
                        ScopeError::QueryError("container id parameter is not set".to_string())
                    })?
                    .iter()
                    .map(String::as_str)
                    .collect();

                let mut rows = Vec::new();
                for record in live {
                    let Some(outgoing) = edges.get(&record.id) else {
                        continue;
                    };
                    let qualifying = outgoing.iter().filter(|edge| {
                        edge.relationship_type == relationship_type
                            && state.containers.contains(&edge.to)
                            && ids.contains(edge.to.as_str())
                    });
                    for _ in qualifying {
                        rows.push(record.clone());
                    }
                }
                rows
            }
        };

        debug!(
            "In-memory {} query matched {} rows",
            plan.strategy,
            matched.len()
        );

        Ok(matched)
    }
}
