//! Query-execution port and its graph-store adapters
//!
//! The resolver hands a [`QueryPlan`] to a [`QueryExecutor`]. The Neo4j
//! adapter renders it to Cypher; the in-memory adapter evaluates the same
//! one-hop edge lookups itself.

pub mod memory;
pub mod neo4j;

use crate::error::Result;
use crate::query::QueryPlan;
use crate::schema::Record;
use async_trait::async_trait;

pub use memory::{Edge, MemoryGraphStore};
pub use neo4j::Neo4jClient;

/// Executes planned scope queries against a graph store
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run the plan once and return the matching records in store order
    async fn execute(&self, plan: &QueryPlan) -> Result<Vec<Record>>;
}
