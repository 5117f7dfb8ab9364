//! # kb-scope
//!
//! Resolves which document records a request may see, given an optional
//! scope of knowledge bases, folders or individual files. Records reach
//! knowledge bases and folders through edges in a graph store, not through
//! fields on the record.
//!
//! ## Strategies
//!
//! Exactly one strategy runs per request, chosen by priority:
//!
//! 1. file ids: direct match on record ids
//! 2. folder ids: records with a parent-child `recordRelations` edge into a requested folder
//! 3. KB ids: records with a parent-child `belongsTo` edge into a requested knowledge base
//! 4. nothing: every live record of the organization
//!
//! Every strategy is confined to one organization and skips soft-deleted records.
//!
//! ## Resolving against Neo4j
//!
//! ```no_run
//! use kb_scope::{CollectionNames, Neo4jClient, ScopeFilter, ScopeResolver, StoreConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Neo4jClient::connect(&StoreConfig::from_env()?).await?;
//!     client.health_check().await?;
//!
//!     let resolver = ScopeResolver::new(Arc::new(client), CollectionNames::default())?;
//!     let scope = ScopeFilter::new().with_kb_ids(["kb-1", "kb-2"]);
//!
//!     for record in resolver.resolve("user-1", "org-1", Some(&scope)).await? {
//!         println!("{}", record.id);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Resolving in memory
//!
//! ```
//! use kb_scope::{CollectionNames, MemoryGraphStore, Record, ScopeFilter, ScopeResolver};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> kb_scope::Result<()> {
//! let store = Arc::new(MemoryGraphStore::new(CollectionNames::default()));
//! store.insert_record(Record::new("r-1", "org-1")).await;
//! store.insert_folder("f-1").await;
//! store.link_to_folder("r-1", "f-1", "PARENT_CHILD").await;
//!
//! let resolver = ScopeResolver::new(store, CollectionNames::default())?;
//! let scope = ScopeFilter::from_selections(["kb:kb-1:folder:f-1"]);
//! let records = resolver.resolve("user-1", "org-1", Some(&scope)).await?;
//! assert_eq!(records[0].id, "r-1");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod query;
pub mod resolver;
pub mod schema;
pub mod store;

// Re-export main types for convenience
pub use config::{CollectionNames, StoreConfig, StoreConfigBuilder};
pub use error::{Result, ScopeError};
pub use query::{plan_query, BindValue, BindVars, QueryPlan, ScopeStrategy};
pub use resolver::ScopeResolver;
pub use schema::{KbResource, Record, ResourceKind, ScopeFilter};
pub use store::{Edge, MemoryGraphStore, Neo4jClient, QueryExecutor};
