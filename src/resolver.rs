//! Scope resolution
//!
//! [`ScopeResolver`] turns a user/org context and an optional scope into the
//! record set the scope implies. It is stateless between calls: each
//! `resolve` plans one query and executes it exactly once.

use crate::config::CollectionNames;
use crate::error::{Result, ScopeError};
use crate::query::{plan_query, QueryPlan};
use crate::schema::{Record, ScopeFilter};
use crate::store::QueryExecutor;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Resolves scopes to records through a [`QueryExecutor`]
#[derive(Clone)]
pub struct ScopeResolver {
    executor: Arc<dyn QueryExecutor>,
    collections: CollectionNames,
}

impl ScopeResolver {
    /// Create a resolver over an executor and a collection layout
    pub fn new(executor: Arc<dyn QueryExecutor>, collections: CollectionNames) -> Result<Self> {
        collections.validate()?;
        Ok(Self {
            executor,
            collections,
        })
    }

    /// Plan the query `resolve` would run, without executing it
    pub fn plan(&self, user_id: &str, org_id: &str, scope: Option<&ScopeFilter>) -> QueryPlan {
        let empty = ScopeFilter::default();
        plan_query(&self.collections, user_id, org_id, scope.unwrap_or(&empty))
    }

    /// Resolve a scope to the records it covers
    ///
    /// `user_id` is bound for traceability only; access to the scope's
    /// containers is assumed to have been checked by the caller. An absent
    /// scope returns every live record of the organization.
    ///
    /// # Errors
    /// Any executor failure is returned as [`ScopeError::ResolutionFailed`]
    /// wrapping the store-level cause. Nothing is retried.
    ///
    /// # Example
    /// ```no_run
    /// use kb_scope::{CollectionNames, Neo4jClient, ScopeFilter, ScopeResolver, StoreConfig};
    /// use std::sync::Arc;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let client = Neo4jClient::connect(&StoreConfig::from_env()?).await?;
    ///     let resolver = ScopeResolver::new(Arc::new(client), CollectionNames::default())?;
    ///
    ///     let scope = ScopeFilter::from_selections(["kb:kb-1:folder:f-7"]);
    ///     let records = resolver.resolve("user-1", "org-1", Some(&scope)).await?;
    ///     println!("{} records in scope", records.len());
    ///     Ok(())
    /// }
    /// ```
    pub async fn resolve(
        &self,
        user_id: &str,
        org_id: &str,
        scope: Option<&ScopeFilter>,
    ) -> Result<Vec<Record>> {
        let (kb_ids, folder_ids, file_ids) = scope.map_or((0, 0, 0), |s| {
            (s.kb_ids.len(), s.folder_ids.len(), s.file_ids.len())
        });

        info!(
            "Resolving scope for user {}, org {}. Filters: kb_ids={}, folder_ids={}, file_ids={}",
            user_id, org_id, kb_ids, folder_ids, file_ids
        );

        let plan = self.plan(user_id, org_id, scope);
        debug!(
            "Using {} strategy with bind vars: {:?}",
            plan.strategy, plan.bind_vars
        );

        let records = self.executor.execute(&plan).await.map_err(|e| {
            error!("Error resolving {} scope: {}", plan.strategy, e);
            ScopeError::ResolutionFailed {
                strategy: plan.strategy,
                org_id: org_id.to_string(),
                kb_ids,
                folder_ids,
                file_ids,
                source: Box::new(e),
            }
        })?;

        info!("Found {} records in scope", records.len());
        Ok(records)
    }
}
