//! Neo4j-backed query execution
//!
//! Records are `records` nodes keyed by an `id` property, knowledge bases and
//! folders are nodes with an `id` property, and membership/containment are
//! `belongsTo` / `recordRelations` relationships carrying a
//! `relationshipType` property (names follow [`CollectionNames`]).
//!
//! [`CollectionNames`]: crate::config::CollectionNames

use crate::config::StoreConfig;
use crate::error::{Result, ScopeError};
use crate::query::{render_cypher, BindValue, CypherQuery, QueryPlan};
use crate::schema::Record;
use crate::store::QueryExecutor;
use async_trait::async_trait;
use neo4rs::{query, ConfigBuilder, Graph, Query};
use std::time::Duration;
use tracing::{debug, error, info};

/// Neo4j client with connection pooling
pub struct Neo4jClient {
    graph: Graph,
    config: StoreConfig,
}

impl Neo4jClient {
    /// Connect using the given store configuration
    ///
    /// # Example
    /// ```no_run
    /// use kb_scope::{Neo4jClient, StoreConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let client = Neo4jClient::connect(&StoreConfig::from_env()?).await?;
    ///     client.health_check().await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        config.validate()?;

        info!(
            "Connecting to Neo4j at {} (database: {})",
            config.uri, config.database
        );

        let driver_config = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.user.as_str())
            .password(config.password.as_str())
            .db(config.database.as_str())
            .fetch_size(config.fetch_size)
            .max_connections(config.max_connections)
            .build()
            .map_err(|e| ScopeError::ConfigError(e.to_string()))?;

        let graph = Graph::connect(driver_config)
            .await
            .map_err(|e| ScopeError::ConnectionError(e.to_string()))?;

        info!("Successfully connected to Neo4j");

        Ok(Self {
            graph,
            config: config.clone(),
        })
    }

    /// Connect with explicit credentials and default pool settings
    pub async fn new(uri: &str, user: &str, password: &str, database: &str) -> Result<Self> {
        let config = StoreConfig::builder()
            .uri(uri)
            .user(user)
            .password(password)
            .database(database)
            .build();
        Self::connect(&config).await
    }

    /// Connectivity check using `RETURN 1`
    ///
    /// neo4rs connects lazily, so this is the first point where an
    /// unreachable server or bad credentials surface.
    pub async fn health_check(&self) -> Result<bool> {
        debug!("Executing health check (RETURN 1)");

        self.graph
            .run(query("RETURN 1"))
            .await
            .map_err(|e| ScopeError::ConnectionError(e.to_string()))?;

        debug!("Health check passed");
        Ok(true)
    }

    /// Get a reference to the underlying Neo4j Graph instance
    ///
    /// This allows direct access to the neo4rs Graph, e.g. for seeding data.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Get the configuration the client was created with
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    async fn fetch_records(&self, cypher: CypherQuery) -> Result<Vec<Record>> {
        let mut result = self
            .graph
            .execute(bind(cypher))
            .await
            .map_err(|e| ScopeError::QueryError(format!("Failed to execute scope query: {}", e)))?;

        let mut records = Vec::new();

        while let Some(row) = result
            .next()
            .await
            .map_err(|e| ScopeError::QueryError(format!("Failed to read record row: {}", e)))?
        {
            let document: serde_json::Value = row.get("record").map_err(|e| {
                ScopeError::QueryError(format!("Failed to extract record: {}", e))
            })?;

            let record: Record = serde_json::from_value(document).map_err(|e| {
                ScopeError::SerializationError(format!("Failed to shape record: {}", e))
            })?;

            records.push(record);
        }

        Ok(records)
    }
}

fn bind(cypher: CypherQuery) -> Query {
    let mut q = query(&cypher.text);
    for (name, value) in cypher.params {
        q = match value {
            BindValue::Text(text) => q.param(&name, text),
            BindValue::List(items) => q.param(&name, items),
        };
    }
    q
}

fn timeout_ms(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

#[async_trait]
impl QueryExecutor for Neo4jClient {
    async fn execute(&self, plan: &QueryPlan) -> Result<Vec<Record>> {
        let cypher = render_cypher(plan)?;
        debug!("Executing {} scope query:\n{}", plan.strategy, cypher.text);

        let outcome = match self.config.query_timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.fetch_records(cypher))
                .await
                .unwrap_or_else(|_| {
                    Err(ScopeError::TimeoutError {
                        timeout_ms: timeout_ms(timeout),
                        context: format!("{} scope query", plan.strategy),
                    })
                }),
            None => self.fetch_records(cypher).await,
        };

        if let Err(e) = &outcome {
            error!("Neo4j scope query failed: {}", e);
        }

        outcome
    }
}
