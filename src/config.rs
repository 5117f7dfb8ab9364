//! Configuration for the graph store and its collection layout

use crate::error::{Result, ScopeError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// URI schemes accepted by the Bolt driver
const SUPPORTED_SCHEMES: &[&str] = &["bolt", "bolt+s", "bolt+ssc", "neo4j", "neo4j+s", "neo4j+ssc"];

/// Names of the collections a scope query touches
///
/// Record nodes live in `records`; KB membership and folder containment are
/// edges in `belongs_to` and `record_relations`. Only edges whose
/// `relationshipType` equals `parent_child` confer membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionNames {
    /// Record collection (node label)
    pub records: String,
    /// File/type collection. Bound on every query, not dereferenced by any strategy
    pub files: String,
    /// Record -> KB membership edges
    pub belongs_to: String,
    /// Record -> Folder containment edges
    pub record_relations: String,
    /// Edge discriminator marking a direct parent-child relation
    pub parent_child: String,
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            records: "records".to_string(),
            files: "files".to_string(),
            belongs_to: "belongsTo".to_string(),
            record_relations: "recordRelations".to_string(),
            parent_child: "PARENT_CHILD".to_string(),
        }
    }
}

impl CollectionNames {
    /// Validate the collection names
    ///
    /// Collection names end up as labels and relationship types in the
    /// rendered query, which cannot be bound as parameters, so they must be
    /// plain identifiers.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("records", &self.records),
            ("files", &self.files),
            ("belongs_to", &self.belongs_to),
            ("record_relations", &self.record_relations),
        ] {
            if !is_identifier(value) {
                return Err(ScopeError::ConfigError(format!(
                    "collection name {} must be a plain identifier, got {:?}",
                    field, value
                )));
            }
        }

        if self.parent_child.trim().is_empty() {
            return Err(ScopeError::ConfigError(
                "parent_child relationship type must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Connection settings for the Neo4j-backed store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Connection URI (e.g., "bolt://localhost:7687")
    pub uri: String,
    /// Username for authentication
    pub user: String,
    /// Password for authentication
    pub password: String,
    /// Database name
    pub database: String,
    /// Rows fetched per round trip
    pub fetch_size: usize,
    /// Connection pool size
    pub max_connections: usize,
    /// Upper bound on a single query execution, if any
    pub query_timeout: Option<Duration>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "password".to_string(),
            database: "neo4j".to_string(),
            fetch_size: 500,
            max_connections: 16,
            query_timeout: None,
        }
    }
}

impl StoreConfig {
    /// Create a new builder for store configuration
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }

    /// Load configuration from the environment, reading a `.env` file first if present
    ///
    /// Recognised variables: `NEO4J_URI`, `NEO4J_USER`, `NEO4J_PASSWORD`,
    /// `NEO4J_DATABASE`, `NEO4J_FETCH_SIZE`, `NEO4J_MAX_CONNECTIONS` and
    /// `NEO4J_QUERY_TIMEOUT_MS`. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let defaults = Self::default();
        let config = Self {
            uri: std::env::var("NEO4J_URI").unwrap_or(defaults.uri),
            user: std::env::var("NEO4J_USER").unwrap_or(defaults.user),
            password: std::env::var("NEO4J_PASSWORD").unwrap_or(defaults.password),
            database: std::env::var("NEO4J_DATABASE").unwrap_or(defaults.database),
            fetch_size: env_number("NEO4J_FETCH_SIZE")?.unwrap_or(defaults.fetch_size),
            max_connections: env_number("NEO4J_MAX_CONNECTIONS")?
                .unwrap_or(defaults.max_connections),
            query_timeout: env_number::<u64>("NEO4J_QUERY_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .or(defaults.query_timeout),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let scheme = self
            .uri
            .split_once("://")
            .map(|(scheme, _)| scheme)
            .ok_or_else(|| ScopeError::ConfigError(format!("uri has no scheme: {}", self.uri)))?;

        if !SUPPORTED_SCHEMES.contains(&scheme) {
            return Err(ScopeError::ConfigError(format!(
                "unsupported uri scheme {:?}, expected one of {:?}",
                scheme, SUPPORTED_SCHEMES
            )));
        }

        if self.database.is_empty() {
            return Err(ScopeError::ConfigError("database must not be empty".to_string()));
        }

        if self.fetch_size == 0 {
            return Err(ScopeError::ConfigError(
                "fetch_size must be greater than 0".to_string(),
            ));
        }

        if self.max_connections == 0 {
            return Err(ScopeError::ConfigError(
                "max_connections must be greater than 0".to_string(),
            ));
        }

        if self.query_timeout == Some(Duration::ZERO) {
            return Err(ScopeError::ConfigError(
                "query_timeout must be greater than 0 when set".to_string(),
            ));
        }

        Ok(())
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ScopeError::ConfigError(format!("{} is not a valid number: {}", key, raw))),
        Err(_) => Ok(None),
    }
}

/// Builder for store configuration
#[derive(Debug, Default)]
pub struct StoreConfigBuilder {
    uri: Option<String>,
    user: Option<String>,
    password: Option<String>,
    database: Option<String>,
    fetch_size: Option<usize>,
    max_connections: Option<usize>,
    query_timeout: Option<Duration>,
}

impl StoreConfigBuilder {
    /// Set the connection URI
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Set the username
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Set the password
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the database name
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the fetch size
    pub fn fetch_size(mut self, size: usize) -> Self {
        self.fetch_size = Some(size);
        self
    }

    /// Set the connection pool size
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = Some(max);
        self
    }

    /// Set the per-query timeout
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    /// Build the store configuration
    pub fn build(self) -> StoreConfig {
        let defaults = StoreConfig::default();

        StoreConfig {
            uri: self.uri.unwrap_or(defaults.uri),
            user: self.user.unwrap_or(defaults.user),
            password: self.password.unwrap_or(defaults.password),
            database: self.database.unwrap_or(defaults.database),
            fetch_size: self.fetch_size.unwrap_or(defaults.fetch_size),
            max_connections: self.max_connections.unwrap_or(defaults.max_connections),
            query_timeout: self.query_timeout.or(defaults.query_timeout),
        }
    }
}
