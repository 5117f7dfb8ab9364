//! Error types for scope resolution
//!
//! This module defines the error type shared by the resolver, the query
//! planner and the graph-store adapters.

use crate::query::ScopeStrategy;
use thiserror::Error;

/// Main error type for scope resolution and store operations
#[derive(Error, Debug)]
pub enum ScopeError {
    /// Connection error - network or connection pool issues
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Query execution error
    #[error("Query error: {0}")]
    QueryError(String),

    /// Store call exceeded the configured timeout
    #[error("Operation timed out after {timeout_ms}ms: {context}")]
    TimeoutError { timeout_ms: u64, context: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Selection string that is not a known KB resource encoding
    #[error("Invalid KB resource: {0}")]
    InvalidResource(String),

    /// Executing the planned query failed; wraps the store-level cause
    #[error(
        "Scope resolution failed ({strategy} strategy, org {org_id}, kb_ids={kb_ids}, \
         folder_ids={folder_ids}, file_ids={file_ids}): {source}"
    )]
    ResolutionFailed {
        strategy: ScopeStrategy,
        org_id: String,
        kb_ids: usize,
        folder_ids: usize,
        file_ids: usize,
        #[source]
        source: Box<ScopeError>,
    },
}

/// Result type alias for scope operations
pub type Result<T> = std::result::Result<T, ScopeError>;

impl ScopeError {
    /// The store-level cause of a resolution failure, or `self` for any other variant
    pub fn root_cause(&self) -> &ScopeError {
        match self {
            ScopeError::ResolutionFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
