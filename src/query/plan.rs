//! Strategy selection and bound parameters for scope queries

use crate::config::CollectionNames;
use crate::schema::ScopeFilter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Names of the parameters bound on a scope query
///
/// Names starting with `@` bind collection names; everything else binds a value.
pub mod params {
    pub const ORG_ID: &str = "org_id";
    pub const USER_ID: &str = "user_id";
    pub const RECORDS: &str = "@records";
    pub const FILES: &str = "@files";
    pub const BELONGS_TO: &str = "@belongs_to";
    pub const RECORD_RELATIONS: &str = "@record_relations";
    pub const FILE_IDS: &str = "file_ids";
    pub const FOLDER_IDS: &str = "folder_ids";
    pub const KB_IDS: &str = "kb_ids";
    pub const RELATIONSHIP_TYPE: &str = "relationship_type";
}

/// Traversal strategy chosen for a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeStrategy {
    /// Direct match on record ids
    Files,
    /// Records with a parent-child containment edge into a requested folder
    Folders,
    /// Records with a parent-child membership edge into a requested KB
    KnowledgeBases,
    /// Every live record of the organization
    Unscoped,
}

impl ScopeStrategy {
    /// Pick the strategy for a scope
    ///
    /// File ids win over folder ids, which win over KB ids. Lower-priority
    /// sets are ignored once a higher one is non-empty.
    pub fn select(scope: &ScopeFilter) -> Self {
        if !scope.file_ids.is_empty() {
            ScopeStrategy::Files
        } else if !scope.folder_ids.is_empty() {
            ScopeStrategy::Folders
        } else if !scope.kb_ids.is_empty() {
            ScopeStrategy::KnowledgeBases
        } else {
            ScopeStrategy::Unscoped
        }
    }

    /// Convert strategy to string
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeStrategy::Files => "files",
            ScopeStrategy::Folders => "folders",
            ScopeStrategy::KnowledgeBases => "knowledge_bases",
            ScopeStrategy::Unscoped => "unscoped",
        }
    }

    /// Whether the strategy walks an edge collection
    pub fn is_traversal(&self) -> bool {
        matches!(self, ScopeStrategy::Folders | ScopeStrategy::KnowledgeBases)
    }
}

impl fmt::Display for ScopeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value bound to a query parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BindValue {
    Text(String),
    List(Vec<String>),
}

impl BindValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            BindValue::Text(s) => Some(s.as_str()),
            BindValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            BindValue::List(items) => Some(items.as_slice()),
            BindValue::Text(_) => None,
        }
    }
}

/// Bound parameters, ordered by name
pub type BindVars = BTreeMap<String, BindValue>;

/// A planned scope query: which strategy to run and what is bound to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPlan {
    pub strategy: ScopeStrategy,
    pub bind_vars: BindVars,
}

impl QueryPlan {
    /// Look up a bound text value
    pub fn text(&self, name: &str) -> Option<&str> {
        self.bind_vars.get(name).and_then(BindValue::as_text)
    }

    /// Look up a bound list value
    pub fn list(&self, name: &str) -> Option<&[String]> {
        self.bind_vars.get(name).and_then(BindValue::as_list)
    }

    /// Collection parameters (`@`-prefixed), name stripped of the prefix
    pub fn collection_params(&self) -> impl Iterator<Item = (&str, &BindValue)> {
        self.bind_vars
            .iter()
            .filter_map(|(name, value)| name.strip_prefix('@').map(|n| (n, value)))
    }

    /// Value parameters (everything that is not a collection parameter)
    pub fn value_params(&self) -> impl Iterator<Item = (&str, &BindValue)> {
        self.bind_vars
            .iter()
            .filter(|(name, _)| !name.starts_with('@'))
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Name of the edge collection the strategy traverses, if any
    pub fn edge_collection(&self) -> Option<&str> {
        match self.strategy {
            ScopeStrategy::Folders => self.text(params::RECORD_RELATIONS),
            ScopeStrategy::KnowledgeBases => self.text(params::BELONGS_TO),
            ScopeStrategy::Files | ScopeStrategy::Unscoped => None,
        }
    }

    /// Ids the strategy matches against: record ids or container ids
    pub fn target_ids(&self) -> Option<&[String]> {
        match self.strategy {
            ScopeStrategy::Files => self.list(params::FILE_IDS),
            ScopeStrategy::Folders => self.list(params::FOLDER_IDS),
            ScopeStrategy::KnowledgeBases => self.list(params::KB_IDS),
            ScopeStrategy::Unscoped => None,
        }
    }
}

/// Plan the query for a scope
///
/// Org, user and the four collection names are always bound. Exactly one id
/// set is bound, the one belonging to the selected strategy, and traversals
/// also bind the parent-child relationship type.
pub fn plan_query(
    collections: &CollectionNames,
    user_id: &str,
    org_id: &str,
    scope: &ScopeFilter,
) -> QueryPlan {
    let strategy = ScopeStrategy::select(scope);

    let mut bind_vars = BindVars::new();
    let mut text = |name: &str, value: &str| {
        bind_vars.insert(name.to_string(), BindValue::Text(value.to_string()));
    };
    text(params::ORG_ID, org_id);
    text(params::USER_ID, user_id);
    text(params::RECORDS, &collections.records);
    text(params::FILES, &collections.files);
    text(params::BELONGS_TO, &collections.belongs_to);
    text(params::RECORD_RELATIONS, &collections.record_relations);

    let ids = match strategy {
        ScopeStrategy::Files => Some((params::FILE_IDS, &scope.file_ids)),
        ScopeStrategy::Folders => Some((params::FOLDER_IDS, &scope.folder_ids)),
        ScopeStrategy::KnowledgeBases => Some((params::KB_IDS, &scope.kb_ids)),
        ScopeStrategy::Unscoped => None,
    };
    if let Some((name, ids)) = ids {
        bind_vars.insert(name.to_string(), BindValue::List(ids.clone()));
    }

    if strategy.is_traversal() {
        bind_vars.insert(
            params::RELATIONSHIP_TYPE.to_string(),
            BindValue::Text(collections.parent_child.clone()),
        );
    }

    QueryPlan { strategy, bind_vars }
}
