//! Type definitions for records and scope filters

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};

/// A content record stored in the records collection
///
/// Only the identity, organization and soft-delete flag are interpreted;
/// every other stored field is carried through untouched in `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Record key
    #[serde(alias = "_key")]
    pub id: String,
    /// Owning organization
    #[serde(rename = "orgId")]
    pub org_id: String,
    /// Soft-delete flag. Missing or null counts as not deleted
    #[serde(rename = "isDeleted", default, deserialize_with = "null_as_false")]
    pub is_deleted: bool,
    /// Remaining stored fields
    #[serde(flatten)]
    pub fields: Map<String, JsonValue>,
}

fn null_as_false<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Record {
    /// Create a live record with no extra fields
    pub fn new(id: impl Into<String>, org_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            org_id: org_id.into(),
            is_deleted: false,
            fields: Map::new(),
        }
    }

    /// Mark the record as soft-deleted
    pub fn deleted(mut self) -> Self {
        self.is_deleted = true;
        self
    }

    /// Add a stored field
    pub fn with_field(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Whether a scope query for `org_id` may return this record
    pub fn is_visible_in(&self, org_id: &str) -> bool {
        self.org_id == org_id && !self.is_deleted
    }
}

/// Caller-supplied scope restriction
///
/// At most one of the three id sets is honored per request; see
/// [`ScopeStrategy::select`](crate::query::ScopeStrategy::select). Any other
/// keys (departments, categories, ...) are accepted and kept in `metadata`
/// but do not influence resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopeFilter {
    /// Knowledge base ids
    #[serde(default, deserialize_with = "null_as_empty")]
    pub kb_ids: Vec<String>,
    /// Folder ids
    #[serde(default, deserialize_with = "null_as_empty")]
    pub folder_ids: Vec<String>,
    /// Record ids
    #[serde(default, deserialize_with = "null_as_empty")]
    pub file_ids: Vec<String>,
    /// Additional filter fields, not interpreted
    #[serde(flatten)]
    pub metadata: Map<String, JsonValue>,
}

impl ScopeFilter {
    /// Create an empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to the given knowledge bases
    pub fn with_kb_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.kb_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict to the given folders
    pub fn with_folder_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.folder_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict to the given records
    pub fn with_file_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.file_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// True when no container or file restriction is present
    pub fn is_unscoped(&self) -> bool {
        self.kb_ids.is_empty() && self.folder_ids.is_empty() && self.file_ids.is_empty()
    }
}
