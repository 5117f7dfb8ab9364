//! Encoded KB resource selections
//!
//! Clients select scope as strings of the form:
//! - `kb:<kbId>` for a whole knowledge base
//! - `kb:<kbId>:folder:<folderId>` for a folder inside it
//! - `kb:<kbId>:file:<fileId>` for a single file inside it
//!
//! A bare hyphenated UUID is also accepted as a knowledge base selection.

use crate::error::{Result, ScopeError};
use crate::schema::types::ScopeFilter;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::warn;
use uuid::Uuid;

/// What a selection points at inside its knowledge base
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// The whole knowledge base
    KnowledgeBase,
    /// A folder, by id
    Folder(String),
    /// A single file record, by id
    File(String),
}

/// One parsed selection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KbResource {
    /// Knowledge base the selection belongs to
    pub kb_id: String,
    /// Selected resource within the knowledge base
    pub kind: ResourceKind,
}

impl KbResource {
    /// Select a whole knowledge base
    pub fn knowledge_base(kb_id: impl Into<String>) -> Self {
        Self {
            kb_id: kb_id.into(),
            kind: ResourceKind::KnowledgeBase,
        }
    }

    /// Select a folder inside a knowledge base
    pub fn folder(kb_id: impl Into<String>, folder_id: impl Into<String>) -> Self {
        Self {
            kb_id: kb_id.into(),
            kind: ResourceKind::Folder(folder_id.into()),
        }
    }

    /// Select a file inside a knowledge base
    pub fn file(kb_id: impl Into<String>, file_id: impl Into<String>) -> Self {
        Self {
            kb_id: kb_id.into(),
            kind: ResourceKind::File(file_id.into()),
        }
    }
}

impl FromStr for KbResource {
    type Err = ScopeError;

    fn from_str(encoded: &str) -> Result<Self> {
        let parts: Vec<&str> = encoded.split(':').collect();

        if parts.iter().all(|part| !part.is_empty()) {
            match parts.as_slice() {
                ["kb", kb_id] => return Ok(Self::knowledge_base(*kb_id)),
                ["kb", kb_id, "folder", folder_id] => return Ok(Self::folder(*kb_id, *folder_id)),
                ["kb", kb_id, "file", file_id] => return Ok(Self::file(*kb_id, *file_id)),
                _ => {}
            }
        }

        // Only the 36-character hyphenated form counts as a raw KB id
        if encoded.len() == 36 && Uuid::parse_str(encoded).is_ok() {
            return Ok(Self::knowledge_base(encoded));
        }

        Err(ScopeError::InvalidResource(encoded.to_string()))
    }
}

impl fmt::Display for KbResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ResourceKind::KnowledgeBase => write!(f, "kb:{}", self.kb_id),
            ResourceKind::Folder(id) => write!(f, "kb:{}:folder:{}", self.kb_id, id),
            ResourceKind::File(id) => write!(f, "kb:{}:file:{}", self.kb_id, id),
        }
    }
}

impl ScopeFilter {
    /// Build a filter from encoded selection strings
    ///
    /// Every valid selection contributes its KB id; folder and file
    /// selections also contribute their resource id. Each set keeps
    /// first-seen order without duplicates. Invalid strings are skipped.
    pub fn from_selections<I, S>(selections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter = ScopeFilter::new();
        let mut seen_kbs = HashSet::new();
        let mut seen_folders = HashSet::new();
        let mut seen_files = HashSet::new();

        for encoded in selections {
            let encoded = encoded.as_ref();
            let resource = match encoded.parse::<KbResource>() {
                Ok(resource) => resource,
                Err(e) => {
                    warn!("Skipping selection: {}", e);
                    continue;
                }
            };

            if seen_kbs.insert(resource.kb_id.clone()) {
                filter.kb_ids.push(resource.kb_id);
            }

            match resource.kind {
                ResourceKind::KnowledgeBase => {}
                ResourceKind::Folder(id) => {
                    if seen_folders.insert(id.clone()) {
                        filter.folder_ids.push(id);
                    }
                }
                ResourceKind::File(id) => {
                    if seen_files.insert(id.clone()) {
                        filter.file_ids.push(id);
                    }
                }
            }
        }

        filter
    }

    /// Encode the filter back into selection strings for display
    ///
    /// Folder and file ids are attributed to the first KB id, since the
    /// filter does not record which KB each one came from. Whole-KB
    /// selections are only emitted when there is no folder or file
    /// selection at all.
    pub fn to_selections(&self) -> Vec<String> {
        let mut encoded = Vec::new();

        if let Some(first_kb) = self.kb_ids.first() {
            for folder_id in &self.folder_ids {
                encoded.push(KbResource::folder(first_kb.as_str(), folder_id.as_str()).to_string());
            }
            for file_id in &self.file_ids {
                encoded.push(KbResource::file(first_kb.as_str(), file_id.as_str()).to_string());
            }
        }

        if self.folder_ids.is_empty() && self.file_ids.is_empty() {
            for kb_id in &self.kb_ids {
                encoded.push(KbResource::knowledge_base(kb_id.as_str()).to_string());
            }
        }

        encoded
    }
}
