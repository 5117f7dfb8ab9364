//! Record and scope schema
//!
//! This module defines the record documents returned by scope resolution,
//! the scope filter callers supply, and the encoded selection strings
//! clients use to build that filter.

pub mod resource;
pub mod types;

pub use resource::{KbResource, ResourceKind};
pub use types::{Record, ScopeFilter};
