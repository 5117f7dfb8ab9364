//! Scope query planning
//!
//! `plan` selects the traversal strategy and binds its parameters;
//! `cypher` turns a plan into query text for a Cypher-speaking store.

pub mod cypher;
pub mod plan;

pub use cypher::{render as render_cypher, CypherQuery};
pub use plan::{params, plan_query, BindValue, BindVars, QueryPlan, ScopeStrategy};
