//! Cypher rendering of scope query plans
//!
//! Labels and relationship types cannot be parameters in Cypher, so the
//! collection parameters of a plan are written into the query text as
//! quoted identifiers. Every value parameter stays a `$name` parameter.

use crate::error::{Result, ScopeError};
use crate::query::plan::{params, BindValue, QueryPlan, ScopeStrategy};

/// A rendered query ready for the driver
#[derive(Debug, Clone, PartialEq)]
pub struct CypherQuery {
    pub text: String,
    pub params: Vec<(String, BindValue)>,
}

/// Render a plan into Cypher
///
/// Traversal strategies emit one row per qualifying edge, so a record
/// reachable through several requested containers is returned once per edge.
pub fn render(plan: &QueryPlan) -> Result<CypherQuery> {
    let records = label(plan, params::RECORDS)?;

    let live_record = "record.orgId = $org_id\n  AND coalesce(record.isDeleted, false) <> true";

    let text = match plan.strategy {
        ScopeStrategy::Files => format!(
            "MATCH (record:{records})\n\
             WHERE record.id IN $file_ids\n  AND {live_record}\n\
             RETURN properties(record) AS record"
        ),
        ScopeStrategy::Folders | ScopeStrategy::KnowledgeBases => {
            let (edge_param, ids_param) = if plan.strategy == ScopeStrategy::Folders {
                (params::RECORD_RELATIONS, params::FOLDER_IDS)
            } else {
                (params::BELONGS_TO, params::KB_IDS)
            };
            let edges = label(plan, edge_param)?;
            format!(
                "MATCH (record:{records})-[edge:{edges}]->(container)\n\
                 WHERE {live_record}\n  \
                 AND edge.relationshipType = ${relationship_type}\n  \
                 AND container.id IN ${ids_param}\n\
                 RETURN properties(record) AS record",
                relationship_type = params::RELATIONSHIP_TYPE,
            )
        }
        ScopeStrategy::Unscoped => format!(
            "MATCH (record:{records})\n\
             WHERE {live_record}\n\
             RETURN properties(record) AS record"
        ),
    };

    let params = plan
        .value_params()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect();

    Ok(CypherQuery { text, params })
}

fn label(plan: &QueryPlan, param: &str) -> Result<String> {
    let name = plan
        .text(param)
        .ok_or_else(|| ScopeError::QueryError(format!("collection parameter {} is not bound", param)))?;

    if name.is_empty() || name.contains('`') {
        return Err(ScopeError::QueryError(format!(
            "collection name {:?} cannot be used as a label",
            name
        )));
    }

    Ok(format!("`{}`", name))
}
