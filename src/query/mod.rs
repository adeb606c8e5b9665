//! Query collaborator boundary
//!
//! Record loading and filtering stay outside this crate. Each resource
//! may register a [`ResourceQuery`] implementation; the dispatcher only
//! speaks this contract.

use crate::domain::{Record, RequestContext};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Current-page sentinel that disables pagination: fetch all matches
pub const UNPAGINATED: i64 = -1;

/// One query predicate with its bound parameters
#[derive(Debug, Clone, PartialEq)]
pub struct QueryClause {
    pub predicate: String,
    pub params: Vec<Value>,
}

/// Criteria for a bulk-selection query
#[derive(Debug, Clone, Default)]
pub struct QueryCriteria {
    /// OR-combined clauses, one per selected primary key
    pub clauses: Vec<QueryClause>,
    /// Page to fetch; [`UNPAGINATED`] fetches everything
    pub current_page: i64,
}

impl QueryCriteria {
    /// The clauses joined with OR, for SQL-like backends
    pub fn combined_predicate(&self) -> String {
        self.clauses
            .iter()
            .map(|c| c.predicate.as_str())
            .collect::<Vec<_>>()
            .join(" OR ")
    }

    /// All bound parameters, in clause order
    pub fn combined_params(&self) -> Vec<Value> {
        self.clauses
            .iter()
            .flat_map(|c| c.params.iter().cloned())
            .collect()
    }
}

/// Per-resource query collaborator
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceQuery: Send + Sync {
    /// Build the primary-key predicate for one selected value
    fn to_primary_query_params(&self, primary_value: &str, context: &RequestContext)
        -> QueryClause;

    /// Execute the criteria and return matching records
    async fn find_many(
        &self,
        criteria: &QueryCriteria,
        context: &RequestContext,
    ) -> Result<Vec<Arc<dyn Record>>>;
}
