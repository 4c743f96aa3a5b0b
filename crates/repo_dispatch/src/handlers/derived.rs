//! Derived query handler

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use repo_kernel::{DerivedQuery, EntityMetadata, QueryError, QueryForm, SearchOperations};

use super::QueryHandler;

/// Executes a query derived from a method name
///
/// The structured query is parsed once, at repository-build time; execution
/// delegates to the search operations port and shapes the result per the
/// query form.
pub struct DerivedQueryHandler {
    query: DerivedQuery,
    entity: Arc<EntityMetadata>,
    search: Arc<dyn SearchOperations>,
}

impl DerivedQueryHandler {
    /// Creates a handler around a pre-parsed query
    pub fn new(
        query: DerivedQuery,
        entity: Arc<EntityMetadata>,
        search: Arc<dyn SearchOperations>,
    ) -> Self {
        Self {
            query,
            entity,
            search,
        }
    }

    /// The structured query this handler executes
    pub fn query(&self) -> &DerivedQuery {
        &self.query
    }
}

#[async_trait]
impl QueryHandler for DerivedQueryHandler {
    async fn execute(&self, args: &[Value]) -> Result<Value, QueryError> {
        let documents = self
            .search
            .search(self.entity.keyspace(), &self.query, args)
            .await?;

        Ok(match self.query.form {
            QueryForm::FindMany => Value::Array(documents),
            QueryForm::Count => Value::from(documents.len() as u64),
            QueryForm::Exists => Value::Bool(!documents.is_empty()),
        })
    }
}
