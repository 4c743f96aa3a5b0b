//! Raw query handler

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use repo_kernel::{
    EntityMetadata, MethodDescriptor, ParameterContextProvider, QueryError, ReturnHint,
    SearchOperations,
};

use super::QueryHandler;

/// Executes a hand-written query expression
///
/// The expression stays opaque; at execute time the context provider binds
/// invocation arguments to names, and the bound expression goes to the search
/// operations port verbatim. The result is shaped by the method's declared
/// return hint.
pub struct RawQueryHandler {
    descriptor: MethodDescriptor,
    expression: String,
    entity: Arc<EntityMetadata>,
    search: Arc<dyn SearchOperations>,
    context: Arc<dyn ParameterContextProvider>,
}

impl RawQueryHandler {
    /// Creates a handler for the given expression
    pub fn new(
        descriptor: MethodDescriptor,
        expression: impl Into<String>,
        entity: Arc<EntityMetadata>,
        search: Arc<dyn SearchOperations>,
        context: Arc<dyn ParameterContextProvider>,
    ) -> Self {
        Self {
            descriptor,
            expression: expression.into(),
            entity,
            search,
            context,
        }
    }
}

#[async_trait]
impl QueryHandler for RawQueryHandler {
    async fn execute(&self, args: &[Value]) -> Result<Value, QueryError> {
        let bindings = self.context.bind(&self.descriptor, args);
        let documents = self
            .search
            .search_raw(self.entity.keyspace(), &self.expression, &bindings)
            .await?;

        Ok(match self.descriptor.return_hint() {
            ReturnHint::Many => Value::Array(documents),
            ReturnHint::Count => Value::from(documents.len() as u64),
            ReturnHint::Bool => Value::Bool(!documents.is_empty()),
            ReturnHint::Entity | ReturnHint::OptionalEntity => {
                documents.into_iter().next().unwrap_or(Value::Null)
            }
            ReturnHint::Unit => Value::Null,
        })
    }
}
