//! CRUD primitive handler

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use repo_kernel::{EntityMetadata, QueryError, StoreOperations};

use super::QueryHandler;
use crate::selector::CrudOperation;

/// Wires one CRUD primitive to the store operations port
///
/// The handler owns a shared reference to the store; the entity metadata
/// supplies the keyspace and the id field used by `save`.
pub struct CrudHandler {
    operation: CrudOperation,
    method: String,
    entity: Arc<EntityMetadata>,
    store: Arc<dyn StoreOperations>,
}

impl CrudHandler {
    /// Creates a handler for the given primitive
    pub fn new(
        operation: CrudOperation,
        method: impl Into<String>,
        entity: Arc<EntityMetadata>,
        store: Arc<dyn StoreOperations>,
    ) -> Self {
        Self {
            operation,
            method: method.into(),
            entity,
            store,
        }
    }

    fn id_argument(&self, args: &[Value]) -> Result<String, QueryError> {
        match args.first() {
            Some(Value::String(id)) => Ok(id.clone()),
            Some(Value::Number(id)) => Ok(id.to_string()),
            Some(other) => Err(QueryError::invalid_argument(
                &self.method,
                format!("id must be a string or number, got {other}"),
            )),
            None => Err(QueryError::invalid_argument(&self.method, "missing id argument")),
        }
    }

    fn document_id(&self, document: &Value) -> Result<String, QueryError> {
        let field = &self.entity.id_field().name;
        match document.get(field) {
            Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
            Some(Value::Number(id)) => Ok(id.to_string()),
            _ => Err(QueryError::invalid_argument(
                &self.method,
                format!("document carries no usable '{field}' id field"),
            )),
        }
    }
}

#[async_trait]
impl QueryHandler for CrudHandler {
    async fn execute(&self, args: &[Value]) -> Result<Value, QueryError> {
        let keyspace = self.entity.keyspace();
        match self.operation {
            CrudOperation::FindById => {
                let id = self.id_argument(args)?;
                Ok(self.store.get(keyspace, &id).await?.unwrap_or(Value::Null))
            }
            CrudOperation::FindAll => Ok(Value::Array(self.store.list(keyspace).await?)),
            CrudOperation::Save => {
                let document = args.first().ok_or_else(|| {
                    QueryError::invalid_argument(&self.method, "missing document argument")
                })?;
                if !document.is_object() {
                    return Err(QueryError::invalid_argument(
                        &self.method,
                        "document must be a JSON object",
                    ));
                }
                let id = self.document_id(document)?;
                self.store.put(keyspace, &id, document).await?;
                Ok(document.clone())
            }
            CrudOperation::DeleteById => {
                let id = self.id_argument(args)?;
                Ok(Value::Bool(self.store.delete(keyspace, &id).await?))
            }
            CrudOperation::Count => Ok(Value::from(self.store.count(keyspace).await?)),
            CrudOperation::ExistsById => {
                let id = self.id_argument(args)?;
                Ok(Value::Bool(self.store.exists(keyspace, &id).await?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repo_kernel::ports::mock::MockDocumentStore;
    use repo_kernel::FieldKind;
    use serde_json::json;

    fn handler(operation: CrudOperation, store: Arc<MockDocumentStore>) -> CrudHandler {
        let entity = Arc::new(
            EntityMetadata::builder("person")
                .keyspace("people")
                .field("name", FieldKind::String)
                .build(),
        );
        CrudHandler::new(operation, operation.method_name(), entity, store)
    }

    #[tokio::test]
    async fn test_save_extracts_id_from_document() {
        let store = Arc::new(MockDocumentStore::new());
        let save = handler(CrudOperation::Save, Arc::clone(&store));

        let doc = json!({"id": "p1", "name": "Ada"});
        let saved = save.execute(&[doc.clone()]).await.unwrap();
        assert_eq!(saved, doc);
        assert_eq!(store.get("people", "p1").await.unwrap(), Some(doc));
    }

    #[tokio::test]
    async fn test_save_without_id_field_fails() {
        let store = Arc::new(MockDocumentStore::new());
        let save = handler(CrudOperation::Save, store);

        let error = save.execute(&[json!({"name": "Ada"})]).await.unwrap_err();
        assert!(matches!(error, QueryError::InvalidArgument { .. }));
        assert!(error.to_string().contains("id"));
    }

    #[tokio::test]
    async fn test_find_by_id_returns_null_when_absent() {
        let store = Arc::new(MockDocumentStore::new());
        let find = handler(CrudOperation::FindById, store);

        let result = find.execute(&[json!("missing")]).await.unwrap();
        assert_eq!(result, Value::Null);
    }

    #[tokio::test]
    async fn test_numeric_id_arguments_are_accepted() {
        let store = Arc::new(MockDocumentStore::new());
        store.seed("people", "7", json!({"id": 7})).await;
        let exists = handler(CrudOperation::ExistsById, store);

        assert_eq!(exists.execute(&[json!(7)]).await.unwrap(), json!(true));
    }

    #[tokio::test]
    async fn test_count_and_delete() {
        let store = Arc::new(MockDocumentStore::new());
        store.seed("people", "p1", json!({"id": "p1"})).await;
        store.seed("people", "p2", json!({"id": "p2"})).await;

        let count = handler(CrudOperation::Count, Arc::clone(&store));
        assert_eq!(count.execute(&[]).await.unwrap(), json!(2));

        let delete = handler(CrudOperation::DeleteById, Arc::clone(&store));
        assert_eq!(delete.execute(&[json!("p1")]).await.unwrap(), json!(true));
        assert_eq!(delete.execute(&[json!("p1")]).await.unwrap(), json!(false));
        assert_eq!(count.execute(&[]).await.unwrap(), json!(1));
    }
}
