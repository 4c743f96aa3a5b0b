//! Boundary ports consumed by the dispatcher
//!
//! The dispatcher itself performs no I/O; everything it wires handlers to
//! lives behind the traits in this module:
//!
//! - [`StoreOperations`]: document CRUD keyed by `(keyspace, id)`
//! - [`SearchOperations`]: execution of derived and raw queries, opaque to
//!   the build phase
//! - [`ParameterContextProvider`]: named bindings for raw-query execution
//!
//! Adapters implement these traits against a concrete backend (the Redis
//! adapter lives in `infra_redis`); the mock store in [`mock`] backs tests.
//!
//! All port methods are async and return `Result<T, StoreError>` so handler
//! code sees one error shape regardless of the adapter wired in.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;
use crate::method::MethodDescriptor;
use crate::query::DerivedQuery;

/// A stored document
///
/// Documents are JSON objects carrying the entity id under the metadata's id
/// field.
pub type Document = Value;

/// Generic key-value CRUD over documents keyed by id
///
/// `list` is part of the contract because the find-all CRUD primitive needs
/// enumeration of a keyspace; adapters without native enumeration must
/// emulate it.
#[async_trait]
pub trait StoreOperations: Send + Sync {
    /// Fetches a document by id, `None` if absent
    async fn get(&self, keyspace: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Stores a document under the given id, replacing any previous value
    async fn put(&self, keyspace: &str, id: &str, document: &Document) -> Result<(), StoreError>;

    /// Deletes a document by id, returning whether it existed
    async fn delete(&self, keyspace: &str, id: &str) -> Result<bool, StoreError>;

    /// Returns true if a document exists under the given id
    async fn exists(&self, keyspace: &str, id: &str) -> Result<bool, StoreError>;

    /// Number of documents in the keyspace
    async fn count(&self, keyspace: &str) -> Result<u64, StoreError>;

    /// All documents in the keyspace
    async fn list(&self, keyspace: &str) -> Result<Vec<Document>, StoreError>;
}

/// Execution of structured and raw queries
///
/// The dispatcher never calls these during resolution; handlers call them
/// lazily on `execute`. The raw expression is opaque: its syntax is a
/// contract between whoever wrote the query payload and the adapter.
#[async_trait]
pub trait SearchOperations: Send + Sync {
    /// Executes a structured derived query and returns the matching documents
    async fn search(
        &self,
        keyspace: &str,
        query: &DerivedQuery,
        args: &[Value],
    ) -> Result<Vec<Document>, StoreError>;

    /// Executes an opaque query expression with named bindings
    async fn search_raw(
        &self,
        keyspace: &str,
        expression: &str,
        bindings: &HashMap<String, Value>,
    ) -> Result<Vec<Document>, StoreError>;
}

/// Produces named bindings for raw-query execution
pub trait ParameterContextProvider: Send + Sync {
    /// Binds invocation arguments to names visible in a raw expression
    fn bind(&self, method: &MethodDescriptor, args: &[Value]) -> HashMap<String, Value>;
}

/// Default context provider: positional and declared-name bindings
///
/// Every argument is bound as `param0..paramN`; arguments whose parameter
/// declares a name are additionally bound under that name.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalContextProvider;

impl ParameterContextProvider for PositionalContextProvider {
    fn bind(&self, method: &MethodDescriptor, args: &[Value]) -> HashMap<String, Value> {
        let mut bindings = HashMap::with_capacity(args.len() * 2);
        for (index, value) in args.iter().enumerate() {
            bindings.insert(format!("param{index}"), value.clone());
            if let Some(parameter) = method.parameters().get(index) {
                bindings.insert(parameter.name.clone(), value.clone());
            }
        }
        bindings
    }
}

#[cfg(any(test, feature = "mock"))]
pub mod mock {
    //! In-memory store adapter for tests

    use std::collections::HashMap;

    use async_trait::async_trait;
    use tokio::sync::RwLock;

    use super::{Document, StoreOperations};
    use crate::error::StoreError;

    /// In-memory document store backed by nested hash maps
    ///
    /// Keyspace -> id -> document. Safe for concurrent use; intended for
    /// tests and local wiring only.
    #[derive(Debug, Default)]
    pub struct MockDocumentStore {
        documents: RwLock<HashMap<String, HashMap<String, Document>>>,
    }

    impl MockDocumentStore {
        /// Creates an empty store
        pub fn new() -> Self {
            Self::default()
        }

        /// Seeds a document without going through the port
        pub async fn seed(&self, keyspace: &str, id: &str, document: Document) {
            self.documents
                .write()
                .await
                .entry(keyspace.to_string())
                .or_default()
                .insert(id.to_string(), document);
        }

        /// Drops all stored documents
        pub async fn clear(&self) {
            self.documents.write().await.clear();
        }
    }

    #[async_trait]
    impl StoreOperations for MockDocumentStore {
        async fn get(&self, keyspace: &str, id: &str) -> Result<Option<Document>, StoreError> {
            Ok(self
                .documents
                .read()
                .await
                .get(keyspace)
                .and_then(|space| space.get(id))
                .cloned())
        }

        async fn put(
            &self,
            keyspace: &str,
            id: &str,
            document: &Document,
        ) -> Result<(), StoreError> {
            self.documents
                .write()
                .await
                .entry(keyspace.to_string())
                .or_default()
                .insert(id.to_string(), document.clone());
            Ok(())
        }

        async fn delete(&self, keyspace: &str, id: &str) -> Result<bool, StoreError> {
            Ok(self
                .documents
                .write()
                .await
                .get_mut(keyspace)
                .map(|space| space.remove(id).is_some())
                .unwrap_or(false))
        }

        async fn exists(&self, keyspace: &str, id: &str) -> Result<bool, StoreError> {
            Ok(self
                .documents
                .read()
                .await
                .get(keyspace)
                .map(|space| space.contains_key(id))
                .unwrap_or(false))
        }

        async fn count(&self, keyspace: &str) -> Result<u64, StoreError> {
            Ok(self
                .documents
                .read()
                .await
                .get(keyspace)
                .map(|space| space.len() as u64)
                .unwrap_or(0))
        }

        async fn list(&self, keyspace: &str) -> Result<Vec<Document>, StoreError> {
            Ok(self
                .documents
                .read()
                .await
                .get(keyspace)
                .map(|space| space.values().cloned().collect())
                .unwrap_or_default())
        }
    }
}
