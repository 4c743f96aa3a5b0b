//! In-memory search adapter
//!
//! Implements the search operations port by filtering the documents of a
//! shared [`MockDocumentStore`], so derived and raw queries are exercisable
//! end-to-end without a search backend.
//!
//! Raw expressions use a deliberately tiny test-only convention: whitespace
//! separated `field=$binding` tokens, implicitly ANDed. The production
//! expression syntax is a contract between the query author and the real
//! adapter; this one exists so tests can assert binding behavior.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use repo_kernel::ports::mock::MockDocumentStore;
use repo_kernel::{
    Combinator, ComparisonOperator, Condition, DerivedQuery, Document, SearchOperations,
    StoreError, StoreOperations,
};

/// Search port over the mock store's documents
pub struct InMemorySearch {
    store: Arc<MockDocumentStore>,
}

impl InMemorySearch {
    /// Creates a search adapter sharing the given store
    pub fn new(store: Arc<MockDocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SearchOperations for InMemorySearch {
    async fn search(
        &self,
        keyspace: &str,
        query: &DerivedQuery,
        args: &[Value],
    ) -> Result<Vec<Document>, StoreError> {
        let documents = self.store.list(keyspace).await?;
        Ok(documents
            .into_iter()
            .filter(|document| matches_query(document, query, args))
            .collect())
    }

    async fn search_raw(
        &self,
        keyspace: &str,
        expression: &str,
        bindings: &HashMap<String, Value>,
    ) -> Result<Vec<Document>, StoreError> {
        let mut conditions = Vec::new();
        for token in expression.split_whitespace() {
            let (field, binding) = token.split_once("=$").ok_or_else(|| {
                StoreError::Backend(format!("malformed expression token '{token}'"))
            })?;
            let value = bindings.get(binding).ok_or_else(|| {
                StoreError::Backend(format!("unknown binding '{binding}' in expression"))
            })?;
            conditions.push((field.to_string(), value.clone()));
        }

        let documents = self.store.list(keyspace).await?;
        Ok(documents
            .into_iter()
            .filter(|document| {
                conditions
                    .iter()
                    .all(|(field, value)| document.get(field) == Some(value))
            })
            .collect())
    }
}

fn matches_query(document: &Document, query: &DerivedQuery, args: &[Value]) -> bool {
    let mut conditions = query
        .conditions
        .iter()
        .map(|condition| matches_condition(document, condition, args));
    match query.combinator {
        Combinator::And => conditions.all(|matched| matched),
        Combinator::Or => conditions.any(|matched| matched),
    }
}

fn matches_condition(document: &Document, condition: &Condition, args: &[Value]) -> bool {
    let Some(actual) = document.get(&condition.field) else {
        return false;
    };
    let Some(expected) = args.get(condition.argument) else {
        return false;
    };
    match condition.operator {
        ComparisonOperator::Equals => actual == expected,
        ComparisonOperator::GreaterThan => compare(actual, expected) == Some(Ordering::Greater),
        ComparisonOperator::LessThan => compare(actual, expected) == Some(Ordering::Less),
        ComparisonOperator::Containing => match (actual, expected) {
            (Value::String(haystack), Value::String(needle)) => haystack.contains(needle.as_str()),
            (Value::Array(items), needle) => items.contains(needle),
            _ => false,
        },
    }
}

fn compare(actual: &Value, expected: &Value) -> Option<Ordering> {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::person_document;
    use repo_kernel::QueryForm;
    use serde_json::json;

    async fn seeded_search() -> InMemorySearch {
        let store = Arc::new(MockDocumentStore::new());
        store
            .seed("people", "p1", person_document("p1", "Ada", 36))
            .await;
        store
            .seed("people", "p2", person_document("p2", "Grace", 45))
            .await;
        InMemorySearch::new(store)
    }

    #[tokio::test]
    async fn test_equality_and_combinator() {
        let search = seeded_search().await;
        let query = DerivedQuery::new(
            QueryForm::FindMany,
            Combinator::And,
            vec![
                Condition::new("name", ComparisonOperator::Equals, 0),
                Condition::new("age", ComparisonOperator::Equals, 1),
            ],
        );

        let matched = search
            .search("people", &query, &[json!("Ada"), json!(36)])
            .await
            .unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0]["id"], "p1");

        let none = search
            .search("people", &query, &[json!("Ada"), json!(45)])
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_or_combinator_and_ordering_operators() {
        let search = seeded_search().await;
        let query = DerivedQuery::new(
            QueryForm::FindMany,
            Combinator::Or,
            vec![
                Condition::new("age", ComparisonOperator::GreaterThan, 0),
                Condition::new("name", ComparisonOperator::Containing, 1),
            ],
        );

        let matched = search
            .search("people", &query, &[json!(40), json!("da")])
            .await
            .unwrap();
        assert_eq!(matched.len(), 2);
    }

    #[tokio::test]
    async fn test_raw_expression_binding() {
        let search = seeded_search().await;
        let bindings = HashMap::from([("who".to_string(), json!("Grace"))]);

        let matched = search
            .search_raw("people", "name=$who", &bindings)
            .await
            .unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0]["id"], "p2");
    }

    #[tokio::test]
    async fn test_raw_expression_unknown_binding_fails() {
        let search = seeded_search().await;
        let error = search
            .search_raw("people", "name=$ghost", &HashMap::new())
            .await
            .unwrap_err();
        assert!(error.to_string().contains("ghost"));
    }
}
