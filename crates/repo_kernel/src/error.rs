//! Error types used across the dispatcher
//!
//! Three families live here, matching the three phases of a repository's life:
//! `DispatchError` for resolution and construction failures (fatal at build
//! time), `QueryError` for invocation failures, and `StoreError` for failures
//! crossing the store/search boundary.

use thiserror::Error;

/// Fatal errors raised while resolving and constructing a repository
///
/// Every variant aborts the whole repository build: a partially resolved
/// registry is never handed out. Messages name the repository, the method,
/// and the missing capability so a misconfiguration is attributable from the
/// error alone.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The mapping context holds no metadata for the requested entity
    #[error("No entity metadata registered for '{entity}' (required by repository '{repository}')")]
    UnknownEntity { entity: String, repository: String },

    /// A declared method cannot be mapped to any handler kind
    #[error("Method '{method}' on repository '{repository}' cannot be resolved to a query handler: {reason}")]
    UnresolvableQueryMethod {
        repository: String,
        method: String,
        reason: String,
    },

    /// The configured handler type cannot be constructed from the dependency bundle
    #[error("Handler type '{handler_type}' has no construction path for the provided dependencies (missing: {missing})")]
    IncompatibleHandlerType {
        handler_type: String,
        missing: String,
    },

    /// The same method name was declared twice on one repository
    #[error("Method '{method}' is declared more than once on repository '{repository}'")]
    DuplicateMethod { repository: String, method: String },
}

impl DispatchError {
    /// Creates an UnknownEntity error
    pub fn unknown_entity(entity: impl Into<String>, repository: impl Into<String>) -> Self {
        DispatchError::UnknownEntity {
            entity: entity.into(),
            repository: repository.into(),
        }
    }

    /// Creates an UnresolvableQueryMethod error
    pub fn unresolvable(
        repository: impl Into<String>,
        method: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        DispatchError::UnresolvableQueryMethod {
            repository: repository.into(),
            method: method.into(),
            reason: reason.into(),
        }
    }

    /// Creates an IncompatibleHandlerType error
    pub fn incompatible(handler_type: impl Into<String>, missing: impl Into<String>) -> Self {
        DispatchError::IncompatibleHandlerType {
            handler_type: handler_type.into(),
            missing: missing.into(),
        }
    }

    /// Returns true if this error indicates an unresolvable method
    pub fn is_unresolvable(&self) -> bool {
        matches!(self, DispatchError::UnresolvableQueryMethod { .. })
    }

    /// Returns true if this error indicates a misconfigured handler type
    pub fn is_incompatible(&self) -> bool {
        matches!(self, DispatchError::IncompatibleHandlerType { .. })
    }
}

/// Errors raised while a derived-query creator parses a method
#[derive(Debug, Error)]
pub enum CreatorError {
    #[error("method name '{0}' does not describe a derivable query")]
    UnsupportedShape(String),

    #[error("unknown field '{field}' on entity '{entity}'")]
    UnknownField { field: String, entity: String },

    #[error("method '{method}' binds {expected} arguments but declares {actual} parameters")]
    ArityMismatch {
        method: String,
        expected: usize,
        actual: usize,
    },

    #[error("method name '{0}' mixes 'and' and 'or' combinators")]
    MixedCombinators(String),
}

/// Errors raised when invoking a method on a built repository handle
#[derive(Debug, Error)]
pub enum QueryError {
    /// The method name is not declared on the repository
    #[error("Repository '{repository}' declares no method '{method}'")]
    UnknownMethod { repository: String, method: String },

    /// The argument count does not match the declared parameter list
    #[error("Method '{method}' takes {expected} arguments but {actual} were given")]
    ArityMismatch {
        method: String,
        expected: usize,
        actual: usize,
    },

    /// An argument has the wrong shape for the operation
    #[error("Invalid argument for '{method}': {message}")]
    InvalidArgument { method: String, message: String },

    /// The underlying store or search operation failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl QueryError {
    /// Creates an UnknownMethod error
    pub fn unknown_method(repository: impl Into<String>, method: impl Into<String>) -> Self {
        QueryError::UnknownMethod {
            repository: repository.into(),
            method: method.into(),
        }
    }

    /// Creates an InvalidArgument error
    pub fn invalid_argument(method: impl Into<String>, message: impl Into<String>) -> Self {
        QueryError::InvalidArgument {
            method: method.into(),
            message: message.into(),
        }
    }
}

/// Errors crossing the store/search operations boundary
///
/// All adapters map their backend failures onto these variants so handler
/// code sees one error shape regardless of which store is wired in.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection to the backing store failed
    #[error("Failed to connect to store: {0}")]
    Connection(String),

    /// The operation timed out
    #[error("Store operation timed out: {0}")]
    Timeout(String),

    /// A document could not be serialized or deserialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The document was not found
    #[error("Document not found: {keyspace}:{id}")]
    NotFound { keyspace: String, id: String },

    /// Any other backend failure
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Creates a NotFound error
    pub fn not_found(keyspace: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            keyspace: keyspace.into(),
            id: id.into(),
        }
    }

    /// Creates a Serialization error
    pub fn serialization(message: impl std::fmt::Display) -> Self {
        StoreError::Serialization(message.to_string())
    }

    /// Returns true if this error indicates the document was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Returns true if this error indicates a transient failure that may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Connection(_) | StoreError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_error_messages_name_the_offender() {
        let error = DispatchError::unresolvable("PersonRepository", "find_by_rank", "unknown field");
        let message = error.to_string();
        assert!(message.contains("PersonRepository"));
        assert!(message.contains("find_by_rank"));
        assert!(error.is_unresolvable());
    }

    #[test]
    fn test_incompatible_handler_names_the_type() {
        let error = DispatchError::incompatible("my_crate::SearchOnlyFactory", "SearchOperations");
        assert!(error.to_string().contains("my_crate::SearchOnlyFactory"));
        assert!(error.to_string().contains("SearchOperations"));
        assert!(error.is_incompatible());
    }

    #[test]
    fn test_store_error_transient() {
        assert!(StoreError::Connection("refused".into()).is_transient());
        assert!(StoreError::Timeout("get".into()).is_transient());
        assert!(!StoreError::not_found("person", "p1").is_transient());
        assert!(StoreError::not_found("person", "p1").is_not_found());
    }
}
