//! Repository Kernel - Foundational types for the repository dispatcher
//!
//! This crate provides the building blocks shared by the dispatch machinery
//! and the store adapters:
//! - Entity metadata and the mapping context that owns it
//! - Method descriptors capturing declared repository methods
//! - The structured derived-query model and the query-creator seam
//! - Boundary port traits for store and search operations

pub mod error;
pub mod metadata;
pub mod method;
pub mod ports;
pub mod query;

pub use error::{CreatorError, DispatchError, QueryError, StoreError};
pub use metadata::{EntityMetadata, EntityMetadataBuilder, FieldDescriptor, FieldKind, MappingContext};
pub use method::{MethodDescriptor, ParameterDescriptor, RawQuery, ReturnHint};
pub use ports::{
    Document, ParameterContextProvider, PositionalContextProvider, SearchOperations,
    StoreOperations,
};
pub use query::{Combinator, ComparisonOperator, Condition, DerivedQuery, QueryCreator, QueryForm};
