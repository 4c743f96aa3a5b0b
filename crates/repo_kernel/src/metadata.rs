//! Entity metadata and the mapping context
//!
//! Entity metadata is the structural description a repository needs to store
//! and query a domain type: its keyspace in the document store, the field
//! holding its identity, and the searchable fields with their kinds.
//!
//! The [`MappingContext`] replaces a process-wide metadata singleton with an
//! explicitly shared object: it is populated once at bootstrap, wrapped in an
//! `Arc`, and threaded through every repository build. After bootstrap it is
//! read-only, so concurrent lookups need no coordination.
//!
//! # Usage
//!
//! ```rust
//! use repo_kernel::{EntityMetadata, FieldKind, MappingContext};
//!
//! let mut context = MappingContext::new();
//! context.register(
//!     EntityMetadata::builder("person")
//!         .keyspace("people")
//!         .field("name", FieldKind::String)
//!         .field("age", FieldKind::Integer)
//!         .build(),
//! );
//!
//! let metadata = context.get_required("person", "PersonRepository").unwrap();
//! assert_eq!(metadata.keyspace(), "people");
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// The kind of value a field or parameter holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Integer,
    Float,
    Boolean,
    Json,
}

/// A single named field on an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name as it appears in stored documents
    pub name: String,
    /// Kind of value the field holds
    pub kind: FieldKind,
}

impl FieldDescriptor {
    /// Creates a new field descriptor
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Structural metadata for a domain entity
///
/// Shared read-only after startup: the mapping context hands out
/// `Arc<EntityMetadata>` clones, and handlers keep them for the process
/// lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMetadata {
    entity_name: String,
    keyspace: String,
    id_field: FieldDescriptor,
    fields: Vec<FieldDescriptor>,
}

impl EntityMetadata {
    /// Starts building metadata for the named entity
    ///
    /// Defaults: the keyspace equals the entity name and the id field is a
    /// string field called `id`.
    pub fn builder(entity_name: impl Into<String>) -> EntityMetadataBuilder {
        EntityMetadataBuilder::new(entity_name)
    }

    /// The unique registration name of the entity
    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    /// The key prefix under which documents of this entity are stored
    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    /// The field holding the entity identity
    pub fn id_field(&self) -> &FieldDescriptor {
        &self.id_field
    }

    /// The declared non-id fields
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Looks up a field by name; the id field counts as a field
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        if self.id_field.name == name {
            return Some(&self.id_field);
        }
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns true if the entity declares the named field
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

/// Builder for [`EntityMetadata`]
#[derive(Debug)]
pub struct EntityMetadataBuilder {
    entity_name: String,
    keyspace: Option<String>,
    id_field: FieldDescriptor,
    fields: Vec<FieldDescriptor>,
}

impl EntityMetadataBuilder {
    fn new(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            keyspace: None,
            id_field: FieldDescriptor::new("id", FieldKind::String),
            fields: Vec::new(),
        }
    }

    /// Sets the keyspace (key prefix) for stored documents
    pub fn keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspace = Some(keyspace.into());
        self
    }

    /// Sets the identity field
    pub fn id_field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.id_field = FieldDescriptor::new(name, kind);
        self
    }

    /// Declares a field
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldDescriptor::new(name, kind));
        self
    }

    /// Finishes the build
    pub fn build(self) -> EntityMetadata {
        let keyspace = self.keyspace.unwrap_or_else(|| self.entity_name.clone());
        EntityMetadata {
            entity_name: self.entity_name,
            keyspace,
            id_field: self.id_field,
            fields: self.fields,
        }
    }
}

/// Registry of entity metadata, populated at bootstrap
///
/// Registration requires `&mut self`; afterwards the context is shared
/// immutably (typically as `Arc<MappingContext>`) and lookups are plain map
/// reads.
#[derive(Debug, Default)]
pub struct MappingContext {
    entities: HashMap<String, Arc<EntityMetadata>>,
}

impl MappingContext {
    /// Creates an empty mapping context
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers entity metadata, replacing any previous registration
    ///
    /// # Returns
    ///
    /// The shared handle under which the metadata is now registered
    pub fn register(&mut self, metadata: EntityMetadata) -> Arc<EntityMetadata> {
        let shared = Arc::new(metadata);
        self.entities
            .insert(shared.entity_name().to_string(), Arc::clone(&shared));
        shared
    }

    /// Registers entity metadata, consuming and returning the context
    ///
    /// Chaining variant of [`register`](Self::register) for bootstrap code.
    pub fn with_entity(mut self, metadata: EntityMetadata) -> Self {
        self.register(metadata);
        self
    }

    /// Looks up metadata for the named entity
    pub fn get(&self, entity: &str) -> Option<Arc<EntityMetadata>> {
        self.entities.get(entity).cloned()
    }

    /// Looks up metadata for the named entity, failing if none is registered
    ///
    /// # Arguments
    ///
    /// * `entity` - The registered entity name
    /// * `repository` - The repository requiring the metadata, named in the error
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::UnknownEntity` if the entity is not registered.
    pub fn get_required(
        &self,
        entity: &str,
        repository: &str,
    ) -> Result<Arc<EntityMetadata>, DispatchError> {
        self.get(entity)
            .ok_or_else(|| DispatchError::unknown_entity(entity, repository))
    }

    /// Returns true if the named entity is registered
    pub fn is_registered(&self, entity: &str) -> bool {
        self.entities.contains_key(entity)
    }

    /// Number of registered entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if no entities are registered
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> EntityMetadata {
        EntityMetadata::builder("person")
            .keyspace("people")
            .field("name", FieldKind::String)
            .field("age", FieldKind::Integer)
            .build()
    }

    #[test]
    fn test_builder_defaults() {
        let metadata = EntityMetadata::builder("order").build();
        assert_eq!(metadata.entity_name(), "order");
        assert_eq!(metadata.keyspace(), "order");
        assert_eq!(metadata.id_field().name, "id");
        assert_eq!(metadata.id_field().kind, FieldKind::String);
    }

    #[test]
    fn test_field_lookup_includes_id() {
        let metadata = person();
        assert!(metadata.has_field("id"));
        assert!(metadata.has_field("name"));
        assert!(!metadata.has_field("rank"));
        assert_eq!(metadata.field("age").unwrap().kind, FieldKind::Integer);
    }

    #[test]
    fn test_context_register_and_lookup() {
        let mut context = MappingContext::new();
        assert!(context.is_empty());
        context.register(person());

        assert!(context.is_registered("person"));
        let metadata = context.get_required("person", "PersonRepository").unwrap();
        assert_eq!(metadata.keyspace(), "people");
    }

    #[test]
    fn test_get_required_unknown_entity() {
        let context = MappingContext::new();
        let error = context
            .get_required("ghost", "GhostRepository")
            .unwrap_err();

        assert!(matches!(error, DispatchError::UnknownEntity { .. }));
        assert!(error.to_string().contains("ghost"));
        assert!(error.to_string().contains("GhostRepository"));
    }

    #[test]
    fn test_register_replaces_previous() {
        let mut context = MappingContext::new();
        context.register(person());
        context.register(EntityMetadata::builder("person").keyspace("p2").build());

        assert_eq!(context.len(), 1);
        assert_eq!(context.get("person").unwrap().keyspace(), "p2");
    }
}
