//! Pre-built test data for common entities

use std::sync::Arc;

use serde_json::{json, Value};

use repo_kernel::{EntityMetadata, FieldKind, MappingContext};

/// Metadata for the `person` test entity
pub fn person_metadata() -> EntityMetadata {
    EntityMetadata::builder("person")
        .keyspace("people")
        .field("name", FieldKind::String)
        .field("age", FieldKind::Integer)
        .field("email", FieldKind::String)
        .field("active", FieldKind::Boolean)
        .build()
}

/// Metadata for the `order` test entity
pub fn order_metadata() -> EntityMetadata {
    EntityMetadata::builder("order")
        .keyspace("orders")
        .id_field("order_id", FieldKind::String)
        .field("total", FieldKind::Float)
        .field("status", FieldKind::String)
        .build()
}

/// A mapping context with both test entities registered
pub fn mapping_context() -> Arc<MappingContext> {
    Arc::new(
        MappingContext::new()
            .with_entity(person_metadata())
            .with_entity(order_metadata()),
    )
}

/// A person document with the given identity fields
pub fn person_document(id: &str, name: &str, age: u64) -> Value {
    json!({
        "id": id,
        "name": name,
        "age": age,
        "email": format!("{id}@example.com"),
        "active": true,
    })
}
