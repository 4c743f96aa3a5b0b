//! Test Data Builders
//!
//! Builder patterns for constructing test documents with sensible defaults,
//! so tests spell out only the fields they care about.

use serde_json::{json, Value};

/// Builder for person test documents
pub struct PersonDocumentBuilder {
    id: String,
    name: String,
    age: u64,
    email: Option<String>,
    active: bool,
}

impl Default for PersonDocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonDocumentBuilder {
    /// Creates a builder with default values
    pub fn new() -> Self {
        Self {
            id: "p1".to_string(),
            name: "Ada Lovelace".to_string(),
            age: 36,
            email: None,
            active: true,
        }
    }

    /// Sets the document id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the name field
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the age field
    pub fn with_age(mut self, age: u64) -> Self {
        self.age = age;
        self
    }

    /// Sets the email field
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the active flag
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Builds the document
    pub fn build(self) -> Value {
        let email = self
            .email
            .unwrap_or_else(|| format!("{}@example.com", self.id));
        json!({
            "id": self.id,
            "name": self.name,
            "age": self.age,
            "email": email,
            "active": self.active,
        })
    }
}
