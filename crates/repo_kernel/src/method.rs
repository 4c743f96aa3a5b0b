//! Repository method descriptors
//!
//! A [`MethodDescriptor`] captures one declared repository method: its name,
//! parameter list, return shape, declaring repository, and the optional
//! hand-written query payload. Descriptors are immutable once captured by a
//! repository definition; resolution and dispatch work from this record alone.

use serde::{Deserialize, Serialize};

use crate::metadata::FieldKind;

/// A declared method parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Parameter name, used for named bindings in raw queries
    pub name: String,
    /// Kind hint for the bound value
    pub kind: FieldKind,
}

impl ParameterDescriptor {
    /// Creates a new parameter descriptor
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// The shape of value a method returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnHint {
    /// Exactly one document
    Entity,
    /// One document or null
    OptionalEntity,
    /// A list of documents
    Many,
    /// A numeric count
    Count,
    /// A boolean
    Bool,
    /// Nothing meaningful
    Unit,
}

/// A hand-written query expression attached to a method
///
/// The expression is opaque to the dispatcher; it is handed to the search
/// operations boundary verbatim, with parameter bindings resolved by the
/// configured context provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawQuery {
    pub expression: String,
}

impl RawQuery {
    /// Creates a raw query payload
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
        }
    }
}

/// One declared repository method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    name: String,
    parameters: Vec<ParameterDescriptor>,
    returns: ReturnHint,
    declared_on: String,
    query: Option<RawQuery>,
}

impl MethodDescriptor {
    /// Creates a descriptor for the named method
    ///
    /// Defaults: no parameters, a [`ReturnHint::Many`] return shape, and no
    /// raw query payload. The declaring repository is stamped when the
    /// descriptor is added to a definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            returns: ReturnHint::Many,
            declared_on: String::new(),
            query: None,
        }
    }

    /// Appends a declared parameter
    pub fn param(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.parameters.push(ParameterDescriptor::new(name, kind));
        self
    }

    /// Sets the return shape
    pub fn returns(mut self, returns: ReturnHint) -> Self {
        self.returns = returns;
        self
    }

    /// Attaches a hand-written query expression
    pub fn raw_query(mut self, expression: impl Into<String>) -> Self {
        self.query = Some(RawQuery::new(expression));
        self
    }

    /// Stamps the declaring repository name
    ///
    /// Called by the repository definition when the method is captured.
    pub fn declared_by(mut self, repository: impl Into<String>) -> Self {
        self.declared_on = repository.into();
        self
    }

    /// The method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared parameters
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    /// Number of declared parameters
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// The declared return shape
    pub fn return_hint(&self) -> ReturnHint {
        self.returns
    }

    /// The declaring repository name, empty until captured
    pub fn declared_on(&self) -> &str {
        &self.declared_on
    }

    /// The raw query payload, if one is attached
    pub fn query(&self) -> Option<&RawQuery> {
        self.query.as_ref()
    }
}
