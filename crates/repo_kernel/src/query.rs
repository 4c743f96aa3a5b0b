//! Structured derived queries and the creator seam
//!
//! A [`DerivedQuery`] is the structured result of parsing a method name such
//! as `find_by_name_and_age`: a query form, a combinator, and one condition
//! per bound argument. Producing it is the job of a [`QueryCreator`], a
//! pluggable strategy chosen when the repository factory is constructed.
//! Executing it belongs to the search operations boundary; the dispatcher
//! never interprets conditions itself.

use serde::{Deserialize, Serialize};

use crate::error::CreatorError;
use crate::metadata::EntityMetadata;
use crate::method::MethodDescriptor;

/// What a derived query produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryForm {
    /// All matching documents
    FindMany,
    /// The number of matching documents
    Count,
    /// Whether any document matches
    Exists,
}

/// How conditions combine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combinator {
    #[default]
    And,
    Or,
}

/// Comparison applied by a single condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    Equals,
    GreaterThan,
    LessThan,
    Containing,
}

/// One field condition bound to a positional argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Entity field the condition applies to
    pub field: String,
    /// Comparison operator
    pub operator: ComparisonOperator,
    /// Index into the invocation argument list
    pub argument: usize,
}

impl Condition {
    /// Creates a condition binding `field` to the argument at `argument`
    pub fn new(field: impl Into<String>, operator: ComparisonOperator, argument: usize) -> Self {
        Self {
            field: field.into(),
            operator,
            argument,
        }
    }
}

/// A structured query derived from a method declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedQuery {
    /// What the query produces
    pub form: QueryForm,
    /// How the conditions combine
    pub combinator: Combinator,
    /// The field conditions, one per bound argument
    pub conditions: Vec<Condition>,
}

impl DerivedQuery {
    /// Creates a derived query
    pub fn new(form: QueryForm, combinator: Combinator, conditions: Vec<Condition>) -> Self {
        Self {
            form,
            combinator,
            conditions,
        }
    }

    /// Number of arguments the query binds
    pub fn bound_arguments(&self) -> usize {
        self.conditions.len()
    }
}

/// Strategy turning a declared method into a structured query
///
/// Chosen at factory construction time; the dispatcher passes it to derived
/// handler construction and otherwise treats it as opaque. Implementations
/// must reject method shapes they cannot parse so resolution fails at build
/// time rather than on first call.
pub trait QueryCreator: Send + Sync {
    /// Parses the method into a structured query
    ///
    /// # Errors
    ///
    /// Returns a `CreatorError` describing why the method shape is not
    /// derivable; the dispatcher surfaces it as an unresolvable-method
    /// build failure.
    fn create(
        &self,
        method: &MethodDescriptor,
        entity: &EntityMetadata,
    ) -> Result<DerivedQuery, CreatorError>;
}
