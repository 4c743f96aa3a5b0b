//! Query strategy selection
//!
//! Given a declared method, the selector decides which execution strategy
//! backs it. The ordering is part of the contract:
//!
//! 1. Methods matching a fixed CRUD primitive signature are wired straight
//!    to the store.
//! 2. If a custom query factory is configured, every remaining method goes
//!    through it - the override wins over name parsing, so integrators can
//!    hand-author query logic for methods that would otherwise be misparsed.
//! 3. A method carrying a raw query payload uses the built-in raw handler.
//! 4. Everything else is a derived query, and the configured creator must
//!    accept its name shape when the handler is constructed.

use std::fmt;

use repo_kernel::MethodDescriptor;

/// The fixed CRUD primitives every repository can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrudOperation {
    FindById,
    FindAll,
    Save,
    DeleteById,
    Count,
    ExistsById,
}

impl CrudOperation {
    /// All primitives, in declaration order
    pub fn all() -> [CrudOperation; 6] {
        [
            CrudOperation::FindById,
            CrudOperation::FindAll,
            CrudOperation::Save,
            CrudOperation::DeleteById,
            CrudOperation::Count,
            CrudOperation::ExistsById,
        ]
    }

    /// The method name of this primitive
    pub fn method_name(&self) -> &'static str {
        match self {
            CrudOperation::FindById => "find_by_id",
            CrudOperation::FindAll => "find_all",
            CrudOperation::Save => "save",
            CrudOperation::DeleteById => "delete_by_id",
            CrudOperation::Count => "count",
            CrudOperation::ExistsById => "exists_by_id",
        }
    }

    /// Number of arguments the primitive takes
    pub fn arity(&self) -> usize {
        match self {
            CrudOperation::FindAll | CrudOperation::Count => 0,
            _ => 1,
        }
    }

    /// Matches a method signature against the primitive table
    ///
    /// Both the name and the arity must match; `find_by_id` declared with two
    /// parameters is not a CRUD primitive and falls through to query
    /// resolution.
    pub fn from_signature(name: &str, arity: usize) -> Option<CrudOperation> {
        CrudOperation::all()
            .into_iter()
            .find(|op| op.method_name() == name && op.arity() == arity)
    }
}

/// The execution strategy bound to a repository method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    /// A fixed CRUD primitive, wired straight to the store
    Crud(CrudOperation),
    /// A custom query: configured factory override or raw query payload
    Custom,
    /// A query derived from the method name by the configured creator
    Derived,
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerKind::Crud(op) => write!(f, "crud({})", op.method_name()),
            HandlerKind::Custom => write!(f, "custom"),
            HandlerKind::Derived => write!(f, "derived"),
        }
    }
}

/// Decides the handler kind for each declared method
#[derive(Debug, Clone, Copy)]
pub struct QueryStrategySelector {
    custom_override: bool,
}

impl QueryStrategySelector {
    /// Creates a selector
    ///
    /// # Arguments
    ///
    /// * `custom_override` - Whether a custom query factory is configured;
    ///   when true, every non-CRUD method resolves to `Custom`.
    pub fn new(custom_override: bool) -> Self {
        Self { custom_override }
    }

    /// Selects the handler kind for a declared method
    ///
    /// Selection always lands on a kind; whether the kind can actually be
    /// constructed (a parseable name, a compatible factory) is checked by the
    /// instantiator, so the whole decision still fails at build time.
    pub fn select(&self, method: &MethodDescriptor) -> HandlerKind {
        if let Some(operation) = CrudOperation::from_signature(method.name(), method.arity()) {
            return HandlerKind::Crud(operation);
        }
        if self.custom_override || method.query().is_some() {
            return HandlerKind::Custom;
        }
        HandlerKind::Derived
    }
}
