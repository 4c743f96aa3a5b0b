//! Handler registry
//!
//! The registry maps each declared method name to its constructed handler.
//! It is assembled during the repository build and read-only afterwards, so
//! concurrent dispatch needs no locking.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use repo_kernel::{DispatchError, MethodDescriptor};

use crate::handlers::QueryHandler;
use crate::selector::HandlerKind;

/// One resolved method: its kind, descriptor, and constructed handler
pub struct RegisteredHandler {
    kind: HandlerKind,
    descriptor: MethodDescriptor,
    handler: Arc<dyn QueryHandler>,
}

impl RegisteredHandler {
    /// Creates a registry entry
    pub fn new(
        kind: HandlerKind,
        descriptor: MethodDescriptor,
        handler: Arc<dyn QueryHandler>,
    ) -> Self {
        Self {
            kind,
            descriptor,
            handler,
        }
    }

    /// The resolved handler kind
    pub fn kind(&self) -> HandlerKind {
        self.kind
    }

    /// The declared method backing this entry
    pub fn descriptor(&self) -> &MethodDescriptor {
        &self.descriptor
    }

    /// The constructed handler
    pub fn handler(&self) -> &Arc<dyn QueryHandler> {
        &self.handler
    }
}

impl fmt::Debug for RegisteredHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredHandler")
            .field("method", &self.descriptor.name())
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Method-name-keyed map of constructed handlers
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, RegisteredHandler>,
}

impl HandlerRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, rejecting duplicate method names
    pub(crate) fn insert(&mut self, entry: RegisteredHandler) -> Result<(), DispatchError> {
        let method = entry.descriptor().name().to_string();
        if self.handlers.contains_key(&method) {
            return Err(DispatchError::DuplicateMethod {
                repository: entry.descriptor().declared_on().to_string(),
                method,
            });
        }
        self.handlers.insert(method, entry);
        Ok(())
    }

    /// Looks up the entry for a method name
    pub fn get(&self, method: &str) -> Option<&RegisteredHandler> {
        self.handlers.get(method)
    }

    /// The resolved kind for a method name
    pub fn kind_of(&self, method: &str) -> Option<HandlerKind> {
        self.handlers.get(method).map(RegisteredHandler::kind)
    }

    /// Iterates the registered method names
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Number of registered methods
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.handlers.iter().map(|(name, entry)| (name, entry.kind())))
            .finish()
    }
}
