//! Handler instantiation
//!
//! Where the dispatch decision becomes a live object. Instead of probing a
//! configured type for a compatible constructor at runtime, each handler kind
//! has an explicit construction path selected by tagged-variant dispatch, and
//! custom handler types plug in through the [`CustomQueryFactory`] trait.
//!
//! A factory declares the dependencies its construction path requires; when
//! the bundle offered by the repository factory cannot satisfy them, the
//! build fails with an error naming the factory type and the missing
//! dependency. Instantiation never performs I/O: store and search calls
//! happen lazily inside `execute`.

use std::fmt;
use std::sync::Arc;

use repo_kernel::{
    DispatchError, EntityMetadata, MethodDescriptor, ParameterContextProvider, QueryCreator,
    SearchOperations, StoreOperations,
};

use crate::handlers::{CrudHandler, DerivedQueryHandler, QueryHandler, RawQueryHandler};
use crate::selector::HandlerKind;

/// A dependency a handler construction path may require
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    MethodDescriptor,
    EntityMetadata,
    ParameterContext,
    StoreOperations,
    SearchOperations,
    QueryCreator,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DependencyKind::MethodDescriptor => "MethodDescriptor",
            DependencyKind::EntityMetadata => "EntityMetadata",
            DependencyKind::ParameterContext => "ParameterContext",
            DependencyKind::StoreOperations => "StoreOperations",
            DependencyKind::SearchOperations => "SearchOperations",
            DependencyKind::QueryCreator => "QueryCreator",
        };
        f.write_str(name)
    }
}

/// The dependency bundle offered to every handler construction path
///
/// Descriptor, entity metadata, store, context provider, and creator are
/// always present; search operations are optional on the repository factory
/// and therefore optional here.
pub struct HandlerDependencies {
    /// Name of the repository being built
    pub repository: String,
    /// The declared method the handler will back
    pub descriptor: MethodDescriptor,
    /// Metadata of the entity the repository manages
    pub entity: Arc<EntityMetadata>,
    /// Binding provider for raw-query execution
    pub context_provider: Arc<dyn ParameterContextProvider>,
    /// Store operations port
    pub store: Arc<dyn StoreOperations>,
    /// Search operations port, if one was configured
    pub search: Option<Arc<dyn SearchOperations>>,
    /// The configured derived-query creator
    pub creator: Arc<dyn QueryCreator>,
}

impl HandlerDependencies {
    /// Returns true if the bundle can satisfy the given dependency
    pub fn satisfies(&self, dependency: DependencyKind) -> bool {
        match dependency {
            DependencyKind::SearchOperations => self.search.is_some(),
            _ => true,
        }
    }

    /// The subset of `required` the bundle cannot satisfy
    pub fn missing(&self, required: &[DependencyKind]) -> Vec<DependencyKind> {
        required
            .iter()
            .copied()
            .filter(|dependency| !self.satisfies(*dependency))
            .collect()
    }

    fn require_search(
        &self,
        handler_type: &str,
    ) -> Result<Arc<dyn SearchOperations>, DispatchError> {
        self.search.clone().ok_or_else(|| {
            DispatchError::incompatible(handler_type, DependencyKind::SearchOperations.to_string())
        })
    }
}

/// Extension point for hand-authored query handler types
///
/// Configured on the repository factory; once configured, every non-CRUD
/// method is built through it. `required_dependencies` is the declared
/// construction-path shape: the instantiator checks it against the offered
/// bundle before calling `build`, so a misconfigured factory fails the build
/// with an attributable error instead of surprising the first caller.
pub trait CustomQueryFactory: Send + Sync {
    /// Concrete type name, used in configuration errors
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Dependencies the factory's construction path requires
    fn required_dependencies(&self) -> &'static [DependencyKind] {
        &[]
    }

    /// Builds the handler from the dependency bundle
    fn build(&self, dependencies: &HandlerDependencies)
        -> Result<Arc<dyn QueryHandler>, DispatchError>;
}

/// Constructs handlers by kind
///
/// One construction path per handler kind; the custom path goes through the
/// configured factory when present, falling back to the built-in raw-query
/// handler for methods carrying a query payload.
pub struct HandlerInstantiator {
    custom_factory: Option<Arc<dyn CustomQueryFactory>>,
}

impl HandlerInstantiator {
    /// Creates an instantiator
    pub fn new(custom_factory: Option<Arc<dyn CustomQueryFactory>>) -> Self {
        Self { custom_factory }
    }

    /// Constructs the handler for the selected kind
    ///
    /// # Errors
    ///
    /// - `IncompatibleHandlerType` when the construction path cannot be
    ///   satisfied by the bundle (missing search port, factory requirements)
    /// - `UnresolvableQueryMethod` when a derived method's name cannot be
    ///   parsed by the configured creator
    pub fn instantiate(
        &self,
        kind: HandlerKind,
        dependencies: HandlerDependencies,
    ) -> Result<Arc<dyn QueryHandler>, DispatchError> {
        match kind {
            HandlerKind::Crud(operation) => Ok(Arc::new(CrudHandler::new(
                operation,
                dependencies.descriptor.name(),
                Arc::clone(&dependencies.entity),
                Arc::clone(&dependencies.store),
            ))),
            HandlerKind::Custom => self.instantiate_custom(dependencies),
            HandlerKind::Derived => {
                let search =
                    dependencies.require_search(std::any::type_name::<DerivedQueryHandler>())?;
                let query = dependencies
                    .creator
                    .create(&dependencies.descriptor, &dependencies.entity)
                    .map_err(|source| {
                        DispatchError::unresolvable(
                            &dependencies.repository,
                            dependencies.descriptor.name(),
                            source.to_string(),
                        )
                    })?;
                Ok(Arc::new(DerivedQueryHandler::new(
                    query,
                    Arc::clone(&dependencies.entity),
                    search,
                )))
            }
        }
    }

    fn instantiate_custom(
        &self,
        dependencies: HandlerDependencies,
    ) -> Result<Arc<dyn QueryHandler>, DispatchError> {
        if let Some(factory) = &self.custom_factory {
            let missing = dependencies.missing(factory.required_dependencies());
            if !missing.is_empty() {
                let missing = missing
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(DispatchError::incompatible(factory.type_name(), missing));
            }
            return factory.build(&dependencies);
        }

        let Some(raw) = dependencies.descriptor.query().cloned() else {
            // Reachable only if selection and configuration disagree.
            return Err(DispatchError::unresolvable(
                &dependencies.repository,
                dependencies.descriptor.name(),
                "method carries no query payload and no custom query factory is configured",
            ));
        };
        let search = dependencies.require_search(std::any::type_name::<RawQueryHandler>())?;
        Ok(Arc::new(RawQueryHandler::new(
            dependencies.descriptor.clone(),
            raw.expression,
            Arc::clone(&dependencies.entity),
            search,
            Arc::clone(&dependencies.context_provider),
        )))
    }
}
