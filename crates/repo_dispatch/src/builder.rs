//! Repository definition, factory, and handle
//!
//! The factory is configured once with the shared mapping context, the store
//! port, and the optional search port, creator, context provider, and custom
//! query factory. Each [`RepositoryDefinition`] is then built into a
//! [`RepositoryHandle`]: entity metadata is resolved, every declared method
//! is selected and instantiated, and the resulting registry is frozen.
//!
//! Building is all-or-nothing. The first method that fails resolution or
//! instantiation aborts the build and nothing partial escapes, so a
//! misdeclared method is a bootstrap error rather than a runtime surprise.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use repo_kernel::{
    DispatchError, EntityMetadata, FieldKind, MappingContext, MethodDescriptor,
    ParameterContextProvider, PositionalContextProvider, QueryCreator, QueryError, ReturnHint,
    SearchOperations, StoreOperations,
};

use crate::creator::MethodNameQueryCreator;
use crate::instantiate::{CustomQueryFactory, HandlerDependencies, HandlerInstantiator};
use crate::registry::{HandlerRegistry, RegisteredHandler};
use crate::selector::{CrudOperation, HandlerKind, QueryStrategySelector};

/// The declared shape of one repository
///
/// A name, the entity it manages, and the method set. Descriptors are
/// stamped with the repository name as they are captured.
#[derive(Debug, Clone)]
pub struct RepositoryDefinition {
    name: String,
    entity: String,
    methods: Vec<MethodDescriptor>,
}

impl RepositoryDefinition {
    /// Starts a definition for the named repository over the named entity
    pub fn new(name: impl Into<String>, entity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity: entity.into(),
            methods: Vec::new(),
        }
    }

    /// Declares the six base CRUD primitives
    ///
    /// The equivalent of inheriting a base repository interface: find-by-id,
    /// find-all, save, delete-by-id, count, and exists-by-id.
    pub fn with_crud(self) -> Self {
        self.method(
            MethodDescriptor::new(CrudOperation::FindById.method_name())
                .param("id", FieldKind::String)
                .returns(ReturnHint::OptionalEntity),
        )
        .method(MethodDescriptor::new(CrudOperation::FindAll.method_name()).returns(ReturnHint::Many))
        .method(
            MethodDescriptor::new(CrudOperation::Save.method_name())
                .param("entity", FieldKind::Json)
                .returns(ReturnHint::Entity),
        )
        .method(
            MethodDescriptor::new(CrudOperation::DeleteById.method_name())
                .param("id", FieldKind::String)
                .returns(ReturnHint::Bool),
        )
        .method(MethodDescriptor::new(CrudOperation::Count.method_name()).returns(ReturnHint::Count))
        .method(
            MethodDescriptor::new(CrudOperation::ExistsById.method_name())
                .param("id", FieldKind::String)
                .returns(ReturnHint::Bool),
        )
    }

    /// Declares a method
    pub fn method(mut self, descriptor: MethodDescriptor) -> Self {
        let descriptor = descriptor.declared_by(&self.name);
        self.methods.push(descriptor);
        self
    }

    /// The repository name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The managed entity name
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// The declared methods
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }
}

/// Builds repository handles from definitions
///
/// Holds the shared collaborators; `build` may be called for any number of
/// definitions, and building the same definition twice yields a handle with
/// the same method-to-kind mapping.
pub struct RepositoryFactory {
    context: Arc<MappingContext>,
    store: Arc<dyn StoreOperations>,
    search: Option<Arc<dyn SearchOperations>>,
    creator: Arc<dyn QueryCreator>,
    context_provider: Arc<dyn ParameterContextProvider>,
    custom_factory: Option<Arc<dyn CustomQueryFactory>>,
}

impl RepositoryFactory {
    /// Creates a factory over the given mapping context and store
    ///
    /// Defaults: no search port, the method-name query creator, the
    /// positional context provider, and no custom query factory.
    pub fn new(context: Arc<MappingContext>, store: Arc<dyn StoreOperations>) -> Self {
        Self {
            context,
            store,
            search: None,
            creator: Arc::new(MethodNameQueryCreator::new()),
            context_provider: Arc::new(PositionalContextProvider),
            custom_factory: None,
        }
    }

    /// Configures the search operations port
    pub fn with_search(mut self, search: Arc<dyn SearchOperations>) -> Self {
        self.search = Some(search);
        self
    }

    /// Replaces the derived-query creator
    pub fn with_query_creator(mut self, creator: Arc<dyn QueryCreator>) -> Self {
        self.creator = creator;
        self
    }

    /// Replaces the parameter context provider
    pub fn with_context_provider(mut self, provider: Arc<dyn ParameterContextProvider>) -> Self {
        self.context_provider = provider;
        self
    }

    /// Configures a custom query factory override
    ///
    /// Once configured, every non-CRUD method is constructed through the
    /// factory instead of derived-name parsing.
    pub fn with_custom_factory(mut self, factory: Arc<dyn CustomQueryFactory>) -> Self {
        self.custom_factory = Some(factory);
        self
    }

    /// Builds a dispatchable handle for the definition
    ///
    /// # Errors
    ///
    /// Fails atomically with a `DispatchError` if the entity is unknown, any
    /// method is unresolvable, a handler type is incompatible with the
    /// available dependencies, or a method name is declared twice.
    pub fn build(&self, definition: &RepositoryDefinition) -> Result<RepositoryHandle, DispatchError> {
        let entity = self
            .context
            .get_required(definition.entity(), definition.name())?;

        let selector = QueryStrategySelector::new(self.custom_factory.is_some());
        let instantiator = HandlerInstantiator::new(self.custom_factory.clone());

        let mut registry = HandlerRegistry::new();
        for descriptor in definition.methods() {
            let kind = selector.select(descriptor);
            debug!(
                repository = definition.name(),
                method = descriptor.name(),
                kind = %kind,
                "resolved query method"
            );

            let handler = instantiator.instantiate(
                kind,
                HandlerDependencies {
                    repository: definition.name().to_string(),
                    descriptor: descriptor.clone(),
                    entity: Arc::clone(&entity),
                    context_provider: Arc::clone(&self.context_provider),
                    store: Arc::clone(&self.store),
                    search: self.search.clone(),
                    creator: Arc::clone(&self.creator),
                },
            )?;
            registry.insert(RegisteredHandler::new(kind, descriptor.clone(), handler))?;
        }

        info!(
            repository = definition.name(),
            entity = entity.entity_name(),
            methods = registry.len(),
            "built repository handle"
        );

        Ok(RepositoryHandle {
            name: definition.name().to_string(),
            entity,
            registry: Arc::new(registry),
        })
    }
}

/// A live repository: the dispatcher backing one declared interface
///
/// Cheap to clone; clones share the frozen registry. Invocation is safe from
/// any number of tasks concurrently.
#[derive(Debug, Clone)]
pub struct RepositoryHandle {
    name: String,
    entity: Arc<EntityMetadata>,
    registry: Arc<HandlerRegistry>,
}

impl RepositoryHandle {
    /// The repository name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Metadata of the managed entity
    pub fn entity(&self) -> &EntityMetadata {
        &self.entity
    }

    /// The declared method names
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.registry.methods()
    }

    /// The resolved handler kind for a method, if declared
    pub fn handler_kind(&self, method: &str) -> Option<HandlerKind> {
        self.registry.kind_of(method)
    }

    /// Invokes a declared method
    ///
    /// # Errors
    ///
    /// - `QueryError::UnknownMethod` for names not declared on the repository
    /// - `QueryError::ArityMismatch` when the argument count is wrong
    /// - handler execution errors otherwise
    pub async fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, QueryError> {
        let entry = self
            .registry
            .get(method)
            .ok_or_else(|| QueryError::unknown_method(&self.name, method))?;

        let expected = entry.descriptor().arity();
        if args.len() != expected {
            return Err(QueryError::ArityMismatch {
                method: method.to_string(),
                expected,
                actual: args.len(),
            });
        }

        entry.handler().execute(args).await
    }
}
