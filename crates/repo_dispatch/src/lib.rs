//! Repository Method Dispatcher
//!
//! This crate turns a declared repository definition into a live, dispatchable
//! handle backed by a document store. Resolution happens once, at bootstrap:
//!
//! 1. The [`selector::QueryStrategySelector`] decides, per declared method,
//!    whether it is a CRUD primitive, a custom query, or a derived query.
//! 2. The [`instantiate::HandlerInstantiator`] constructs the matching
//!    [`handlers::QueryHandler`] from an explicit dependency bundle.
//! 3. The [`builder::RepositoryFactory`] assembles the handlers into a
//!    [`registry::HandlerRegistry`] and wraps it in a
//!    [`builder::RepositoryHandle`].
//!
//! Construction is atomic: if any declared method fails to resolve, the whole
//! repository build fails and nothing partial is handed out. Configuration
//! bugs therefore surface at startup, not on first use.
//!
//! # Usage
//!
//! ```rust,ignore
//! use repo_dispatch::{RepositoryDefinition, RepositoryFactory};
//!
//! let factory = RepositoryFactory::new(context, store).with_search(search);
//! let people = factory.build(
//!     &RepositoryDefinition::new("PersonRepository", "person")
//!         .with_crud()
//!         .method(MethodDescriptor::new("find_by_name").param("name", FieldKind::String)),
//! )?;
//!
//! let ada = people.invoke("find_by_name", &[json!("Ada")]).await?;
//! ```

pub mod builder;
pub mod creator;
pub mod handlers;
pub mod instantiate;
pub mod registry;
pub mod selector;

pub use builder::{RepositoryDefinition, RepositoryFactory, RepositoryHandle};
pub use creator::MethodNameQueryCreator;
pub use handlers::{CrudHandler, DerivedQueryHandler, QueryHandler, RawQueryHandler};
pub use instantiate::{CustomQueryFactory, DependencyKind, HandlerDependencies, HandlerInstantiator};
pub use registry::{HandlerRegistry, RegisteredHandler};
pub use selector::{CrudOperation, HandlerKind, QueryStrategySelector};
