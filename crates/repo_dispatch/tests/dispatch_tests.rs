//! Integration tests for repository resolution and dispatch
//!
//! These tests verify the end-to-end behavior of building a repository
//! definition into a live handle and invoking its methods against the
//! in-memory adapters.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;

use repo_dispatch::{
    CrudOperation, CustomQueryFactory, DependencyKind, HandlerDependencies, HandlerKind,
    QueryHandler, RepositoryDefinition, RepositoryFactory,
};
use repo_kernel::ports::mock::MockDocumentStore;
use repo_kernel::{DispatchError, FieldKind, MethodDescriptor, QueryError, ReturnHint, StoreOperations};
use test_utils::{mapping_context, person_document, InMemorySearch, PersonDocumentBuilder};

fn factory_over(store: Arc<MockDocumentStore>) -> RepositoryFactory {
    let search = Arc::new(InMemorySearch::new(Arc::clone(&store)));
    RepositoryFactory::new(mapping_context(), store).with_search(search)
}

fn person_repository() -> RepositoryDefinition {
    RepositoryDefinition::new("PersonRepository", "person").with_crud()
}

mod resolution {
    use super::*;

    #[test]
    fn test_crud_only_repository_resolves_every_method_to_crud() {
        test_utils::init_tracing();
        let handle = factory_over(Arc::new(MockDocumentStore::new()))
            .build(&person_repository())
            .expect("crud-only repository must build");

        assert_eq!(handle.methods().count(), 6);
        for operation in CrudOperation::all() {
            assert_eq!(
                handle.handler_kind(operation.method_name()),
                Some(HandlerKind::Crud(operation)),
            );
        }
    }

    #[test]
    fn test_parseable_names_resolve_to_derived() {
        let handle = factory_over(Arc::new(MockDocumentStore::new()))
            .build(&person_repository().method(
                MethodDescriptor::new("find_by_name_and_age")
                    .param("name", FieldKind::String)
                    .param("age", FieldKind::Integer),
            ))
            .unwrap();

        assert_eq!(
            handle.handler_kind("find_by_name_and_age"),
            Some(HandlerKind::Derived)
        );
    }

    #[test]
    fn test_rebuild_yields_identical_method_to_kind_mapping() {
        let definition = person_repository()
            .method(MethodDescriptor::new("find_by_name").param("name", FieldKind::String))
            .method(
                MethodDescriptor::new("count_by_age_greater_than").param("age", FieldKind::Integer),
            );
        let factory = factory_over(Arc::new(MockDocumentStore::new()));

        let mapping = |handle: &repo_dispatch::RepositoryHandle| -> BTreeMap<String, String> {
            handle
                .methods()
                .map(|m| (m.to_string(), handle.handler_kind(m).unwrap().to_string()))
                .collect()
        };

        let first = factory.build(&definition).unwrap();
        let second = factory.build(&definition).unwrap();
        assert_eq!(mapping(&first), mapping(&second));
    }
}

mod crud_dispatch {
    use super::*;

    #[tokio::test]
    async fn test_save_find_delete_round_trip() {
        let store = Arc::new(MockDocumentStore::new());
        let handle = factory_over(store).build(&person_repository()).unwrap();

        let ada = PersonDocumentBuilder::new().with_id("p1").build();
        let saved = handle.invoke("save", &[ada.clone()]).await.unwrap();
        assert_eq!(saved, ada);

        assert_eq!(handle.invoke("find_by_id", &[json!("p1")]).await.unwrap(), ada);
        assert_eq!(handle.invoke("count", &[]).await.unwrap(), json!(1));
        assert_eq!(
            handle.invoke("exists_by_id", &[json!("p1")]).await.unwrap(),
            json!(true)
        );

        let all = handle.invoke("find_all", &[]).await.unwrap();
        assert_eq!(all.as_array().unwrap().len(), 1);

        assert_eq!(
            handle.invoke("delete_by_id", &[json!("p1")]).await.unwrap(),
            json!(true)
        );
        assert_eq!(
            handle.invoke("find_by_id", &[json!("p1")]).await.unwrap(),
            serde_json::Value::Null
        );
    }

    #[tokio::test]
    async fn test_unknown_method_and_arity_errors() {
        let handle = factory_over(Arc::new(MockDocumentStore::new()))
            .build(&person_repository())
            .unwrap();

        let unknown = handle.invoke("vanish", &[]).await.unwrap_err();
        assert!(matches!(unknown, QueryError::UnknownMethod { .. }));
        assert!(unknown.to_string().contains("PersonRepository"));

        let arity = handle.invoke("find_by_id", &[]).await.unwrap_err();
        assert!(matches!(
            arity,
            QueryError::ArityMismatch {
                expected: 1,
                actual: 0,
                ..
            }
        ));
    }
}

mod derived_dispatch {
    use super::*;

    async fn seeded_handle(
        definition: RepositoryDefinition,
    ) -> repo_dispatch::RepositoryHandle {
        let store = Arc::new(MockDocumentStore::new());
        store
            .seed("people", "p1", person_document("p1", "Ada", 36))
            .await;
        store
            .seed("people", "p2", person_document("p2", "Grace", 45))
            .await;
        store
            .seed("people", "p3", person_document("p3", "Ada", 61))
            .await;
        factory_over(store).build(&definition).unwrap()
    }

    #[tokio::test]
    async fn test_find_by_name_and_age_filters_conjunctively() {
        let handle = seeded_handle(person_repository().method(
            MethodDescriptor::new("find_by_name_and_age")
                .param("name", FieldKind::String)
                .param("age", FieldKind::Integer),
        ))
        .await;

        let matched = handle
            .invoke("find_by_name_and_age", &[json!("Ada"), json!(36)])
            .await
            .unwrap();
        let matched = matched.as_array().unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0]["id"], "p1");
    }

    #[tokio::test]
    async fn test_count_and_exists_forms_shape_results() {
        let handle = seeded_handle(
            person_repository()
                .method(
                    MethodDescriptor::new("count_by_age_greater_than")
                        .param("age", FieldKind::Integer)
                        .returns(ReturnHint::Count),
                )
                .method(
                    MethodDescriptor::new("exists_by_email_containing")
                        .param("fragment", FieldKind::String)
                        .returns(ReturnHint::Bool),
                ),
        )
        .await;

        assert_eq!(
            handle
                .invoke("count_by_age_greater_than", &[json!(40)])
                .await
                .unwrap(),
            json!(2)
        );
        assert_eq!(
            handle
                .invoke("exists_by_email_containing", &[json!("p2@")])
                .await
                .unwrap(),
            json!(true)
        );
        assert_eq!(
            handle
                .invoke("exists_by_email_containing", &[json!("nobody@")])
                .await
                .unwrap(),
            json!(false)
        );
    }
}

mod custom_queries {
    use super::*;

    #[tokio::test]
    async fn test_raw_payload_dispatches_through_search() {
        let store = Arc::new(MockDocumentStore::new());
        store
            .seed("people", "p1", person_document("p1", "Ada", 36))
            .await;
        store
            .seed(
                "people",
                "p2",
                PersonDocumentBuilder::new()
                    .with_id("p2")
                    .with_active(false)
                    .build(),
            )
            .await;

        let handle = factory_over(store)
            .build(&person_repository().method(
                MethodDescriptor::new("find_actives")
                    .raw_query("active=$active")
                    .param("active", FieldKind::Boolean),
            ))
            .unwrap();

        assert_eq!(handle.handler_kind("find_actives"), Some(HandlerKind::Custom));
        let actives = handle.invoke("find_actives", &[json!(true)]).await.unwrap();
        let actives = actives.as_array().unwrap();
        assert_eq!(actives.len(), 1);
        assert_eq!(actives[0]["id"], "p1");
    }

    struct StaticAnswerFactory;

    struct StaticAnswerHandler(String);

    #[async_trait::async_trait]
    impl QueryHandler for StaticAnswerHandler {
        async fn execute(
            &self,
            _args: &[serde_json::Value],
        ) -> Result<serde_json::Value, QueryError> {
            Ok(json!({ "answered_by": self.0 }))
        }
    }

    impl CustomQueryFactory for StaticAnswerFactory {
        fn build(
            &self,
            dependencies: &HandlerDependencies,
        ) -> Result<Arc<dyn QueryHandler>, DispatchError> {
            Ok(Arc::new(StaticAnswerHandler(
                dependencies.descriptor.name().to_string(),
            )))
        }
    }

    struct SearchHungryFactory;

    impl CustomQueryFactory for SearchHungryFactory {
        fn required_dependencies(&self) -> &'static [DependencyKind] {
            &[DependencyKind::SearchOperations]
        }

        fn build(
            &self,
            _dependencies: &HandlerDependencies,
        ) -> Result<Arc<dyn QueryHandler>, DispatchError> {
            unreachable!("requirements cannot be satisfied in this test")
        }
    }

    #[tokio::test]
    async fn test_custom_factory_overrides_derived_parsing() {
        let handle = factory_over(Arc::new(MockDocumentStore::new()))
            .with_custom_factory(Arc::new(StaticAnswerFactory))
            .build(
                &person_repository()
                    .method(MethodDescriptor::new("find_by_name").param("name", FieldKind::String)),
            )
            .unwrap();

        // CRUD primitives stay CRUD even under the override.
        assert_eq!(
            handle.handler_kind("find_by_id"),
            Some(HandlerKind::Crud(CrudOperation::FindById))
        );
        assert_eq!(handle.handler_kind("find_by_name"), Some(HandlerKind::Custom));

        let answer = handle.invoke("find_by_name", &[json!("Ada")]).await.unwrap();
        assert_eq!(answer, json!({ "answered_by": "find_by_name" }));
    }

    #[test]
    fn test_incompatible_factory_fails_then_compatible_factory_succeeds() {
        // No search port configured: the factory's requirements cannot be met.
        let store: Arc<dyn StoreOperations> = Arc::new(MockDocumentStore::new());
        let definition = person_repository()
            .method(MethodDescriptor::new("find_by_name").param("name", FieldKind::String));

        let error = RepositoryFactory::new(mapping_context(), Arc::clone(&store))
            .with_custom_factory(Arc::new(SearchHungryFactory))
            .build(&definition)
            .unwrap_err();
        assert!(error.is_incompatible());
        assert!(error.to_string().contains("SearchHungryFactory"));
        assert!(error.to_string().contains("SearchOperations"));

        // Same definition, a factory with a satisfiable construction path.
        let handle = RepositoryFactory::new(mapping_context(), store)
            .with_custom_factory(Arc::new(StaticAnswerFactory))
            .build(&definition)
            .unwrap();
        assert_eq!(handle.handler_kind("find_by_name"), Some(HandlerKind::Custom));
    }
}

mod failure_policy {
    use super::*;

    #[test]
    fn test_unparseable_method_fails_naming_the_method() {
        let error = factory_over(Arc::new(MockDocumentStore::new()))
            .build(&person_repository().method(MethodDescriptor::new("launder_widgets")))
            .unwrap_err();

        assert!(error.is_unresolvable());
        let message = error.to_string();
        assert!(message.contains("launder_widgets"));
        assert!(message.contains("PersonRepository"));
    }

    #[test]
    fn test_unknown_entity_fails_naming_entity_and_repository() {
        let error = factory_over(Arc::new(MockDocumentStore::new()))
            .build(&RepositoryDefinition::new("GhostRepository", "ghost").with_crud())
            .unwrap_err();

        assert!(matches!(error, DispatchError::UnknownEntity { .. }));
        assert!(error.to_string().contains("ghost"));
        assert!(error.to_string().contains("GhostRepository"));
    }

    #[test]
    fn test_duplicate_method_declaration_fails() {
        let error = factory_over(Arc::new(MockDocumentStore::new()))
            .build(
                &person_repository()
                    .method(MethodDescriptor::new("find_by_name").param("name", FieldKind::String))
                    .method(MethodDescriptor::new("find_by_name").param("name", FieldKind::String)),
            )
            .unwrap_err();

        assert!(matches!(error, DispatchError::DuplicateMethod { .. }));
    }

    #[test]
    fn test_derived_method_without_search_port_is_a_build_error() {
        let store = Arc::new(MockDocumentStore::new());
        let error = RepositoryFactory::new(mapping_context(), store)
            .build(
                &person_repository()
                    .method(MethodDescriptor::new("find_by_name").param("name", FieldKind::String)),
            )
            .unwrap_err();

        assert!(error.is_incompatible());
    }

    #[tokio::test]
    async fn test_failed_build_is_atomic() {
        let factory = factory_over(Arc::new(MockDocumentStore::new()));
        let poisoned = person_repository().method(MethodDescriptor::new("launder_widgets"));

        // The whole build fails; no partial handle exists for the valid methods.
        assert!(factory.build(&poisoned).is_err());

        // The factory itself is unaffected and still builds clean definitions.
        let handle = factory.build(&person_repository()).unwrap();
        assert_eq!(handle.invoke("count", &[]).await.unwrap(), json!(0));
    }
}
