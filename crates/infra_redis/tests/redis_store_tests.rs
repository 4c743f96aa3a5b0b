//! Redis store integration tests
//!
//! These tests run against a throwaway Redis container and therefore require
//! a local Docker daemon; they are ignored by default.
//!
//! ```text
//! cargo test -p infra_redis -- --ignored
//! ```

use serde_json::json;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage};

use infra_redis::{RedisConfig, RedisDocumentStore};
use repo_kernel::StoreOperations;
use test_utils::person_document;

const REDIS_IMAGE: &str = "redis";
const REDIS_TAG: &str = "7-alpine";

/// A wrapper around a Redis test container and a connected store
struct TestRedis {
    _container: ContainerAsync<GenericImage>,
    store: RedisDocumentStore,
}

impl TestRedis {
    /// Starts a new Redis container and connects the document store to it
    async fn start() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let container = GenericImage::new(REDIS_IMAGE, REDIS_TAG)
            .with_exposed_port(6379.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"))
            .start()
            .await?;

        let host = container.get_host().await?;
        let port = container.get_host_port_ipv4(6379).await?;
        let config = RedisConfig::new(format!("redis://{host}:{port}"));
        let store = RedisDocumentStore::connect(&config).await?;

        Ok(Self {
            _container: container,
            store,
        })
    }
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn test_document_round_trip() {
    let redis = TestRedis::start().await.expect("container must start");
    let store = &redis.store;

    let ada = person_document("p1", "Ada", 36);
    store.put("people", "p1", &ada).await.unwrap();

    assert_eq!(store.get("people", "p1").await.unwrap(), Some(ada));
    assert!(store.exists("people", "p1").await.unwrap());
    assert_eq!(store.get("people", "missing").await.unwrap(), None);

    assert!(store.delete("people", "p1").await.unwrap());
    assert!(!store.delete("people", "p1").await.unwrap());
    assert!(!store.exists("people", "p1").await.unwrap());
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn test_put_replaces_existing_document() {
    let redis = TestRedis::start().await.expect("container must start");
    let store = &redis.store;

    store
        .put("people", "p1", &person_document("p1", "Ada", 36))
        .await
        .unwrap();
    store
        .put("people", "p1", &json!({"id": "p1", "name": "Ada King"}))
        .await
        .unwrap();

    let stored = store.get("people", "p1").await.unwrap().unwrap();
    assert_eq!(stored["name"], "Ada King");
    assert_eq!(store.count("people").await.unwrap(), 1);
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn test_repository_dispatch_over_redis() {
    use repo_dispatch::{RepositoryDefinition, RepositoryFactory};
    use std::sync::Arc;
    use test_utils::mapping_context;

    let redis = TestRedis::start().await.expect("container must start");
    let factory = RepositoryFactory::new(mapping_context(), Arc::new(redis.store.clone()));
    let people = factory
        .build(&RepositoryDefinition::new("PersonRepository", "person").with_crud())
        .expect("crud repository must build against the Redis store");

    let ada = person_document("p1", "Ada", 36);
    people.invoke("save", &[ada.clone()]).await.unwrap();

    assert_eq!(people.invoke("find_by_id", &[json!("p1")]).await.unwrap(), ada);
    assert_eq!(people.invoke("count", &[]).await.unwrap(), json!(1));
    assert_eq!(
        people.invoke("delete_by_id", &[json!("p1")]).await.unwrap(),
        json!(true)
    );
    assert_eq!(people.invoke("count", &[]).await.unwrap(), json!(0));
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn test_count_and_list_scan_only_the_keyspace() {
    let redis = TestRedis::start().await.expect("container must start");
    let store = &redis.store;

    for index in 0..3 {
        let id = format!("p{index}");
        store
            .put("people", &id, &person_document(&id, "Person", 30 + index))
            .await
            .unwrap();
    }
    store
        .put("orders", "o1", &json!({"order_id": "o1", "total": 9.5}))
        .await
        .unwrap();

    assert_eq!(store.count("people").await.unwrap(), 3);
    assert_eq!(store.count("orders").await.unwrap(), 1);

    let people = store.list("people").await.unwrap();
    assert_eq!(people.len(), 3);
    assert!(people.iter().all(|doc| doc["id"].as_str().unwrap().starts_with('p')));
}
