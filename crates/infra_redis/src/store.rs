//! Redis-backed document store
//!
//! Documents live as JSON strings under `keyspace:id` keys. The store holds a
//! multiplexed connection manager, so clones are cheap and every operation
//! works on its own handle.

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;
use tracing::info;

use repo_kernel::{Document, StoreError, StoreOperations};

use crate::config::RedisConfig;
use crate::error::map_redis_error;

/// Store operations adapter over Redis
#[derive(Clone)]
pub struct RedisDocumentStore {
    connection: ConnectionManager,
}

impl RedisDocumentStore {
    /// Connects to Redis with the given configuration
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Connection` if the URL is invalid or the
    /// connection cannot be established.
    pub async fn connect(config: &RedisConfig) -> Result<Self, StoreError> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| StoreError::Connection(format!("invalid Redis URL: {e}")))?;

        let manager_config = ConnectionManagerConfig::new()
            .set_connection_timeout(config.connect_timeout)
            .set_response_timeout(config.response_timeout);
        let connection = ConnectionManager::new_with_config(client, manager_config)
            .await
            .map_err(|e| map_redis_error(e, "connect"))?;

        info!(url = %config.url, "connected to Redis document store");
        Ok(Self { connection })
    }

    /// Connects with default settings to the given URL
    pub async fn connect_url(url: &str) -> Result<Self, StoreError> {
        Self::connect(&RedisConfig::new(url)).await
    }

    pub(crate) fn key(keyspace: &str, id: &str) -> String {
        format!("{keyspace}:{id}")
    }

    async fn scan_keys(&self, keyspace: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.connection.clone();
        let pattern = format!("{keyspace}:*");
        let mut iter = conn
            .scan_match::<_, String>(&pattern)
            .await
            .map_err(|e| map_redis_error(e, "scan"))?;

        let mut keys = Vec::new();
        while let Some(key) = iter.next_item().await {
            keys.push(key);
        }
        Ok(keys)
    }
}

#[async_trait]
impl StoreOperations for RedisDocumentStore {
    async fn get(&self, keyspace: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let mut conn = self.connection.clone();
        let raw: Option<String> = conn
            .get(Self::key(keyspace, id))
            .await
            .map_err(|e| map_redis_error(e, "get"))?;

        raw.map(|payload| {
            serde_json::from_str(&payload).map_err(|e| {
                StoreError::serialization(format!(
                    "failed to deserialize document {keyspace}:{id}: {e}"
                ))
            })
        })
        .transpose()
    }

    async fn put(&self, keyspace: &str, id: &str, document: &Document) -> Result<(), StoreError> {
        let payload = serde_json::to_string(document).map_err(|e| {
            StoreError::serialization(format!("failed to serialize document {keyspace}:{id}: {e}"))
        })?;

        let mut conn = self.connection.clone();
        conn.set::<_, _, ()>(Self::key(keyspace, id), payload)
            .await
            .map_err(|e| map_redis_error(e, "put"))
    }

    async fn delete(&self, keyspace: &str, id: &str) -> Result<bool, StoreError> {
        let mut conn = self.connection.clone();
        let removed: i64 = conn
            .del(Self::key(keyspace, id))
            .await
            .map_err(|e| map_redis_error(e, "delete"))?;
        Ok(removed > 0)
    }

    async fn exists(&self, keyspace: &str, id: &str) -> Result<bool, StoreError> {
        let mut conn = self.connection.clone();
        conn.exists(Self::key(keyspace, id))
            .await
            .map_err(|e| map_redis_error(e, "exists"))
    }

    async fn count(&self, keyspace: &str) -> Result<u64, StoreError> {
        Ok(self.scan_keys(keyspace).await?.len() as u64)
    }

    async fn list(&self, keyspace: &str) -> Result<Vec<Document>, StoreError> {
        let keys = self.scan_keys(keyspace).await?;
        let mut conn = self.connection.clone();

        let mut documents = Vec::with_capacity(keys.len());
        for key in keys {
            // A key may expire between SCAN and GET; absent values are skipped.
            let raw: Option<String> = conn
                .get(&key)
                .await
                .map_err(|e| map_redis_error(e, "list"))?;
            if let Some(payload) = raw {
                documents.push(serde_json::from_str(&payload).map_err(|e| {
                    StoreError::serialization(format!("failed to deserialize document {key}: {e}"))
                })?);
            }
        }
        Ok(documents)
    }
}
