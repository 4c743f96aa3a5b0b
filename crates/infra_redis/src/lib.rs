//! Redis Infrastructure Layer
//!
//! This crate implements the store operations port against Redis. Documents
//! are stored as JSON strings under `keyspace:id` keys; enumeration and
//! counting walk the keyspace with SCAN so no separate index is maintained.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_redis::{RedisConfig, RedisDocumentStore};
//!
//! let config = RedisConfig::new("redis://localhost:6379")
//!     .connect_timeout(Duration::from_secs(5));
//! let store = RedisDocumentStore::connect(&config).await?;
//! ```

pub mod config;
pub mod error;
pub mod store;

pub use config::RedisConfig;
pub use store::RedisDocumentStore;
