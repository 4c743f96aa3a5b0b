//! Mapping Redis errors onto the store boundary error
//!
//! Handler code never sees a `RedisError`; every failure is translated here
//! into the appropriate `StoreError` variant based on the error kind.

use redis::{ErrorKind, RedisError};
use repo_kernel::StoreError;
use tracing::{error, warn};

/// Converts a Redis error into the boundary error type
pub(crate) fn map_redis_error(err: RedisError, context: &str) -> StoreError {
    if err.is_timeout() {
        warn!("Redis timeout in {context}: {err}");
        return StoreError::Timeout(format!("{context}: {err}"));
    }
    match err.kind() {
        ErrorKind::IoError => {
            error!("Redis IO error in {context}: {err}");
            StoreError::Connection(format!("Redis connection failed: {err}"))
        }
        ErrorKind::AuthenticationFailed => {
            error!("Redis authentication failed in {context}: {err}");
            StoreError::Connection(format!("Redis authentication failed: {err}"))
        }
        ErrorKind::BusyLoadingError => {
            warn!("Redis busy loading in {context}: {err}");
            StoreError::Connection(format!("Redis is loading: {err}"))
        }
        ErrorKind::TypeError => {
            error!("Redis type error in {context}: {err}");
            StoreError::Serialization(format!("Redis data type error: {err}"))
        }
        _ => {
            error!("Unexpected Redis error in {context}: {err}");
            StoreError::Backend(format!("Redis error in {context}: {err}"))
        }
    }
}
