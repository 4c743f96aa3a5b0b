//! Query handlers
//!
//! A [`QueryHandler`] is the constructed, ready-to-invoke object behind one
//! repository method. Handlers are built once at repository-build time and
//! shared read-only afterwards; all I/O happens inside `execute`, never
//! during construction.

use async_trait::async_trait;
use serde_json::Value;

use repo_kernel::QueryError;

mod crud;
mod derived;
mod raw;

pub use crud::CrudHandler;
pub use derived::DerivedQueryHandler;
pub use raw::RawQueryHandler;

/// A constructed query-execution strategy for one repository method
///
/// Implementations own shared references to the store/search ports and must
/// be safe for concurrent `execute` calls.
#[async_trait]
pub trait QueryHandler: Send + Sync {
    /// Executes the method with the given invocation arguments
    async fn execute(&self, args: &[Value]) -> Result<Value, QueryError>;
}
