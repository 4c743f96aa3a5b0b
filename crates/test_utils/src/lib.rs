//! Test Utilities Crate
//!
//! Provides shared test infrastructure for the dispatcher test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built entity metadata and documents
//! - `builders`: Builder patterns for test document construction
//! - `memory`: In-memory search adapter over the mock store
//! - `generators`: Fake-data document generators

pub mod builders;
pub mod fixtures;
pub mod generators;
pub mod memory;

pub use builders::*;
pub use fixtures::*;
pub use generators::*;
pub use memory::*;

use once_cell::sync::Lazy;

static TRACING: Lazy<()> = Lazy::new(|| {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .init();
});

/// Initializes a process-wide test tracing subscriber, once
pub fn init_tracing() {
    Lazy::force(&TRACING);
}
