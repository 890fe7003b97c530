//! CLI command implementations.

pub mod node;
pub mod script;

use std::sync::Arc;
use ydb_ffi::Engine;

/// The engine commands run against.
#[cfg(feature = "libyottadb")]
pub fn open_engine() -> Arc<dyn Engine> {
    Arc::new(ydb_ffi::NativeEngine::new())
}

/// The engine commands run against.
#[cfg(not(feature = "libyottadb"))]
pub fn open_engine() -> Arc<dyn Engine> {
    tracing::info!("libyottadb not linked; using an in-memory engine");
    Arc::new(ydb_ffi::InMemoryEngine::new())
}
