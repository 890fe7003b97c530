//! Connection fixtures.
//!
//! Every fixture runs against an [`InMemoryEngine`], so tests need no
//! YottaDB installation.

use std::sync::Arc;
use ydb_core::{Conn, ConnConfig};
use ydb_ffi::InMemoryEngine;

/// A connection together with the engine behind it.
pub struct TestConn {
    /// The connection under test.
    pub conn: Conn,
    /// The engine, kept for call counts and inspection.
    pub engine: Arc<InMemoryEngine>,
}

impl TestConn {
    /// A connection with default buffer sizes on a fresh engine.
    pub fn memory() -> Self {
        Self::with_config(ConnConfig::default())
    }

    /// A connection with the given buffer sizes on a fresh engine.
    pub fn with_config(config: ConnConfig) -> Self {
        let engine = Arc::new(InMemoryEngine::new());
        Self {
            conn: Conn::with_config(engine.clone(), config),
            engine,
        }
    }

    /// Another connection on the same engine, as a second thread would
    /// open.
    pub fn sibling(&self) -> Conn {
        Conn::new(self.engine.clone())
    }
}

impl std::ops::Deref for TestConn {
    type Target = Conn;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

/// Runs a test with a connection on a fresh in-memory engine.
///
/// # Example
///
/// ```rust
/// use ydb_testkit::with_memory_conn;
///
/// with_memory_conn(|conn| {
///     let n = conn.node("x", &["1"]);
///     n.set("a").unwrap();
///     assert_eq!(n.get().unwrap(), "a");
/// });
/// ```
pub fn with_memory_conn<F, R>(f: F) -> R
where
    F: FnOnce(&Conn) -> R,
{
    let test = TestConn::memory();
    f(&test.conn)
}

/// A connection whose value buffer starts at `capacity` bytes, for
/// exercising buffer growth.
pub fn small_buffer_conn(capacity: usize) -> TestConn {
    TestConn::with_config(ConnConfig::new().value_buffer_capacity(capacity))
}
