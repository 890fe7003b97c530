//! Integration tests for connections and nodes over the in-memory engine.

use std::sync::Arc;
use std::thread;
use ydb_core::{Conn, ConnConfig, Key};
use ydb_ffi::{InMemoryEngine, YDB_ERR_GVUNDEF, YDB_ERR_LVUNDEF};
use ydb_testkit::{run_concurrent_set_get, small_buffer_conn, StressConfig, TestConn};

#[test]
fn documented_scenario() {
    let conn = TestConn::memory();
    let n = conn.node("var", &["sub1", "sub2"]);
    assert_eq!(n.to_string(), "var(\"sub1\")(\"sub2\")");

    n.set("3").unwrap();
    assert_eq!(n.get().unwrap(), "3");
    assert_eq!(conn.node("var", &["nope"]).get_or("fallback").unwrap(), "fallback");
}

#[test]
fn undefined_without_default() {
    let conn = TestConn::memory();
    let err = conn.node("^never", &["set"]).get().unwrap_err();
    assert_eq!(err.code(), YDB_ERR_GVUNDEF);

    let err = conn.node("never", &["set"]).get().unwrap_err();
    assert_eq!(err.code(), YDB_ERR_LVUNDEF);
    assert!(err.to_string().contains("never(\"set\")"));
}

#[test]
fn large_value_needs_exactly_one_retry() {
    let conn = small_buffer_conn(16);
    let writer = conn.sibling();
    let value = "x".repeat(64 * 1024);
    writer.node_from(&["^large"]).set(&value).unwrap();

    let before = conn.engine.get_calls();
    let got = conn.node_from(&["^large"]).get().unwrap();
    assert_eq!(got.len(), value.len());
    assert_eq!(got, value);
    assert_eq!(conn.engine.get_calls() - before, 2);
}

#[test]
fn overwrite_replaces_value() {
    let conn = TestConn::memory();
    let n = conn.node("^o", &["k"]);
    n.set("one").unwrap();
    n.set("two").unwrap();
    assert_eq!(n.get().unwrap(), "two");
    assert_eq!(conn.engine.len(), 1);
}

#[test]
fn empty_value_is_defined() {
    let conn = TestConn::memory();
    let n = conn.node("^e", &[""]);
    n.set("").unwrap();
    assert_eq!(n.get_or("default").unwrap(), "");
}

#[test]
fn parent_and_child_are_distinct_nodes() {
    let conn = TestConn::memory();
    conn.node("^t", &["a", "b"]).set("child").unwrap();
    assert!(conn.node("^t", &["a"]).get().unwrap_err().is_undefined());
    conn.node("^t", &["a"]).set("parent").unwrap();
    assert_eq!(conn.node("^t", &["a", "b"]).get().unwrap(), "child");
}

#[test]
fn error_text_respects_resized_buffer() {
    let conn = TestConn::memory();
    conn.resize_error_buffer(12);
    let err = conn.node_from(&["^missing"]).get().unwrap_err();
    assert_eq!(err.message().len(), 12);

    conn.resize_error_buffer(1024);
    let err = conn.node_from(&["^missing"]).get().unwrap_err();
    assert!(err.message().ends_with("^missing"));
}

#[test]
fn key_shared_across_threads() {
    let engine = Arc::new(InMemoryEngine::new());
    let key = Key::new("^shared", &["k"]);
    {
        let conn = Conn::new(engine.clone());
        key.bind(&conn).set("hello").unwrap();
    }

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = engine.clone();
            let key = key.clone();
            thread::spawn(move || {
                let conn = Conn::new(engine);
                key.bind(&conn).get().unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), "hello");
    }
}

#[test]
fn connection_moves_to_another_thread() {
    let engine = Arc::new(InMemoryEngine::new());
    let conn = Conn::with_config(engine, ConnConfig::new().value_buffer_capacity(8));
    let handle = thread::spawn(move || {
        let n = conn.node_from(&["moved"]);
        n.set("ok").unwrap();
        n.get().unwrap()
    });
    assert_eq!(handle.join().unwrap(), "ok");
}

#[test]
fn stress_one_connection_per_thread() {
    let engine = Arc::new(InMemoryEngine::new());
    let config = StressConfig {
        threads: 8,
        operations_per_thread: 200,
    };
    let result = run_concurrent_set_get(engine, &config);
    assert_eq!(result.total_ops, 1600);
    assert_eq!(result.failed_ops, 0);
}
