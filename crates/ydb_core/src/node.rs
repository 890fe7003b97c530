//! Keys and nodes.
//!
//! A [`Key`] is the packed, immutable form of a database key: variable name
//! plus ordered subscripts, stored with its descriptor array in a single
//! allocation. A [`Node`] pairs a key with the [`Conn`] whose buffers and
//! call token it uses for `get` and `set`.

use crate::conn::Conn;
use crate::error::YdbResult;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use ydb_ffi::{is_undefined, OwnedBuffer, PackedKey, YDB_ERR_INVSTRLEN, YDB_OK};

/// An immutable database key.
///
/// `Key` is `Send + Sync` and cheap to clone (clones share the packed
/// block). Hand a key to another thread and [`bind`](Key::bind) it to that
/// thread's own connection.
#[derive(Clone, PartialEq, Eq)]
pub struct Key {
    packed: Arc<PackedKey>,
}

#[allow(clippy::len_without_is_empty)]
impl Key {
    /// Packs a variable name and its subscripts into a fresh allocation.
    pub fn new<V, S>(varname: V, subscripts: &[S]) -> Self
    where
        V: AsRef<[u8]>,
        S: AsRef<[u8]>,
    {
        Self {
            packed: Arc::new(PackedKey::with_subscripts(varname.as_ref(), subscripts)),
        }
    }

    /// Packs components in order; the first is the variable name.
    ///
    /// # Panics
    ///
    /// Panics if `components` is empty.
    pub fn from_components<S: AsRef<[u8]>>(components: &[S]) -> Self {
        Self {
            packed: Arc::new(PackedKey::pack(components)),
        }
    }

    /// Number of components, variable name included.
    pub fn len(&self) -> usize {
        self.packed.len()
    }

    /// The variable name.
    pub fn varname(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.packed.segment(0))
    }

    /// The subscripts, in order.
    pub fn subscripts(&self) -> impl Iterator<Item = Cow<'_, str>> + '_ {
        self.packed.segments().skip(1).map(String::from_utf8_lossy)
    }

    /// The packed descriptor array and backing bytes.
    pub fn packed(&self) -> &PackedKey {
        &self.packed
    }

    /// Pairs this key with a connection.
    pub fn bind<'c>(&self, conn: &'c Conn) -> Node<'c> {
        Node {
            conn,
            key: self.clone(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.packed, f)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Key").field(&self.packed).finish()
    }
}

/// A key bound to the connection that issues its engine calls.
///
/// Displays in the usual YottaDB form, `varname("sub1")("sub2")`.
///
/// # Thread Safety
///
/// A `Node` borrows its connection and so stays on the connection's thread.
/// To use the same key elsewhere, send its [`Key`] and bind it there.
#[derive(Clone)]
pub struct Node<'c> {
    conn: &'c Conn,
    key: Key,
}

#[allow(clippy::len_without_is_empty)]
impl<'c> Node<'c> {
    /// The key this node addresses.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// The connection this node calls through.
    pub fn conn(&self) -> &'c Conn {
        self.conn
    }

    /// The same key bound to another connection; the packed block is shared.
    pub fn with_conn<'d>(&self, conn: &'d Conn) -> Node<'d> {
        self.key.bind(conn)
    }

    /// Number of components, variable name included.
    pub fn len(&self) -> usize {
        self.key.len()
    }

    /// Stores `value` at this node.
    ///
    /// The value is copied into the connection's value buffer, growing it if
    /// needed, for the duration of the call.
    ///
    /// # Panics
    ///
    /// Panics if `value` is longer than the connection's `max_value_size`.
    pub fn set(&self, value: impl AsRef<[u8]>) -> YdbResult<()> {
        let value = value.as_ref();
        let conn = self.conn;
        let status = {
            let mut buf = conn.value_buffer();
            if !conn.grow_value(&mut buf, value.len()) {
                panic!(
                    "YDB: tried to set a {}-byte value; the connection limit is {} bytes",
                    value.len(),
                    conn.config().max_value_size
                );
            }
            buf.fill(value);
            let mut errstr = conn.error_buffer();
            conn.engine().set(conn.tptoken(), &mut errstr, self.key.packed(), &buf)
        };
        conn.check(status)
    }

    /// Reads the value at this node.
    ///
    /// Non-UTF-8 bytes are replaced; use [`get_bytes`](Self::get_bytes) for
    /// the raw value.
    pub fn get(&self) -> YdbResult<String> {
        self.get_bytes().map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Reads the value at this node, or `default` if it has none.
    ///
    /// Only an undefined-variable status is replaced by the default; every
    /// other failure is returned.
    pub fn get_or(&self, default: &str) -> YdbResult<String> {
        match self.fetch() {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(status) if is_undefined(status) => Ok(default.to_owned()),
            Err(status) => Err(self.conn.error(status)),
        }
    }

    /// Reads the raw value at this node.
    pub fn get_bytes(&self) -> YdbResult<Vec<u8>> {
        self.fetch().map_err(|status| self.conn.error(status))
    }

    /// Issues the get, retrying once with a right-sized buffer if the
    /// engine reports the value did not fit. The result is copied out of
    /// the shared value buffer.
    fn fetch(&self) -> Result<Vec<u8>, i32> {
        let conn = self.conn;
        let mut buf = conn.value_buffer();
        let mut status = self.call_get(&mut buf);
        if status == YDB_ERR_INVSTRLEN {
            let needed = buf.len_used();
            if conn.grow_value(&mut buf, needed) {
                status = self.call_get(&mut buf);
            }
        }
        if status == YDB_OK {
            Ok(buf.as_bytes().to_vec())
        } else {
            Err(status)
        }
    }

    fn call_get(&self, buf: &mut OwnedBuffer) -> i32 {
        let conn = self.conn;
        let mut errstr = conn.error_buffer();
        conn.engine().get(conn.tptoken(), &mut errstr, self.key.packed(), buf)
    }
}

impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.key, f)
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("key", &self.key)
            .field("tptoken", &self.conn.tptoken())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnConfig;
    use std::sync::atomic::{AtomicU64, Ordering};
    use ydb_ffi::{
        Engine, InMemoryEngine, YDB_ERR_GVUNDEF, YDB_ERR_LVUNDEF, YDB_ERR_UNKNOWNSYSERR,
    };

    /// Engine that always reports a value one byte larger than the buffer.
    #[derive(Default)]
    struct GrowingEngine {
        gets: AtomicU64,
    }

    impl Engine for GrowingEngine {
        fn get(
            &self,
            _: u64,
            errstr: &mut OwnedBuffer,
            _: &PackedKey,
            out: &mut OwnedBuffer,
        ) -> i32 {
            self.gets.fetch_add(1, Ordering::Relaxed);
            out.report_required(out.capacity() + 1);
            errstr.write_truncated(b"grew again");
            YDB_ERR_INVSTRLEN
        }

        fn set(&self, _: u64, _: &mut OwnedBuffer, _: &PackedKey, _: &OwnedBuffer) -> i32 {
            YDB_OK
        }

        fn message(&self, _: u64, _: &mut OwnedBuffer, _: i32, _: &mut OwnedBuffer) -> i32 {
            YDB_ERR_UNKNOWNSYSERR
        }
    }

    fn setup() -> (Arc<InMemoryEngine>, Conn) {
        let engine = Arc::new(InMemoryEngine::new());
        let conn = Conn::new(engine.clone());
        (engine, conn)
    }

    #[test]
    fn node_string_form() {
        let (_, conn) = setup();
        let n = conn.node("var", &["sub1", "sub2"]);
        assert_eq!(n.to_string(), "var(\"sub1\")(\"sub2\")");
        assert_eq!(format!("{n}"), "var(\"sub1\")(\"sub2\")");
    }

    #[test]
    fn varname_only_node() {
        let (_, conn) = setup();
        let n = conn.node_from(&["^root"]);
        assert_eq!(n.len(), 1);
        assert_eq!(n.to_string(), "^root");
    }

    #[test]
    #[should_panic(expected = "at least one component")]
    fn empty_node_panics() {
        let (_, conn) = setup();
        let none: [&str; 0] = [];
        let _ = conn.node_from(&none);
    }

    #[test]
    fn quotes_and_parens_are_verbatim() {
        let (_, conn) = setup();
        let n = conn.node("v", &["a(\"b", "c\")d"]);
        assert_eq!(n.to_string(), "v(\"a(\"b\")(\"c\")d\")");
        let subs: Vec<_> = n.key().subscripts().collect();
        assert_eq!(subs, ["a(\"b", "c\")d"]);
    }

    #[test]
    fn set_then_get() {
        let (_, conn) = setup();
        let n = conn.node("var", &["sub1", "sub2"]);
        n.set("3").unwrap();
        assert_eq!(n.get().unwrap(), "3");
    }

    #[test]
    fn get_with_default() {
        let (_, conn) = setup();
        let n = conn.node("var", &["nope"]);
        assert_eq!(n.get_or("fallback").unwrap(), "fallback");
    }

    #[test]
    fn get_without_default_is_undefined() {
        let (_, conn) = setup();
        let err = conn.node("^g", &["nope"]).get().unwrap_err();
        assert_eq!(err.code(), YDB_ERR_GVUNDEF);
        assert!(err.is_undefined());
        assert!(err.message().contains("^g(\"nope\")"));

        let err = conn.node("l", &["nope"]).get().unwrap_err();
        assert_eq!(err.code(), YDB_ERR_LVUNDEF);
    }

    #[test]
    fn default_does_not_hide_other_errors() {
        let (_, conn) = setup();
        let err = conn.node_from(&["1bad"]).get_or("d").unwrap_err();
        assert_eq!(err.status_name(), Some("INVVARNAME"));
    }

    #[test]
    fn set_error_is_returned() {
        let (_, conn) = setup();
        let err = conn.node_from(&["bad name"]).set("x").unwrap_err();
        assert!(err.message().contains("%YDB-E-INVVARNAME"));
    }

    #[test]
    fn get_grows_buffer_with_one_retry() {
        let engine = Arc::new(InMemoryEngine::new());
        let writer = Conn::new(engine.clone());
        let reader = Conn::with_config(engine.clone(), ConnConfig::new().value_buffer_capacity(4));

        let value = "0123456789".repeat(10);
        writer.node("^big", &["k"]).set(&value).unwrap();

        let before = engine.get_calls();
        assert_eq!(reader.node("^big", &["k"]).get().unwrap(), value);
        assert_eq!(engine.get_calls() - before, 2);
        assert_eq!(reader.value_buffer_capacity(), 100);

        // Now large enough: one call.
        let before = engine.get_calls();
        assert_eq!(reader.node("^big", &["k"]).get().unwrap(), value);
        assert_eq!(engine.get_calls() - before, 1);
    }

    #[test]
    fn get_beyond_limit_reports_invstrlen() {
        let engine = Arc::new(InMemoryEngine::new());
        let writer = Conn::new(engine.clone());
        let reader = Conn::with_config(
            engine.clone(),
            ConnConfig::new().value_buffer_capacity(4).max_value_size(8),
        );
        writer.node_from(&["^v"]).set("0123456789").unwrap();

        let before = engine.get_calls();
        let err = reader.node_from(&["^v"]).get().unwrap_err();
        assert!(err.is_invstrlen());
        assert_eq!(engine.get_calls() - before, 1);
        assert_eq!(reader.value_buffer_capacity(), 4);
    }

    #[test]
    fn failed_retry_is_returned() {
        let engine = Arc::new(GrowingEngine::default());
        let conn = Conn::with_config(engine.clone(), ConnConfig::new().value_buffer_capacity(4));

        let err = conn.node_from(&["^g"]).get().unwrap_err();
        assert!(err.is_invstrlen());
        assert_eq!(err.message(), "grew again");
        assert_eq!(engine.gets.load(Ordering::Relaxed), 2);
        assert_eq!(conn.value_buffer_capacity(), 5);
    }

    #[test]
    fn get_beyond_limit_with_default_buffer() {
        let engine = Arc::new(InMemoryEngine::new());
        let writer = Conn::new(engine.clone());
        let reader = Conn::with_config(engine, ConnConfig::new().max_value_size(8));
        writer.var("^v").set("0123456789").unwrap();

        let err = reader.var("^v").get().unwrap_err();
        assert!(err.is_invstrlen());
        assert_eq!(reader.var("^v").get_or("d").unwrap_err().code(), YDB_ERR_INVSTRLEN);
    }

    #[test]
    fn set_within_limit_succeeds() {
        let engine = Arc::new(InMemoryEngine::new());
        let conn = Conn::with_config(engine, ConnConfig::new().max_value_size(4));
        let n = conn.var("x");
        n.set("four").unwrap();
        assert_eq!(n.get().unwrap(), "four");
    }

    #[test]
    fn set_grows_value_buffer() {
        let engine = Arc::new(InMemoryEngine::new());
        let conn = Conn::with_config(engine, ConnConfig::new().value_buffer_capacity(2));
        let n = conn.node_from(&["x"]);
        n.set("hello").unwrap();
        assert_eq!(conn.value_buffer_capacity(), 5);
        assert_eq!(n.get().unwrap(), "hello");
    }

    #[test]
    #[should_panic(expected = "connection limit")]
    fn set_beyond_limit_panics() {
        let engine = Arc::new(InMemoryEngine::new());
        let conn = Conn::with_config(engine, ConnConfig::new().max_value_size(3));
        let _ = conn.node_from(&["x"]).set("four");
    }

    #[test]
    fn returned_value_is_a_copy() {
        let (_, conn) = setup();
        let a = conn.node_from(&["a"]);
        let b = conn.node_from(&["b"]);
        a.set("first").unwrap();
        let got = a.get().unwrap();
        b.set("second").unwrap();
        assert_eq!(got, "first");
        assert_eq!(b.get().unwrap(), "second");
    }

    #[test]
    fn binary_values() {
        let (_, conn) = setup();
        let n = conn.node_from(&["bin"]);
        n.set([0u8, 255, 10, 0]).unwrap();
        assert_eq!(n.get_bytes().unwrap(), vec![0u8, 255, 10, 0]);
    }

    #[test]
    fn connections_do_not_share_keys_or_buffers() {
        let engine = Arc::new(InMemoryEngine::new());
        let one = Conn::new(engine.clone());
        let two = Conn::new(engine);

        let a = one.node("v", &["s"]);
        let b = two.node("v", &["s"]);
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key().packed().data().as_ptr(), b.key().packed().data().as_ptr());

        a.set("from one").unwrap();
        assert!(two.value_buffer().is_empty());
        assert_eq!(one.value_buffer().as_bytes(), b"from one");
    }

    #[test]
    fn with_conn_shares_the_key() {
        let engine = Arc::new(InMemoryEngine::new());
        let one = Conn::new(engine.clone());
        let two = Conn::new(engine);

        let a = one.node("^s", &["k"]);
        a.set("v").unwrap();
        let b = a.with_conn(&two);
        assert!(std::ptr::eq(a.key().packed(), b.key().packed()));
        assert_eq!(b.get().unwrap(), "v");
    }

    #[test]
    fn key_accessors() {
        let key = Key::new("^x", &["a", "b"]);
        assert_eq!(key.len(), 3);
        assert_eq!(key.varname(), "^x");
        assert_eq!(key.subscripts().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(key, Key::from_components(&["^x", "a", "b"]));
    }

    #[test]
    fn key_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Key>();
    }
}
