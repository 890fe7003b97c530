//! Per-thread call context.

use crate::config::ConnConfig;
use crate::error::{YdbError, YdbResult};
use crate::node::{Key, Node};
use std::cell::{Cell, RefCell, RefMut};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};
use ydb_ffi::{status_name, Engine, OwnedBuffer, YDB_NOTTP, YDB_OK};

/// A connection: the call token plus the reusable buffers every engine call
/// on this thread goes through.
///
/// # Thread Safety
///
/// `Conn` is `Send` but not `Sync`. Create one per thread; the buffers are
/// shared by every call made through the connection, so two threads must
/// never use the same one at once.
///
/// # Buffer Lifetime
///
/// The value buffer is reused by every call. Anything read out of it is
/// copied before the call returns. Both buffers are released when the
/// connection is dropped, so the connection must outlive every [`Node`]
/// built from it (the borrow checker enforces this).
pub struct Conn {
    engine: Arc<dyn Engine>,
    config: ConnConfig,
    tptoken: Cell<u64>,
    errstr: RefCell<OwnedBuffer>,
    value: RefCell<OwnedBuffer>,
}

impl Conn {
    /// Creates a connection with default buffer sizes.
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self::with_config(engine, ConnConfig::default())
    }

    /// Creates a connection with the given buffer sizes.
    ///
    /// The value buffer never starts larger than `max_value_size`, so a
    /// `get` of a longer value always goes through the size check.
    /// Allocation failure aborts the process.
    pub fn with_config(engine: Arc<dyn Engine>, config: ConnConfig) -> Self {
        let value_capacity = config.value_buffer_capacity.min(config.max_value_size);
        trace!(
            error_buffer = config.error_buffer_capacity,
            value_buffer = value_capacity,
            "opening connection"
        );
        Self {
            errstr: RefCell::new(OwnedBuffer::with_capacity(config.error_buffer_capacity)),
            value: RefCell::new(OwnedBuffer::with_capacity(value_capacity)),
            tptoken: Cell::new(YDB_NOTTP),
            engine,
            config,
        }
    }

    /// Builds a node from a variable name and its subscripts.
    ///
    /// The components are copied into one fresh allocation owned by the
    /// node.
    pub fn node<V, S>(&self, varname: V, subscripts: &[S]) -> Node<'_>
    where
        V: AsRef<[u8]>,
        S: AsRef<[u8]>,
    {
        Key::new(varname, subscripts).bind(self)
    }

    /// Builds a node addressing an unsubscripted variable.
    pub fn var<V: AsRef<[u8]>>(&self, varname: V) -> Node<'_> {
        Key::new(varname, &[] as &[&[u8]]).bind(self)
    }

    /// Builds a node from its components; the first is the variable name.
    ///
    /// # Panics
    ///
    /// Panics if `components` is empty.
    pub fn node_from<S: AsRef<[u8]>>(&self, components: &[S]) -> Node<'_> {
        Key::from_components(components).bind(self)
    }

    /// The engine this connection calls.
    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    /// The configuration the connection was created with.
    pub fn config(&self) -> &ConnConfig {
        &self.config
    }

    /// The current call token; `YDB_NOTTP` outside a transaction.
    pub fn tptoken(&self) -> u64 {
        self.tptoken.get()
    }

    /// Replaces the call token used for subsequent calls.
    pub fn set_tptoken(&self, tptoken: u64) {
        self.tptoken.set(tptoken);
    }

    /// Capacity of the error buffer.
    pub fn error_buffer_capacity(&self) -> usize {
        self.errstr.borrow().capacity()
    }

    /// Current capacity of the value buffer.
    pub fn value_buffer_capacity(&self) -> usize {
        self.value.borrow().capacity()
    }

    /// Replaces the error buffer with one of `capacity` bytes.
    ///
    /// Any text in the old buffer is discarded.
    pub fn resize_error_buffer(&self, capacity: usize) {
        let mut errstr = self.errstr.borrow_mut();
        debug!(from = errstr.capacity(), to = capacity, "resizing error buffer");
        errstr.reallocate(capacity);
    }

    /// Translates a status code into a result.
    ///
    /// `YDB_OK` maps to `Ok(())`. Anything else becomes a [`YdbError`]
    /// carrying the code and a copy of the error buffer's text.
    pub fn check(&self, status: i32) -> YdbResult<()> {
        if status == YDB_OK {
            Ok(())
        } else {
            Err(self.error(status))
        }
    }

    /// Builds the error for a failed status.
    ///
    /// The text is copied out of the error buffer, which the next call
    /// overwrites. If the engine left the buffer empty, the engine's
    /// message for the code is used instead.
    pub fn error(&self, status: i32) -> YdbError {
        let captured = String::from_utf8_lossy(self.errstr.borrow().as_bytes()).into_owned();
        let message = if captured.is_empty() {
            self.describe(status)
        } else {
            captured
        };
        YdbError::new(status, message)
    }

    /// Asks the engine for the text of `status`.
    ///
    /// The text is limited to the current error buffer capacity. Falls back
    /// to the status mnemonic, or `status N` for codes this crate does not
    /// know.
    pub fn describe(&self, status: i32) -> String {
        let mut out = OwnedBuffer::with_capacity(self.error_buffer_capacity());
        let rc = {
            let mut errstr = self.errstr.borrow_mut();
            self.engine.message(self.tptoken(), &mut errstr, status, &mut out)
        };
        if rc == YDB_OK && !out.is_empty() {
            return String::from_utf8_lossy(out.as_bytes()).into_owned();
        }
        status_name(status).map_or_else(|| format!("status {status}"), str::to_owned)
    }

    /// Borrows the error buffer, cleared for the next call.
    pub(crate) fn error_buffer(&self) -> RefMut<'_, OwnedBuffer> {
        let mut errstr = self.errstr.borrow_mut();
        errstr.clear();
        errstr
    }

    /// Borrows the value buffer.
    pub(crate) fn value_buffer(&self) -> RefMut<'_, OwnedBuffer> {
        self.value.borrow_mut()
    }

    /// Grows `value` to hold at least `needed` bytes.
    ///
    /// Returns false, leaving the buffer alone, if `needed` is beyond
    /// `max_value_size`, even when the buffer already has room.
    pub(crate) fn grow_value(&self, value: &mut OwnedBuffer, needed: usize) -> bool {
        if needed > self.config.max_value_size {
            debug!(
                needed,
                max = self.config.max_value_size,
                "value exceeds connection limit"
            );
            return false;
        }
        if needed <= value.capacity() {
            return true;
        }
        debug!(from = value.capacity(), to = needed, "growing value buffer");
        value.reallocate(needed);
        true
    }
}

impl Drop for Conn {
    fn drop(&mut self) {
        trace!(
            error_buffer = self.errstr.get_mut().capacity(),
            value_buffer = self.value.get_mut().capacity(),
            "releasing connection buffers"
        );
    }
}

impl fmt::Debug for Conn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conn")
            .field("tptoken", &self.tptoken.get())
            .field("errstr", &self.errstr)
            .field("value", &self.value)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
