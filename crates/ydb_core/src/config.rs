//! Connection configuration.

use ydb_ffi::{YDB_MAX_ERRORMSG, YDB_MAX_STR};

/// Initial size of each connection's value buffer.
pub const DEFAULT_VALUE_BUFFER_CAPACITY: usize = 1024;

/// Buffer sizes for a [`Conn`](crate::Conn).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnConfig {
    /// Capacity of the buffer the engine writes error text into.
    pub error_buffer_capacity: usize,

    /// Initial capacity of the value buffer; it grows on demand.
    pub value_buffer_capacity: usize,

    /// Largest value the connection will transfer.
    ///
    /// Setting a longer value is a usage error. A `get` never grows the
    /// value buffer beyond this.
    pub max_value_size: usize,
}

impl Default for ConnConfig {
    fn default() -> Self {
        Self {
            error_buffer_capacity: YDB_MAX_ERRORMSG,
            value_buffer_capacity: DEFAULT_VALUE_BUFFER_CAPACITY,
            max_value_size: YDB_MAX_STR,
        }
    }
}

impl ConnConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the error buffer capacity.
    #[must_use]
    pub const fn error_buffer_capacity(mut self, capacity: usize) -> Self {
        self.error_buffer_capacity = capacity;
        self
    }

    /// Sets the initial value buffer capacity.
    #[must_use]
    pub const fn value_buffer_capacity(mut self, capacity: usize) -> Self {
        self.value_buffer_capacity = capacity;
        self
    }

    /// Sets the largest value the connection will transfer.
    #[must_use]
    pub const fn max_value_size(mut self, size: usize) -> Self {
        self.max_value_size = size;
        self
    }
}
