//! The native call surface.

use crate::buffer::OwnedBuffer;
use crate::packed::PackedKey;

/// The SimpleAPI calls a binding issues against a database engine.
///
/// Every method is synchronous and returns a status code: `YDB_OK` on
/// success, otherwise a code whose text the engine has written into
/// `errstr` (truncated to its capacity).
///
/// Keys arrive as the packed descriptor array. Implementations split it as
/// descriptor 0 = variable name and descriptors `1..` = subscripts.
///
/// # Invariants
///
/// - On `YDB_ERR_INVSTRLEN` from `get`, `out.len_used()` holds the length
///   that was needed and no bytes were copied
/// - Engines never retain a reference to any buffer past the call
/// - Engines must be `Send + Sync`; per-thread state lives in the caller's
///   buffers, never in the engine
///
/// # Implementors
///
/// - [`super::InMemoryEngine`] - For testing and ephemeral use
/// - `NativeEngine` - The real `libyottadb` (feature `libyottadb`)
pub trait Engine: Send + Sync {
    /// Reads the value of `key` into `out` (`ydb_get_st`).
    fn get(
        &self,
        tptoken: u64,
        errstr: &mut OwnedBuffer,
        key: &PackedKey,
        out: &mut OwnedBuffer,
    ) -> i32;

    /// Stores the used bytes of `value` at `key` (`ydb_set_st`).
    fn set(&self, tptoken: u64, errstr: &mut OwnedBuffer, key: &PackedKey, value: &OwnedBuffer)
        -> i32;

    /// Writes the engine's text for `status` into `out` (`ydb_message_t`).
    fn message(&self, tptoken: u64, errstr: &mut OwnedBuffer, status: i32, out: &mut OwnedBuffer)
        -> i32;
}
