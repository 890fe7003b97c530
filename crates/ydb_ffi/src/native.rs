//! Linkage to the real `libyottadb` SimpleAPI.

use crate::buffer::{OwnedBuffer, YdbBuffer};
use crate::engine::Engine;
use crate::packed::PackedKey;
use std::ffi::c_int;

#[link(name = "yottadb")]
extern "C" {
    fn ydb_get_st(
        tptoken: u64,
        errstr: *mut YdbBuffer,
        varname: *const YdbBuffer,
        subs_used: c_int,
        subsarray: *const YdbBuffer,
        ret_value: *mut YdbBuffer,
    ) -> c_int;

    fn ydb_set_st(
        tptoken: u64,
        errstr: *mut YdbBuffer,
        varname: *const YdbBuffer,
        subs_used: c_int,
        subsarray: *const YdbBuffer,
        value: *const YdbBuffer,
    ) -> c_int;

    fn ydb_message_t(
        tptoken: u64,
        errstr: *mut YdbBuffer,
        status: c_int,
        msg_buff: *mut YdbBuffer,
    ) -> c_int;
}

/// The process-wide YottaDB engine.
///
/// Stateless: all per-thread state travels in the caller's buffers and
/// call token.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeEngine {
    _private: (),
}

impl NativeEngine {
    /// Returns a handle to the linked engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn subs_used(key: &PackedKey) -> c_int {
    c_int::try_from(key.len() - 1).expect("YDB: subscript count exceeds c_int")
}

impl Engine for NativeEngine {
    fn get(
        &self,
        tptoken: u64,
        errstr: &mut OwnedBuffer,
        key: &PackedKey,
        out: &mut OwnedBuffer,
    ) -> i32 {
        // SAFETY: every descriptor is backed by memory owned by `key`,
        // `errstr` or `out` for the duration of the call, and the engine
        // writes only within `len_alloc` of the output buffers.
        unsafe {
            ydb_get_st(
                tptoken,
                errstr.as_mut_ptr(),
                key.varname_descriptor(),
                subs_used(key),
                key.subscript_descriptors().as_ptr(),
                out.as_mut_ptr(),
            )
        }
    }

    fn set(
        &self,
        tptoken: u64,
        errstr: &mut OwnedBuffer,
        key: &PackedKey,
        value: &OwnedBuffer,
    ) -> i32 {
        // SAFETY: as for `get`; `value` is only read.
        unsafe {
            ydb_set_st(
                tptoken,
                errstr.as_mut_ptr(),
                key.varname_descriptor(),
                subs_used(key),
                key.subscript_descriptors().as_ptr(),
                value.as_ptr(),
            )
        }
    }

    fn message(
        &self,
        tptoken: u64,
        errstr: &mut OwnedBuffer,
        status: i32,
        out: &mut OwnedBuffer,
    ) -> i32 {
        // SAFETY: both descriptors describe buffers owned by the caller.
        unsafe { ydb_message_t(tptoken, errstr.as_mut_ptr(), status, out.as_mut_ptr()) }
    }
}
