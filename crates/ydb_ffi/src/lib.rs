//! # YDB FFI
//!
//! The C call boundary between Rust and the YottaDB SimpleAPI.
//!
//! This crate provides:
//! - The `ydb_buffer_t` descriptor and owned, stable-address buffers
//! - Single-allocation packing of keys into descriptor arrays
//! - Status codes and limits
//! - The [`Engine`] trait: the native calls a binding issues
//!
//! ## Available Engines
//!
//! - [`InMemoryEngine`] - For testing and ephemeral use
//! - `NativeEngine` - The linked `libyottadb` (feature `libyottadb`)
//!
//! ## Memory Ownership
//!
//! Every byte a descriptor points at is owned by an [`OwnedBuffer`] or a
//! [`PackedKey`] on the Rust side. Those types never move their regions
//! while alive and release them exactly once on drop, so a descriptor is
//! valid for as long as its owner is borrowed.

#![warn(missing_docs)]

mod buffer;
mod engine;
mod memory;
#[cfg(feature = "libyottadb")]
mod native;
mod packed;
pub mod status;

pub use buffer::{OwnedBuffer, YdbBuffer};
pub use engine::Engine;
pub use memory::InMemoryEngine;
#[cfg(feature = "libyottadb")]
pub use native::NativeEngine;
pub use packed::PackedKey;
pub use status::{
    is_undefined, status_description, status_name, YDB_ERR_GVUNDEF, YDB_ERR_INVSTRLEN,
    YDB_ERR_INVVARNAME, YDB_ERR_LVUNDEF, YDB_ERR_MAXNRSUBSCRIPTS, YDB_ERR_UNKNOWNSYSERR,
    YDB_MAX_ERRORMSG, YDB_MAX_IDENT, YDB_MAX_STR, YDB_MAX_SUBS, YDB_NOTTP, YDB_OK,
};
