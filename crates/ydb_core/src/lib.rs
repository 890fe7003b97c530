//! # YDB Core
//!
//! Safe Rust access to a YottaDB database through its SimpleAPI.
//!
//! This crate provides:
//! - [`Conn`] - a per-thread call context (call token plus reusable error
//!   and value buffers)
//! - [`Key`] and [`Node`] - database keys packed once into a single
//!   allocation the engine reads directly
//! - [`YdbError`] - engine status codes with the engine's own message
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use ydb_core::Conn;
//! use ydb_ffi::InMemoryEngine;
//!
//! let conn = Conn::new(Arc::new(InMemoryEngine::new()));
//! let n = conn.node("var", &["sub1", "sub2"]);
//! assert_eq!(n.to_string(), "var(\"sub1\")(\"sub2\")");
//!
//! n.set("3").unwrap();
//! assert_eq!(n.get().unwrap(), "3");
//! assert_eq!(conn.node("var", &["nope"]).get_or("fallback").unwrap(), "fallback");
//! ```
//!
//! ## Lifetimes
//!
//! Every native allocation (buffers, packed keys) is owned by a Rust value
//! and released in its `Drop`, exactly once. A [`Node`] borrows its
//! [`Conn`], so a connection cannot be dropped while nodes still use it.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod conn;
mod error;
mod node;

pub use config::{ConnConfig, DEFAULT_VALUE_BUFFER_CAPACITY};
pub use conn::Conn;
pub use error::{YdbError, YdbResult};
pub use node::{Key, Node};

/// Release of this binding.
pub const WRAPPER_RELEASE: &str = env!("CARGO_PKG_VERSION");

/// Oldest YottaDB release this binding supports.
pub const MINIMUM_YDB_RELEASE: &str = "r1.34";
