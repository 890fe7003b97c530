//! # YDB Testkit
//!
//! Test utilities for the YDB binding.
//!
//! This crate provides:
//! - Connection fixtures backed by an in-memory engine
//! - Property-based test generators using proptest
//! - Multi-threaded stress helpers (one connection per thread)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ydb_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_conn() {
//!     with_memory_conn(|conn| {
//!         conn.node("^x", &["a"]).set("1").unwrap();
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
