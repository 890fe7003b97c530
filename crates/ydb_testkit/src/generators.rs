//! Property-based test generators using proptest.
//!
//! Provides strategies for generating keys and values that the in-memory
//! engine accepts.

use proptest::prelude::*;
use ydb_ffi::{YDB_MAX_IDENT, YDB_MAX_SUBS};

/// Strategy for local variable names.
pub fn local_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex(&format!("[%a-zA-Z][a-zA-Z0-9]{{0,{}}}", YDB_MAX_IDENT - 1))
        .expect("Invalid regex")
}

/// Strategy for global variable names (`^` prefixed).
pub fn global_name_strategy() -> impl Strategy<Value = String> {
    local_name_strategy().prop_map(|name| format!("^{name}"))
}

/// Strategy for any variable name.
pub fn varname_strategy() -> impl Strategy<Value = String> {
    prop_oneof![local_name_strategy(), global_name_strategy()]
}

/// Strategy for one subscript: printable text, including the `("` and `")`
/// sequences of the display form.
pub fn subscript_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[ -~]{0,16}",
        1 => Just("(\"".to_string()),
        1 => Just("\")".to_string()),
        1 => "[a-z]{0,4}\\(\"[a-z]{0,4}\"\\)",
    ]
}

/// Strategy for an ordered subscript list within the engine's limit.
pub fn subscripts_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(subscript_strategy(), 0..=YDB_MAX_SUBS.min(8))
}

/// Strategy for printable values up to `max_len` bytes.
pub fn value_strategy(max_len: usize) -> impl Strategy<Value = String> {
    prop::string::string_regex(&format!("[ -~]{{0,{max_len}}}")).expect("Invalid regex")
}

/// Renders a key the way `Display` does, from its parts.
pub fn expected_display(varname: &str, subscripts: &[String]) -> String {
    let mut out = varname.to_string();
    for sub in subscripts {
        out.push_str("(\"");
        out.push_str(sub);
        out.push_str("\")");
    }
    out
}
