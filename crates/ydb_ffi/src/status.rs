//! Status codes and limits of the YottaDB SimpleAPI.
//!
//! Values mirror `libyottadb.h` and `libydberrors.h`. Only the codes this
//! binding interprets are named here; every other nonzero status is opaque
//! and its text comes from the error buffer.

/// Successful completion.
pub const YDB_OK: i32 = 0;

/// Call token meaning "not inside a transaction".
pub const YDB_NOTTP: u64 = 0;

/// Global variable undefined.
pub const YDB_ERR_GVUNDEF: i32 = -150_372_994;

/// Local variable undefined.
pub const YDB_ERR_LVUNDEF: i32 = -150_373_850;

/// Output buffer too small; the required length is reported in `len_used`.
pub const YDB_ERR_INVSTRLEN: i32 = -150_375_522;

/// Malformed variable name.
pub const YDB_ERR_INVVARNAME: i32 = -151_027_762;

/// More subscripts than the engine supports.
pub const YDB_ERR_MAXNRSUBSCRIPTS: i32 = -150_373_282;

/// A status code the engine has no message for.
pub const YDB_ERR_UNKNOWNSYSERR: i32 = -150_381_338;

/// Capacity the engine expects for an error-message buffer.
pub const YDB_MAX_ERRORMSG: usize = 1024;

/// Largest value the engine will store (1 MiB).
pub const YDB_MAX_STR: usize = 1024 * 1024;

/// Maximum number of subscripts on one node.
pub const YDB_MAX_SUBS: usize = 31;

/// Significant characters in a variable name, excluding any `^`.
pub const YDB_MAX_IDENT: usize = 31;

// (code, mnemonic, description)
const STATUSES: &[(i32, &str, &str)] = &[
    (YDB_OK, "YDB_OK", "Normal return"),
    (YDB_ERR_GVUNDEF, "GVUNDEF", "Global variable undefined"),
    (YDB_ERR_LVUNDEF, "LVUNDEF", "Undefined local variable"),
    (YDB_ERR_INVSTRLEN, "INVSTRLEN", "Invalid string length"),
    (
        YDB_ERR_INVVARNAME,
        "INVVARNAME",
        "Invalid local or global variable name supplied to API call",
    ),
    (
        YDB_ERR_MAXNRSUBSCRIPTS,
        "MAXNRSUBSCRIPTS",
        "Maximum number of subscripts exceeded",
    ),
    (YDB_ERR_UNKNOWNSYSERR, "UNKNOWNSYSERR", "Unknown system error"),
];

fn lookup(code: i32) -> Option<&'static (i32, &'static str, &'static str)> {
    STATUSES.iter().find(|(known, _, _)| *known == code)
}

/// Returns the mnemonic for a status code, if it is one this crate knows.
pub fn status_name(code: i32) -> Option<&'static str> {
    lookup(code).map(|(_, name, _)| *name)
}

/// Returns the one-line description of a known status code.
pub fn status_description(code: i32) -> Option<&'static str> {
    lookup(code).map(|(_, _, text)| *text)
}

/// Returns true for either "variable undefined" status.
pub fn is_undefined(code: i32) -> bool {
    code == YDB_ERR_GVUNDEF || code == YDB_ERR_LVUNDEF
}
