//! Error types for YDB core.

use thiserror::Error;
use ydb_ffi::{is_undefined, status_name, YDB_ERR_INVSTRLEN};

/// Result type for engine calls.
pub type YdbResult<T> = Result<T, YdbError>;

/// A failed engine call: the status code and the engine's own text.
///
/// `Display` is exactly the engine's message, never decorated here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct YdbError {
    code: i32,
    message: String,
}

impl YdbError {
    /// Creates an error from a status code and message.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The engine status code (e.g. `YDB_ERR_GVUNDEF`).
    pub fn code(&self) -> i32 {
        self.code
    }

    /// The engine's message text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The status mnemonic, when known.
    pub fn status_name(&self) -> Option<&'static str> {
        status_name(self.code)
    }

    /// Returns true if the key had no value (global or local).
    pub fn is_undefined(&self) -> bool {
        is_undefined(self.code)
    }

    /// Returns true if a value did not fit the buffer offered for it.
    pub fn is_invstrlen(&self) -> bool {
        self.code == YDB_ERR_INVSTRLEN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ydb_ffi::{YDB_ERR_GVUNDEF, YDB_ERR_LVUNDEF};

    #[test]
    fn display_is_engine_text() {
        let text = "%YDB-E-GVUNDEF, Global variable undefined: ^x";
        let err = YdbError::new(YDB_ERR_GVUNDEF, text);
        assert_eq!(err.to_string(), text);
        assert_eq!(err.code(), YDB_ERR_GVUNDEF);
        assert_eq!(err.status_name(), Some("GVUNDEF"));
    }

    #[test]
    fn classification() {
        assert!(YdbError::new(YDB_ERR_LVUNDEF, "").is_undefined());
        assert!(YdbError::new(YDB_ERR_INVSTRLEN, "").is_invstrlen());
        assert!(!YdbError::new(-1, "").is_undefined());
        assert_eq!(YdbError::new(-1, "").status_name(), None);
    }
}
