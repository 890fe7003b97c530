//! In-memory engine for testing.

use crate::buffer::OwnedBuffer;
use crate::engine::Engine;
use crate::packed::PackedKey;
use crate::status::{
    status_description, status_name, YDB_ERR_GVUNDEF, YDB_ERR_INVSTRLEN, YDB_ERR_INVVARNAME,
    YDB_ERR_LVUNDEF, YDB_ERR_MAXNRSUBSCRIPTS, YDB_ERR_UNKNOWNSYSERR, YDB_MAX_IDENT, YDB_MAX_STR,
    YDB_MAX_SUBS, YDB_OK,
};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

type Path = Vec<Vec<u8>>;

/// An engine that keeps every node in a map.
///
/// It speaks the same buffer protocol as `libyottadb`, which makes it
/// suitable for:
/// - Unit and integration tests of the binding
/// - Exercising the `INVSTRLEN` retry path deterministically
/// - Ephemeral scratch databases (CLI scripts)
///
/// Names starting with `^` are globals and everything else is a local; both
/// live in the same map and are shared by every connection using the engine.
///
/// # Thread Safety
///
/// This engine is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use ydb_ffi::{Engine, InMemoryEngine, OwnedBuffer, PackedKey, YDB_NOTTP, YDB_OK};
///
/// let engine = InMemoryEngine::new();
/// let key = PackedKey::pack(&["^x", "a"]);
/// let mut errstr = OwnedBuffer::with_capacity(256);
/// let mut value = OwnedBuffer::with_capacity(16);
/// value.fill(b"42");
/// assert_eq!(engine.set(YDB_NOTTP, &mut errstr, &key, &value), YDB_OK);
///
/// value.clear();
/// assert_eq!(engine.get(YDB_NOTTP, &mut errstr, &key, &mut value), YDB_OK);
/// assert_eq!(value.as_bytes(), b"42");
/// ```
#[derive(Debug, Default)]
pub struct InMemoryEngine {
    nodes: RwLock<BTreeMap<Path, Vec<u8>>>,
    gets: AtomicU64,
    sets: AtomicU64,
}

/// A failed call: status plus the detail that follows the mnemonic.
struct Failure {
    status: i32,
    detail: String,
}

impl Failure {
    fn new(status: i32, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    /// Writes `150372994,(SimpleAPI),%YDB-E-GVUNDEF, <detail>` into `errstr`.
    fn report(self, errstr: &mut OwnedBuffer) -> i32 {
        let name = status_name(self.status).unwrap_or("UNKNOWN");
        let text = format!(
            "{},(SimpleAPI),%YDB-E-{}, {}",
            self.status.unsigned_abs(),
            name,
            self.detail
        );
        errstr.write_truncated(text.as_bytes());
        self.status
    }
}

impl InMemoryEngine {
    /// Creates an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes holding a value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    /// Returns true if no node holds a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    /// Number of `get` calls received, including failed ones.
    #[must_use]
    pub fn get_calls(&self) -> u64 {
        self.gets.load(Ordering::Relaxed)
    }

    /// Number of `set` calls received, including failed ones.
    #[must_use]
    pub fn set_calls(&self) -> u64 {
        self.sets.load(Ordering::Relaxed)
    }

    /// Removes every node.
    pub fn clear(&self) {
        self.nodes.write().clear();
    }

    fn validate(key: &PackedKey) -> Result<Path, Failure> {
        let varname = key.segment(0);
        let ident = varname.strip_prefix(b"^").unwrap_or(varname);
        let well_formed = match ident.split_first() {
            Some((first, rest)) => {
                (*first == b'%' || first.is_ascii_alphabetic())
                    && rest.iter().all(u8::is_ascii_alphanumeric)
                    && ident.len() <= YDB_MAX_IDENT
            }
            None => false,
        };
        if !well_formed {
            return Err(Failure::new(
                YDB_ERR_INVVARNAME,
                format!(
                    "{}: {}",
                    status_description(YDB_ERR_INVVARNAME).unwrap_or_default(),
                    String::from_utf8_lossy(varname)
                ),
            ));
        }

        let subs = key.len() - 1;
        if subs > YDB_MAX_SUBS {
            return Err(Failure::new(
                YDB_ERR_MAXNRSUBSCRIPTS,
                format!(
                    "{}: {subs} > {YDB_MAX_SUBS}",
                    status_description(YDB_ERR_MAXNRSUBSCRIPTS).unwrap_or_default()
                ),
            ));
        }

        Ok(key.segments().map(<[u8]>::to_vec).collect())
    }

    fn undefined(key: &PackedKey) -> Failure {
        let status = if key.segment(0).starts_with(b"^") {
            YDB_ERR_GVUNDEF
        } else {
            YDB_ERR_LVUNDEF
        };
        Failure::new(
            status,
            format!("{}: {key}", status_description(status).unwrap_or_default()),
        )
    }

    fn too_long(len: usize, max: usize) -> Failure {
        Failure::new(
            YDB_ERR_INVSTRLEN,
            format!(
                "{} {len}: max {max}",
                status_description(YDB_ERR_INVSTRLEN).unwrap_or_default()
            ),
        )
    }
}

impl Engine for InMemoryEngine {
    fn get(
        &self,
        _tptoken: u64,
        errstr: &mut OwnedBuffer,
        key: &PackedKey,
        out: &mut OwnedBuffer,
    ) -> i32 {
        self.gets.fetch_add(1, Ordering::Relaxed);
        let path = match Self::validate(key) {
            Ok(path) => path,
            Err(failure) => return failure.report(errstr),
        };

        let nodes = self.nodes.read();
        match nodes.get(&path) {
            None => Self::undefined(key).report(errstr),
            Some(value) if value.len() > out.capacity() => {
                out.report_required(value.len());
                Self::too_long(value.len(), out.capacity()).report(errstr)
            }
            Some(value) => {
                out.fill(value);
                YDB_OK
            }
        }
    }

    fn set(
        &self,
        _tptoken: u64,
        errstr: &mut OwnedBuffer,
        key: &PackedKey,
        value: &OwnedBuffer,
    ) -> i32 {
        self.sets.fetch_add(1, Ordering::Relaxed);
        let path = match Self::validate(key) {
            Ok(path) => path,
            Err(failure) => return failure.report(errstr),
        };
        if value.len_used() > YDB_MAX_STR {
            return Self::too_long(value.len_used(), YDB_MAX_STR).report(errstr);
        }

        self.nodes.write().insert(path, value.as_bytes().to_vec());
        YDB_OK
    }

    fn message(
        &self,
        _tptoken: u64,
        errstr: &mut OwnedBuffer,
        status: i32,
        out: &mut OwnedBuffer,
    ) -> i32 {
        match (status_name(status), status_description(status)) {
            (Some(name), Some(text)) => {
                let msg = format!("%YDB-E-{name}, {text}");
                out.write_truncated(msg.as_bytes());
                YDB_OK
            }
            _ => Failure::new(YDB_ERR_UNKNOWNSYSERR, format!("status {status}")).report(errstr),
        }
    }
}
