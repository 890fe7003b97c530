//! Buffer descriptors and owned buffers for the SimpleAPI.

use std::alloc::{self, Layout};
use std::ffi::{c_char, c_uint};
use std::fmt;
use std::ptr::{self, NonNull};
use std::slice;

/// A `ydb_buffer_t`: one fixed region of bytes as the engine sees it.
///
/// `len_used` may exceed `len_alloc` only after the engine reported
/// `YDB_ERR_INVSTRLEN`, in which case it holds the length that was needed.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct YdbBuffer {
    /// Bytes available at `buf_addr`.
    pub len_alloc: c_uint,
    /// Bytes currently meaningful at `buf_addr`.
    pub len_used: c_uint,
    /// Start of the region.
    pub buf_addr: *mut c_char,
}

impl YdbBuffer {
    /// A descriptor pointing at nothing.
    pub const fn empty() -> Self {
        Self {
            len_alloc: 0,
            len_used: 0,
            buf_addr: ptr::null_mut(),
        }
    }

    /// Returns true if the descriptor has no backing region.
    pub fn is_null(&self) -> bool {
        self.buf_addr.is_null()
    }
}

impl Default for YdbBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

/// Converts a Rust length into a descriptor length field.
///
/// # Panics
///
/// Panics if `len` does not fit in a `c_uint`.
pub(crate) fn c_len(len: usize) -> c_uint {
    c_uint::try_from(len).unwrap_or_else(|_| panic!("YDB: length {len} exceeds descriptor range"))
}

/// A heap region at a stable address together with the descriptor that
/// describes it.
///
/// The region never moves while the `OwnedBuffer` exists, so the descriptor
/// can be handed to the engine at any time. Growing replaces the region
/// outright. The allocation is released exactly once, when the buffer is
/// dropped or reallocated.
pub struct OwnedBuffer {
    desc: YdbBuffer,
    layout: Option<Layout>,
}

// SAFETY: OwnedBuffer exclusively owns its allocation; shared references
// only read it.
unsafe impl Send for OwnedBuffer {}
unsafe impl Sync for OwnedBuffer {}

impl OwnedBuffer {
    /// Allocates a zeroed buffer of `capacity` bytes.
    ///
    /// Allocation failure aborts the process.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` does not fit in a descriptor.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let len_alloc = c_len(capacity);
        if capacity == 0 {
            return Self {
                desc: YdbBuffer {
                    len_alloc,
                    len_used: 0,
                    buf_addr: NonNull::<c_char>::dangling().as_ptr(),
                },
                layout: None,
            };
        }

        let layout = Layout::array::<u8>(capacity).expect("YDB: invalid buffer layout");
        // SAFETY: layout has non-zero size.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let Some(addr) = NonNull::new(raw) else {
            alloc::handle_alloc_error(layout);
        };

        Self {
            desc: YdbBuffer {
                len_alloc,
                len_used: 0,
                buf_addr: addr.as_ptr().cast(),
            },
            layout: Some(layout),
        }
    }

    /// Bytes available in the region.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.desc.len_alloc as usize
    }

    /// The raw `len_used` field.
    ///
    /// After an `INVSTRLEN` report this is the length the engine needed and
    /// may exceed [`capacity`](Self::capacity).
    #[inline]
    pub fn len_used(&self) -> usize {
        self.desc.len_used as usize
    }

    /// Returns true if the buffer holds no meaningful bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.desc.len_used == 0
    }

    /// The meaningful bytes, clamped to the capacity.
    ///
    /// Valid only until the next call that writes this buffer; copy out
    /// anything that must outlive it.
    pub fn as_bytes(&self) -> &[u8] {
        let len = self.len_used().min(self.capacity());
        if len == 0 {
            return &[];
        }
        // SAFETY: buf_addr points at `capacity` initialized (zeroed or
        // written) bytes owned by self, and len <= capacity.
        unsafe { slice::from_raw_parts(self.desc.buf_addr.cast::<u8>(), len) }
    }

    /// Copies `bytes` into the buffer and records their length.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is longer than the capacity.
    pub fn fill(&mut self, bytes: &[u8]) {
        assert!(
            bytes.len() <= self.capacity(),
            "YDB: {} bytes do not fit in a {}-byte buffer",
            bytes.len(),
            self.capacity()
        );
        self.copy_in(bytes);
    }

    /// Copies as much of `bytes` as fits and returns the number copied.
    pub fn write_truncated(&mut self, bytes: &[u8]) -> usize {
        let len = bytes.len().min(self.capacity());
        self.copy_in(&bytes[..len]);
        len
    }

    /// Records that `required` bytes were needed without touching the data.
    pub fn report_required(&mut self, required: usize) {
        self.desc.len_used = c_uint::try_from(required).unwrap_or(c_uint::MAX);
    }

    /// Replaces the region with a fresh one of `capacity` bytes.
    ///
    /// The old region is freed and its contents are discarded.
    pub fn reallocate(&mut self, capacity: usize) {
        *self = Self::with_capacity(capacity);
    }

    /// Marks the buffer as holding no bytes.
    pub fn clear(&mut self) {
        self.desc.len_used = 0;
    }

    /// The descriptor for this buffer.
    #[inline]
    pub fn descriptor(&self) -> &YdbBuffer {
        &self.desc
    }

    /// Pointer to the descriptor for read-only engine arguments.
    #[inline]
    pub fn as_ptr(&self) -> *const YdbBuffer {
        &self.desc
    }

    /// Pointer to the descriptor for engine output arguments.
    ///
    /// The engine may write up to `len_alloc` bytes at `buf_addr` and set
    /// `len_used`; it must not change the other fields.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut YdbBuffer {
        &mut self.desc
    }

    fn copy_in(&mut self, bytes: &[u8]) {
        if !bytes.is_empty() {
            // SAFETY: bytes.len() <= capacity, the regions cannot overlap
            // because self owns its allocation exclusively.
            unsafe {
                ptr::copy_nonoverlapping(
                    bytes.as_ptr(),
                    self.desc.buf_addr.cast::<u8>(),
                    bytes.len(),
                );
            }
        }
        self.desc.len_used = c_len(bytes.len());
    }
}

impl Drop for OwnedBuffer {
    fn drop(&mut self) {
        if let Some(layout) = self.layout.take() {
            // SAFETY: allocated in with_capacity with this layout and not
            // freed before; `take` makes a second release impossible.
            unsafe { alloc::dealloc(self.desc.buf_addr.cast::<u8>(), layout) };
        }
        self.desc = YdbBuffer::empty();
    }
}

impl fmt::Debug for OwnedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedBuffer")
            .field("capacity", &self.capacity())
            .field("len_used", &self.len_used())
            .finish()
    }
}
