//! Single-allocation packing of a hierarchical key.
//!
//! A key (variable name plus ordered subscripts) is stored as one heap block:
//!
//! ```text
//! +----------------+----------------+-----+-----------------------------+
//! | YdbBuffer [0]  | YdbBuffer [1]  | ... | varname | sub1 | sub2 | ... |
//! +----------------+----------------+-----+-----------------------------+
//!        |                 |                   ^         ^
//!        +-----------------|-------------------+         |
//!                          +-----------------------------+
//! ```
//!
//! Descriptor `i` points at component `i` inside the trailing data region,
//! with `len_alloc == len_used ==` the component's byte length. The engine
//! reads the descriptor array directly; descriptor 0 is the variable name and
//! the rest are the subscript array.

use crate::buffer::{c_len, YdbBuffer};
use std::alloc::{self, Layout};
use std::fmt;
use std::iter;
use std::ptr::{self, NonNull};
use std::slice;

/// An immutable, packed key: descriptor array and backing bytes in one
/// allocation, released together.
pub struct PackedKey {
    block: NonNull<u8>,
    layout: Layout,
    count: usize,
    data_offset: usize,
    data_len: usize,
}

// SAFETY: the block is owned exclusively and never written after `build`.
unsafe impl Send for PackedKey {}
unsafe impl Sync for PackedKey {}

#[allow(clippy::len_without_is_empty)]
impl PackedKey {
    /// Packs `components` in order; the first is the variable name.
    ///
    /// # Panics
    ///
    /// Panics if `components` is empty or a component is longer than a
    /// descriptor can describe.
    pub fn pack<S: AsRef<[u8]>>(components: &[S]) -> Self {
        Self::build(components.iter().map(AsRef::as_ref))
    }

    /// Packs a variable name followed by its subscripts.
    pub fn with_subscripts<S: AsRef<[u8]>>(varname: &[u8], subscripts: &[S]) -> Self {
        Self::build(iter::once(varname).chain(subscripts.iter().map(AsRef::as_ref)))
    }

    fn build<'a, I>(parts: I) -> Self
    where
        I: Iterator<Item = &'a [u8]> + Clone,
    {
        let mut count = 0usize;
        let mut data_len = 0usize;
        for part in parts.clone() {
            c_len(part.len());
            count += 1;
            data_len = data_len
                .checked_add(part.len())
                .expect("YDB: key data length overflow");
        }
        assert!(
            count > 0,
            "YDB: supply a key with at least one component (the variable name)"
        );

        let (layout, data_offset) = Layout::array::<YdbBuffer>(count)
            .and_then(|descs| descs.extend(Layout::array::<u8>(data_len)?))
            .expect("YDB: key too large to allocate");
        let layout = layout.pad_to_align();

        // SAFETY: layout is non-zero sized (count >= 1 descriptor).
        let raw = unsafe { alloc::alloc(layout) };
        let Some(block) = NonNull::new(raw) else {
            alloc::handle_alloc_error(layout);
        };

        let descs = raw.cast::<YdbBuffer>();
        let mut offset = 0usize;
        for (i, part) in parts.take(count).enumerate() {
            // SAFETY: i < count descriptors and offset + part.len() <=
            // data_len bytes were reserved in the block; the source slice
            // is caller memory and cannot overlap the fresh block.
            unsafe {
                let addr = raw.add(data_offset + offset);
                ptr::copy_nonoverlapping(part.as_ptr(), addr, part.len());
                descs.add(i).write(YdbBuffer {
                    len_alloc: c_len(part.len()),
                    len_used: c_len(part.len()),
                    buf_addr: addr.cast(),
                });
            }
            offset += part.len();
        }

        Self {
            block,
            layout,
            count,
            data_offset,
            data_len,
        }
    }

    /// Number of components, variable name included. Always at least 1.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// The whole descriptor array.
    #[inline]
    pub fn descriptors(&self) -> &[YdbBuffer] {
        // SAFETY: `count` descriptors were written at the start of the block.
        unsafe { slice::from_raw_parts(self.block.as_ptr().cast::<YdbBuffer>(), self.count) }
    }

    /// Descriptor of the variable name.
    #[inline]
    pub fn varname_descriptor(&self) -> &YdbBuffer {
        &self.descriptors()[0]
    }

    /// Descriptors of the subscripts, in order.
    #[inline]
    pub fn subscript_descriptors(&self) -> &[YdbBuffer] {
        &self.descriptors()[1..]
    }

    /// Bytes of component `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn segment(&self, index: usize) -> &[u8] {
        let desc = &self.descriptors()[index];
        // SAFETY: every descriptor points inside the data region of the
        // block with len_used bytes initialized by `build`.
        unsafe { slice::from_raw_parts(desc.buf_addr.cast::<u8>(), desc.len_used as usize) }
    }

    /// All components in order.
    pub fn segments(&self) -> impl Iterator<Item = &[u8]> + Clone + '_ {
        (0..self.count).map(move |i| self.segment(i))
    }

    /// The concatenated backing bytes of every component.
    pub fn data(&self) -> &[u8] {
        // SAFETY: data_len bytes starting at data_offset were initialized.
        unsafe {
            slice::from_raw_parts(self.block.as_ptr().add(self.data_offset), self.data_len)
        }
    }
}

impl Drop for PackedKey {
    fn drop(&mut self) {
        // SAFETY: allocated in `build` with this layout; drop runs once.
        unsafe { alloc::dealloc(self.block.as_ptr(), self.layout) };
    }
}

impl Clone for PackedKey {
    fn clone(&self) -> Self {
        Self::build(self.segments())
    }
}

impl PartialEq for PackedKey {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count && self.segments().eq(other.segments())
    }
}

impl Eq for PackedKey {}

impl fmt::Debug for PackedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.segments().map(String::from_utf8_lossy))
            .finish()
    }
}

/// Renders the key as `varname("sub1")("sub2")`, decoding each component
/// from its descriptor.
impl fmt::Display for PackedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut segments = self.segments();
        if let Some(varname) = segments.next() {
            f.write_str(&String::from_utf8_lossy(varname))?;
        }
        for sub in segments {
            write!(f, "(\"{}\")", String::from_utf8_lossy(sub))?;
        }
        Ok(())
    }
}
