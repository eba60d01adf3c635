//! Interior-mutable shared byte regions.
//!
//! A [`Region`] is one of the three physical buffers of a channel:
//! fixed capacity, zero-initialised, allocated once and never resized.
//! Regions hold plain (non-atomic) data; exclusivity is governed by the
//! channel's role rotation, not by any per-region synchronisation.
//!
//! This module contains the workspace's only `unsafe` code: resolving a
//! byte range into a typed slice. The backing storage is 8-byte-aligned
//! `u64` words so that any naturally-aligned offset produced by the
//! layout cursor yields a validly-aligned slice for every element kind.

use std::cell::UnsafeCell;
use std::sync::Arc;

use triptych_core::Element;

/// Storage word size; the widest supported element alignment.
const WORD_BYTES: usize = 8;

/// A fixed-capacity shared memory region.
///
/// `Sync` by discipline: at any instant the channel's control word
/// assigns this region to at most one role, and only the holder of the
/// write role creates mutable slices into it.
pub struct Region {
    words: Box<[UnsafeCell<u64>]>,
    len: usize,
}

// SAFETY: all mutation goes through the unsafe slice methods, whose
// callers (the channel's producer/consumer halves) guarantee that a
// region is never written and read concurrently. The role-permutation
// invariant of the control word is what delivers that guarantee.
#[allow(unsafe_code)]
unsafe impl Send for Region {}
#[allow(unsafe_code)]
unsafe impl Sync for Region {}

impl Region {
    /// Allocate a zero-filled region of `capacity_bytes`.
    pub fn new(capacity_bytes: usize) -> Self {
        let word_count = capacity_bytes.div_ceil(WORD_BYTES);
        let words = (0..word_count).map(|_| UnsafeCell::new(0)).collect();
        Self {
            words,
            len: capacity_bytes,
        }
    }

    /// Region capacity in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the region has zero capacity.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn base_ptr(&self) -> *mut u8 {
        // raw_get avoids materialising a reference to the cell contents.
        #[allow(unsafe_code)]
        UnsafeCell::raw_get(self.words.as_ptr()).cast::<u8>()
    }

    fn check_range<T: Element>(&self, offset: usize, len: usize) {
        let elem = T::KIND;
        assert_eq!(
            offset % elem.align_bytes(),
            0,
            "offset {offset} not aligned for {elem}"
        );
        let bytes = len
            .checked_mul(elem.size_bytes())
            .and_then(|b| b.checked_add(offset));
        assert!(
            bytes.is_some_and(|end| end <= self.len),
            "range {offset}+{len}×{} out of region of {} bytes",
            elem.size_bytes(),
            self.len
        );
    }

    /// Resolve a byte range into a shared typed slice.
    ///
    /// # Safety
    ///
    /// The caller must guarantee that no mutable slice overlapping this
    /// range exists for the lifetime of the returned borrow. The
    /// channel upholds this by only resolving shared slices in the
    /// read-role region, which the producer never writes.
    ///
    /// # Panics
    ///
    /// Panics if the range is misaligned or out of bounds.
    #[allow(unsafe_code)]
    pub(crate) unsafe fn slice<T: Element>(&self, offset: usize, len: usize) -> &[T] {
        self.check_range::<T>(offset, len);
        let ptr = self.base_ptr().add(offset).cast::<T>();
        std::slice::from_raw_parts(ptr, len)
    }

    /// Resolve a byte range into a mutable typed slice.
    ///
    /// # Safety
    ///
    /// The caller must guarantee exclusive access to this range for the
    /// lifetime of the returned borrow. The channel upholds this by
    /// only resolving mutable slices in the write-role region, which it
    /// alone addresses, from a `&mut Producer`.
    ///
    /// # Panics
    ///
    /// Panics if the range is misaligned or out of bounds.
    #[allow(unsafe_code)]
    #[allow(clippy::mut_from_ref)]
    pub(crate) unsafe fn slice_mut<T: Element>(&self, offset: usize, len: usize) -> &mut [T] {
        self.check_range::<T>(offset, len);
        let ptr = self.base_ptr().add(offset).cast::<T>();
        std::slice::from_raw_parts_mut(ptr, len)
    }
}

/// A region shared between the two sides of a channel.
pub type SharedRegion = Arc<Region>;

// Compile-time assertion: Region must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<Region>();
};

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;

    #[test]
    fn new_region_is_zero_filled() {
        let r = Region::new(64);
        let bytes = unsafe { r.slice::<u8>(0, 64) };
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn capacity_is_exact_even_when_not_word_multiple() {
        let r = Region::new(13);
        assert_eq!(r.len(), 13);
        assert!(unsafe { r.slice::<u8>(0, 13) }.len() == 13);
    }

    #[test]
    fn writes_read_back_through_typed_views() {
        let r = Region::new(64);
        unsafe {
            let floats = r.slice_mut::<f32>(16, 3);
            floats.copy_from_slice(&[1.0, 2.0, 3.0]);
        }
        let read = unsafe { r.slice::<f32>(16, 3) };
        assert_eq!(read, &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn f64_views_are_aligned() {
        let r = Region::new(64);
        let v = unsafe { r.slice::<f64>(8, 2) };
        assert_eq!(v.as_ptr() as usize % 8, 0);
    }

    #[test]
    #[should_panic(expected = "not aligned")]
    fn misaligned_offset_panics() {
        let r = Region::new(64);
        let _ = unsafe { r.slice::<f32>(2, 1) };
    }

    #[test]
    #[should_panic(expected = "out of region")]
    fn out_of_bounds_panics() {
        let r = Region::new(16);
        let _ = unsafe { r.slice::<f32>(8, 3) };
    }

    #[test]
    fn empty_region_resolves_empty_slices() {
        let r = Region::new(0);
        assert!(r.is_empty());
        assert!(unsafe { r.slice::<u8>(0, 0) }.is_empty());
    }
}
