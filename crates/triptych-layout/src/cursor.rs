//! The bump cursor: aligned, append-only partitioning of a byte range.

use triptych_core::{ElemKind, Element};

use crate::error::LayoutError;
use crate::handle::{RawHandle, StridedHandle, ViewHandle};

/// A bump cursor over a fixed byte capacity.
///
/// The cursor only ever advances. Before each allocation it is rounded
/// up to the element kind's natural alignment, so every handed-out view
/// starts on a boundary valid for its element type regardless of what
/// was allocated before it.
///
/// Allocation failure is a configuration error: the schema does not fit
/// the region it was sized for. There is no recovery path and no
/// deallocation.
#[derive(Clone, Debug)]
pub struct Cursor {
    capacity: usize,
    offset: usize,
}

impl Cursor {
    /// Create a cursor over `capacity_bytes` with the cursor at zero.
    pub fn new(capacity_bytes: usize) -> Self {
        Self {
            capacity: capacity_bytes,
            offset: 0,
        }
    }

    /// Allocate `len` elements of `elem`, untyped.
    ///
    /// This is the runtime-kind path used when walking a schema; the
    /// typed [`Cursor::alloc`] wraps it.
    pub fn alloc_raw(&mut self, elem: ElemKind, len: usize) -> Result<RawHandle, LayoutError> {
        let align = elem.align_bytes();
        // align is 1, 4, or 8 — always a power of two.
        let aligned = self
            .offset
            .checked_add(align - 1)
            .map(|v| v & !(align - 1))
            .ok_or(LayoutError::CapacityExceeded {
                requested: usize::MAX,
                capacity: self.capacity,
            })?;

        let bytes = len
            .checked_mul(elem.size_bytes())
            .ok_or(LayoutError::CapacityExceeded {
                requested: usize::MAX,
                capacity: self.capacity,
            })?;

        let end = aligned
            .checked_add(bytes)
            .ok_or(LayoutError::CapacityExceeded {
                requested: usize::MAX,
                capacity: self.capacity,
            })?;

        if end > self.capacity {
            return Err(LayoutError::CapacityExceeded {
                requested: end - self.offset,
                capacity: self.capacity,
            });
        }

        self.offset = end;
        Ok(RawHandle::new(aligned, len, elem))
    }

    /// Allocate a typed view of `count` elements at the aligned cursor.
    pub fn alloc<T: Element>(&mut self, count: usize) -> Result<ViewHandle<T>, LayoutError> {
        let raw = self.alloc_raw(T::KIND, count)?;
        Ok(ViewHandle::new(raw.offset_bytes(), count))
    }

    /// Allocate `count` consecutively-packed sub-views of `stride`
    /// elements each (structure-of-arrays, indexed by entity).
    pub fn alloc_strided<T: Element>(
        &mut self,
        stride: usize,
        count: usize,
    ) -> Result<StridedHandle<T>, LayoutError> {
        let total = stride
            .checked_mul(count)
            .ok_or(LayoutError::CapacityExceeded {
                requested: usize::MAX,
                capacity: self.capacity,
            })?;
        let base = self.alloc::<T>(total)?;
        Ok(StridedHandle::new(base, stride, count))
    }

    /// Bytes consumed so far, including alignment padding.
    pub fn used(&self) -> usize {
        self.offset
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes remaining before the capacity is exhausted.
    pub fn remaining(&self) -> usize {
        self.capacity - self.offset
    }
}
