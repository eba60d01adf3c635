//! View handles: non-owning windows into a buffer's byte range.
//!
//! A handle encodes where a view lives (byte offset, element count,
//! element kind) without borrowing any memory. The channel crate
//! resolves handles into concrete slices against whichever region
//! currently holds the write or read role.

use std::fmt;
use std::marker::PhantomData;

use triptych_core::{ElemKind, Element, EntityId};

use crate::error::LayoutError;

/// Untyped location of a view within a region.
///
/// Stored in the [`ViewTable`](crate::table::ViewTable); converted to a
/// typed handle via [`RawHandle::typed`], which checks the element kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct RawHandle {
    /// Byte offset of the view's first element within the region.
    pub(crate) offset: usize,
    /// Length of the view in elements.
    pub(crate) len: usize,
    /// Declared element kind.
    pub(crate) elem: ElemKind,
}

impl RawHandle {
    pub(crate) fn new(offset: usize, len: usize, elem: ElemKind) -> Self {
        Self { offset, len, elem }
    }

    /// Byte offset of the view within its region.
    pub fn offset_bytes(&self) -> usize {
        self.offset
    }

    /// Length of the view in elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether this is a zero-length view.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Declared element kind.
    pub fn elem(&self) -> ElemKind {
        self.elem
    }

    /// First byte past the end of the view.
    pub fn end_bytes(&self) -> usize {
        self.offset + self.len * self.elem.size_bytes()
    }

    /// Convert to a typed handle, checking the element kind.
    pub fn typed<T: Element>(self) -> Result<ViewHandle<T>, LayoutError> {
        if T::KIND != self.elem {
            return Err(LayoutError::ElemMismatch {
                expected: T::KIND,
                actual: self.elem,
            });
        }
        Ok(ViewHandle {
            offset: self.offset,
            len: self.len,
            _elem: PhantomData,
        })
    }
}

impl fmt::Display for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawHandle(off={}, len={}, {})", self.offset, self.len, self.elem)
    }
}

/// Typed location of a contiguous view of `T` elements.
///
/// `Copy` and cheap: handles are derived once at setup and passed by
/// value into the resolution calls on the channel's producer/consumer.
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub struct ViewHandle<T: Element> {
    pub(crate) offset: usize,
    pub(crate) len: usize,
    _elem: PhantomData<fn() -> T>,
}

impl<T: Element> Clone for ViewHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Element> Copy for ViewHandle<T> {}

impl<T: Element> ViewHandle<T> {
    pub(crate) fn new(offset: usize, len: usize) -> Self {
        Self {
            offset,
            len,
            _elem: PhantomData,
        }
    }

    /// Byte offset of the view within its region.
    pub fn offset_bytes(&self) -> usize {
        self.offset
    }

    /// Length of the view in elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether this is a zero-length view.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Erase the element type.
    pub fn raw(&self) -> RawHandle {
        RawHandle::new(self.offset, self.len, T::KIND)
    }

    /// A sub-window of this view, in elements.
    ///
    /// # Panics
    ///
    /// Panics if `start + len` exceeds the view's length.
    pub fn window(&self, start: usize, len: usize) -> ViewHandle<T> {
        assert!(
            start + len <= self.len,
            "window {start}..{} out of view of length {}",
            start + len,
            self.len
        );
        ViewHandle::new(self.offset + start * T::KIND.size_bytes(), len)
    }
}

/// A structure-of-arrays view: `count` disjoint sub-views of `stride`
/// elements each, consecutively packed and indexed by entity.
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub struct StridedHandle<T: Element> {
    pub(crate) base: ViewHandle<T>,
    pub(crate) stride: usize,
    pub(crate) count: usize,
}

impl<T: Element> Clone for StridedHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Element> Copy for StridedHandle<T> {}

impl<T: Element> StridedHandle<T> {
    pub(crate) fn new(base: ViewHandle<T>, stride: usize, count: usize) -> Self {
        debug_assert_eq!(base.len(), stride * count);
        Self { base, stride, count }
    }

    /// Elements per entity.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of entities.
    pub fn count(&self) -> usize {
        self.count
    }

    /// The whole backing view (`stride × count` elements).
    pub fn flat(&self) -> ViewHandle<T> {
        self.base
    }

    /// The sub-view for one entity index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= count`.
    pub fn view(&self, index: usize) -> ViewHandle<T> {
        assert!(index < self.count, "entity index {index} out of {}", self.count);
        self.base.window(index * self.stride, self.stride)
    }

    /// The sub-view for one entity ID.
    ///
    /// # Panics
    ///
    /// Panics if the entity index is out of range.
    pub fn entity(&self, id: EntityId) -> ViewHandle<T> {
        self.view(id.index())
    }
}
