//! The closed set of element kinds and their (size, alignment) pairs.
//!
//! Buffer interiors are sequences of typed numeric views. The element
//! kind of a view is fixed at schema definition time and resolved to a
//! concrete Rust scalar via the sealed [`Element`] trait, so size and
//! alignment are compile-time facts rather than runtime dispatch.

use std::fmt;

/// The element kinds a view may hold.
///
/// Each kind carries its byte size and natural alignment. Views are
/// aligned to the element's natural size, so any allocation order
/// yields validly-aligned views.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElemKind {
    /// Unsigned 8-bit integer (per-entity flag lanes).
    U8,
    /// Unsigned 32-bit integer (entity links, counters).
    U32,
    /// 32-bit float (vectors, quaternions, matrices).
    F32,
    /// 64-bit float (high-precision scalars).
    F64,
}

impl ElemKind {
    /// Byte size of one element of this kind.
    pub fn size_bytes(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U32 => 4,
            Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    /// Required alignment of a view of this kind, in bytes.
    ///
    /// Equal to the natural size: no rounding for byte elements,
    /// 4 bytes for 32-bit elements, 8 bytes for 64-bit elements.
    pub fn align_bytes(self) -> usize {
        self.size_bytes()
    }
}

impl fmt::Display for ElemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::U8 => "u8",
            Self::U32 => "u32",
            Self::F32 => "f32",
            Self::F64 => "f64",
        };
        write!(f, "{name}")
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u32 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// A Rust scalar type usable as a view element.
///
/// Sealed: exactly the four kinds in [`ElemKind`] are supported. The
/// associated constant ties the static type to its runtime kind so
/// typed handles can be checked against a schema's declared kind.
pub trait Element: sealed::Sealed + Copy + Default + PartialEq + 'static {
    /// The runtime kind corresponding to this type.
    const KIND: ElemKind;
}

impl Element for u8 {
    const KIND: ElemKind = ElemKind::U8;
}

impl Element for u32 {
    const KIND: ElemKind = ElemKind::U32;
}

impl Element for f32 {
    const KIND: ElemKind = ElemKind::F32;
}

impl Element for f64 {
    const KIND: ElemKind = ElemKind::F64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_match_rust_types() {
        assert_eq!(ElemKind::U8.size_bytes(), std::mem::size_of::<u8>());
        assert_eq!(ElemKind::U32.size_bytes(), std::mem::size_of::<u32>());
        assert_eq!(ElemKind::F32.size_bytes(), std::mem::size_of::<f32>());
        assert_eq!(ElemKind::F64.size_bytes(), std::mem::size_of::<f64>());
    }

    #[test]
    fn alignment_equals_natural_size() {
        for kind in [ElemKind::U8, ElemKind::U32, ElemKind::F32, ElemKind::F64] {
            assert_eq!(kind.align_bytes(), kind.size_bytes());
        }
    }

    #[test]
    fn element_kinds_round_trip() {
        assert_eq!(<u8 as Element>::KIND, ElemKind::U8);
        assert_eq!(<u32 as Element>::KIND, ElemKind::U32);
        assert_eq!(<f32 as Element>::KIND, ElemKind::F32);
        assert_eq!(<f64 as Element>::KIND, ElemKind::F64);
    }
}
