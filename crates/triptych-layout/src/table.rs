//! Schema-driven view tables.
//!
//! [`ViewTable::from_view_defs`] runs a schema's allocation sequence in
//! definition order against a [`Cursor`], producing an ordered map from
//! [`ViewId`] to the resulting handle. Both sides of a channel build
//! their table from the same schema at the same capacity, which is what
//! makes their independently-derived offsets agree.

use indexmap::IndexMap;

use triptych_core::{Element, ViewDef, ViewId, ViewShape};

use crate::cursor::Cursor;
use crate::error::LayoutError;
use crate::handle::{RawHandle, StridedHandle, ViewHandle};

/// One resolved view: its definition plus where it landed.
#[derive(Clone, Debug)]
pub struct ViewEntry {
    /// The definition this entry was laid out from.
    pub def: ViewDef,
    raw: RawHandle,
    stride: usize,
    count: usize,
}

impl ViewEntry {
    /// The untyped handle for the whole view.
    pub fn raw(&self) -> RawHandle {
        self.raw
    }

    /// The typed handle for the whole view (flat over all entities).
    pub fn handle<T: Element>(&self) -> Result<ViewHandle<T>, LayoutError> {
        self.raw.typed::<T>()
    }

    /// The typed per-entity strided handle.
    ///
    /// For [`ViewShape::Flat`] views the stride is 1, so each entity's
    /// sub-view is a single element.
    pub fn strided<T: Element>(&self) -> Result<StridedHandle<T>, LayoutError> {
        let base = self.raw.typed::<T>()?;
        Ok(StridedHandle::new(base, self.stride, self.count))
    }
}

/// An ordered map of resolved views, keyed by [`ViewId`].
///
/// Iteration order is schema order, which is also allocation order.
#[derive(Clone, Debug)]
pub struct ViewTable {
    entries: IndexMap<ViewId, ViewEntry>,
    capacity: u32,
}

impl ViewTable {
    /// Lay out `defs` in order against `cursor` for `capacity` entities.
    ///
    /// Each view's element length is `capacity × shape.components()`.
    /// Returns `Err` if a `ViewId` repeats or the cursor's capacity is
    /// exhausted.
    pub fn from_view_defs(
        defs: &[(ViewId, ViewDef)],
        capacity: u32,
        cursor: &mut Cursor,
    ) -> Result<Self, LayoutError> {
        let mut entries = IndexMap::with_capacity(defs.len());
        for (view_id, def) in defs {
            let len = view_len(def, capacity, cursor.capacity())?;
            let raw = cursor.alloc_raw(def.elem, len)?;
            let stride = def.shape.components() as usize;
            let entry = ViewEntry {
                def: def.clone(),
                raw,
                stride,
                count: capacity as usize,
            };
            if entries.insert(*view_id, entry).is_some() {
                return Err(LayoutError::DuplicateView { view: *view_id });
            }
        }
        Ok(Self {
            entries,
            capacity,
        })
    }

    /// Look up one entry.
    pub fn get(&self, view: ViewId) -> Result<&ViewEntry, LayoutError> {
        self.entries
            .get(&view)
            .ok_or(LayoutError::UnknownView { view })
    }

    /// Typed flat handle for one view.
    pub fn handle<T: Element>(&self, view: ViewId) -> Result<ViewHandle<T>, LayoutError> {
        self.get(view)?.handle::<T>()
    }

    /// Typed per-entity strided handle for one view.
    pub fn strided<T: Element>(&self, view: ViewId) -> Result<StridedHandle<T>, LayoutError> {
        self.get(view)?.strided::<T>()
    }

    /// Iterate entries in schema (= allocation) order.
    pub fn iter(&self) -> impl Iterator<Item = (&ViewId, &ViewEntry)> {
        self.entries.iter()
    }

    /// Number of views in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no views.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entity capacity the table was laid out for.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}

/// Byte footprint of a schema at the given entity capacity, including
/// alignment padding.
///
/// Used to size channel regions so that producer and consumer derive
/// the capacity from the same schema instead of agreeing on a number
/// out of band. A schema whose footprint does not fit in the address
/// space is a configuration error and is reported, never wrapped.
pub fn required_capacity(defs: &[(ViewId, ViewDef)], capacity: u32) -> Result<usize, LayoutError> {
    let mut cursor = Cursor::new(usize::MAX);
    for (_, def) in defs {
        let len = view_len(def, capacity, usize::MAX)?;
        cursor.alloc_raw(def.elem, len)?;
    }
    Ok(cursor.used())
}

/// Element count of one view, checked against the address space.
fn view_len(def: &ViewDef, capacity: u32, capacity_bytes: usize) -> Result<usize, LayoutError> {
    usize::try_from(def.total_len(capacity)).map_err(|_| LayoutError::CapacityExceeded {
        requested: usize::MAX,
        capacity: capacity_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use triptych_core::ElemKind;

    fn sample_defs() -> Vec<(ViewId, ViewDef)> {
        vec![
            (ViewId(0), ViewDef::strided("position", ElemKind::F32, 3)),
            (ViewId(1), ViewDef::strided("quaternion", ElemKind::F32, 4)),
            (ViewId(2), ViewDef::flat("dirty", ElemKind::U8)),
            (ViewId(3), ViewDef::flat("parent", ElemKind::U32)),
        ]
    }

    #[test]
    fn table_lays_out_in_schema_order() {
        let defs = sample_defs();
        let mut cursor = Cursor::new(4096);
        let table = ViewTable::from_view_defs(&defs, 10, &mut cursor).unwrap();

        let position = table.get(ViewId(0)).unwrap().raw();
        let quaternion = table.get(ViewId(1)).unwrap().raw();
        let dirty = table.get(ViewId(2)).unwrap().raw();
        let parent = table.get(ViewId(3)).unwrap().raw();

        assert_eq!(position.offset_bytes(), 0);
        assert_eq!(quaternion.offset_bytes(), 120); // 10 × 3 × 4 bytes
        assert_eq!(dirty.offset_bytes(), 280); // 120 + 10 × 4 × 4
        // 10 bytes of u8 leave the cursor at 290; u32 realigns to 292.
        assert_eq!(parent.offset_bytes(), 292);
    }

    #[test]
    fn two_tables_from_one_schema_agree() {
        let defs = sample_defs();
        let mut c1 = Cursor::new(4096);
        let mut c2 = Cursor::new(4096);
        let t1 = ViewTable::from_view_defs(&defs, 25, &mut c1).unwrap();
        let t2 = ViewTable::from_view_defs(&defs, 25, &mut c2).unwrap();
        for ((id1, e1), (id2, e2)) in t1.iter().zip(t2.iter()) {
            assert_eq!(id1, id2);
            assert_eq!(e1.raw(), e2.raw());
        }
        assert_eq!(c1.used(), c2.used());
    }

    #[test]
    fn strided_entry_resolves_per_entity() {
        let defs = sample_defs();
        let mut cursor = Cursor::new(4096);
        let table = ViewTable::from_view_defs(&defs, 10, &mut cursor).unwrap();
        let position = table.strided::<f32>(ViewId(0)).unwrap();
        assert_eq!(position.count(), 10);
        assert_eq!(position.stride(), 3);
        assert_eq!(position.view(2).offset_bytes(), 24);
    }

    #[test]
    fn flat_entry_strided_has_unit_stride() {
        let defs = sample_defs();
        let mut cursor = Cursor::new(4096);
        let table = ViewTable::from_view_defs(&defs, 10, &mut cursor).unwrap();
        let dirty = table.strided::<u8>(ViewId(2)).unwrap();
        assert_eq!(dirty.stride(), 1);
        assert_eq!(dirty.view(9).len(), 1);
    }

    #[test]
    fn typed_lookup_rejects_wrong_kind() {
        let defs = sample_defs();
        let mut cursor = Cursor::new(4096);
        let table = ViewTable::from_view_defs(&defs, 10, &mut cursor).unwrap();
        assert!(matches!(
            table.handle::<f32>(ViewId(3)),
            Err(LayoutError::ElemMismatch { .. })
        ));
    }

    #[test]
    fn unknown_view_is_an_error() {
        let defs = sample_defs();
        let mut cursor = Cursor::new(4096);
        let table = ViewTable::from_view_defs(&defs, 10, &mut cursor).unwrap();
        assert_eq!(
            table.get(ViewId(99)).unwrap_err(),
            LayoutError::UnknownView { view: ViewId(99) }
        );
    }

    #[test]
    fn duplicate_view_id_is_rejected() {
        let defs = vec![
            (ViewId(0), ViewDef::flat("a", ElemKind::F32)),
            (ViewId(0), ViewDef::flat("b", ElemKind::F32)),
        ];
        let mut cursor = Cursor::new(4096);
        let result = ViewTable::from_view_defs(&defs, 10, &mut cursor);
        assert!(matches!(result, Err(LayoutError::DuplicateView { .. })));
    }

    #[test]
    fn required_capacity_matches_actual_layout() {
        let defs = sample_defs();
        let needed = required_capacity(&defs, 10).unwrap();
        let mut cursor = Cursor::new(needed);
        assert!(ViewTable::from_view_defs(&defs, 10, &mut cursor).is_ok());
        assert_eq!(cursor.used(), needed);
        // One byte less must fail.
        let mut tight = Cursor::new(needed - 1);
        assert!(ViewTable::from_view_defs(&defs, 10, &mut tight).is_err());
    }

    #[test]
    fn empty_schema_needs_no_bytes() {
        assert_eq!(required_capacity(&[], 100), Ok(0));
        let mut cursor = Cursor::new(0);
        let table = ViewTable::from_view_defs(&[], 100, &mut cursor).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn huge_schema_is_measured_exactly() {
        // 2^28 entities × 16 f32 lanes is 2^32 elements — past the u32
        // boundary where narrow arithmetic would wrap to zero.
        let defs = vec![(ViewId(0), ViewDef::strided("world_matrix", ElemKind::F32, 16))];
        assert_eq!(required_capacity(&defs, 1 << 28), Ok(1usize << 34));
    }

    #[test]
    fn oversized_schema_fails_fast_against_a_real_cursor() {
        let defs = vec![(ViewId(0), ViewDef::strided("world_matrix", ElemKind::F32, 16))];
        let mut cursor = Cursor::new(4096);
        assert!(matches!(
            ViewTable::from_view_defs(&defs, 1 << 28, &mut cursor),
            Err(LayoutError::CapacityExceeded { .. })
        ));
        // A failed layout consumes nothing.
        assert_eq!(cursor.used(), 0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_def() -> impl Strategy<Value = ViewDef> {
            let elem = prop_oneof![
                Just(ElemKind::U8),
                Just(ElemKind::U32),
                Just(ElemKind::F32),
                Just(ElemKind::F64),
            ];
            (elem, prop::option::of(1u32..20)).prop_map(|(elem, stride)| match stride {
                None => ViewDef::flat("v", elem),
                Some(s) => ViewDef::strided("v", elem, s),
            })
        }

        proptest! {
            #[test]
            fn required_capacity_is_exact(
                defs in prop::collection::vec(arb_def(), 0..12),
                capacity in 0u32..200,
            ) {
                let defs: Vec<(ViewId, ViewDef)> = defs
                    .into_iter()
                    .enumerate()
                    .map(|(i, d)| (ViewId(i as u32), d))
                    .collect();
                let needed = required_capacity(&defs, capacity).unwrap();
                let mut cursor = Cursor::new(needed);
                let table = ViewTable::from_view_defs(&defs, capacity, &mut cursor);
                prop_assert!(table.is_ok());
                prop_assert_eq!(cursor.used(), needed);
            }
        }
    }
}
