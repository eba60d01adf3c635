//! The canonical per-entity transform schema.
//!
//! Two schemas live here. The renderable schema carries everything a
//! presenter needs per entity — position, scale, rotation, quaternion,
//! local and world matrices, and two bookkeeping flag lanes — and is
//! the payload that crosses a channel. The hierarchy schema
//! (parent/child/sibling links) stays on the producer side: the
//! consumer reads finished world matrices and never walks the tree.
//!
//! Both sides must build the renderable schema at the same capacity in
//! the same order; offsets agree by convention, nothing is exchanged.

use triptych_channel::Producer;
use triptych_core::{ElemKind, EntityId, ViewDef, ViewId};
use triptych_layout::{LayoutError, StridedHandle, ViewHandle, ViewTable};

/// Per-entity world-space position, 3 lanes.
pub const POSITION: ViewId = ViewId(0);
/// Per-entity scale, 3 lanes.
pub const SCALE: ViewId = ViewId(1);
/// Per-entity Euler rotation, 3 lanes.
pub const ROTATION: ViewId = ViewId(2);
/// Per-entity orientation quaternion, 4 lanes.
pub const QUATERNION: ViewId = ViewId(3);
/// Per-entity local transform, column-major 4x4.
pub const LOCAL_MATRIX: ViewId = ViewId(4);
/// Per-entity world transform, column-major 4x4.
pub const WORLD_MATRIX: ViewId = ViewId(5);
/// Nonzero when the local matrix is recomposed from
/// position/quaternion/scale each tick.
pub const MATRIX_AUTO_UPDATE: ViewId = ViewId(6);
/// Nonzero when the world matrix must be recomputed before present.
pub const WORLD_MATRIX_NEEDS_UPDATE: ViewId = ViewId(7);

/// Index of an entity's parent, producer side only.
pub const PARENT: ViewId = ViewId(0);
/// Index of an entity's first child, producer side only.
pub const FIRST_CHILD: ViewId = ViewId(1);
/// Index of an entity's previous sibling, producer side only.
pub const PREV_SIBLING: ViewId = ViewId(2);
/// Index of an entity's next sibling, producer side only.
pub const NEXT_SIBLING: ViewId = ViewId(3);

/// Sentinel link value for "no such relative".
pub const NO_ENTITY: u32 = u32::MAX;

/// The shared renderable schema, in allocation order.
pub fn renderable_defs() -> Vec<(ViewId, ViewDef)> {
    vec![
        (POSITION, ViewDef::strided("position", ElemKind::F32, 3)),
        (SCALE, ViewDef::strided("scale", ElemKind::F32, 3)),
        (ROTATION, ViewDef::strided("rotation", ElemKind::F32, 3)),
        (QUATERNION, ViewDef::strided("quaternion", ElemKind::F32, 4)),
        (LOCAL_MATRIX, ViewDef::strided("local_matrix", ElemKind::F32, 16)),
        (WORLD_MATRIX, ViewDef::strided("world_matrix", ElemKind::F32, 16)),
        (MATRIX_AUTO_UPDATE, ViewDef::flat("matrix_auto_update", ElemKind::U8)),
        (
            WORLD_MATRIX_NEEDS_UPDATE,
            ViewDef::flat("world_matrix_needs_update", ElemKind::U8),
        ),
    ]
}

/// The producer-private hierarchy schema, in allocation order.
///
/// Lives in its own region with its own cursor; it never crosses a
/// channel, so its layout is free to differ from the renderable one.
pub fn hierarchy_defs() -> Vec<(ViewId, ViewDef)> {
    vec![
        (PARENT, ViewDef::flat("parent", ElemKind::U32)),
        (FIRST_CHILD, ViewDef::flat("first_child", ElemKind::U32)),
        (PREV_SIBLING, ViewDef::flat("prev_sibling", ElemKind::U32)),
        (NEXT_SIBLING, ViewDef::flat("next_sibling", ElemKind::U32)),
    ]
}

/// Resolved handles for the renderable schema.
///
/// Resolve once per side against that side's [`ViewTable`]; the
/// handles are plain offsets and copy freely after that.
#[derive(Clone, Copy, Debug)]
pub struct TransformViews {
    /// World-space position, 3 lanes per entity.
    pub position: StridedHandle<f32>,
    /// Scale, 3 lanes per entity.
    pub scale: StridedHandle<f32>,
    /// Euler rotation, 3 lanes per entity.
    pub rotation: StridedHandle<f32>,
    /// Orientation quaternion, 4 lanes per entity.
    pub quaternion: StridedHandle<f32>,
    /// Local transform matrix, 16 lanes per entity.
    pub local_matrix: StridedHandle<f32>,
    /// World transform matrix, 16 lanes per entity.
    pub world_matrix: StridedHandle<f32>,
    /// One flag byte per entity.
    pub matrix_auto_update: ViewHandle<u8>,
    /// One flag byte per entity.
    pub world_matrix_needs_update: ViewHandle<u8>,
}

impl TransformViews {
    /// Look up every renderable view in `table`.
    pub fn resolve(table: &ViewTable) -> Result<Self, LayoutError> {
        Ok(Self {
            position: table.strided(POSITION)?,
            scale: table.strided(SCALE)?,
            rotation: table.strided(ROTATION)?,
            quaternion: table.strided(QUATERNION)?,
            local_matrix: table.strided(LOCAL_MATRIX)?,
            world_matrix: table.strided(WORLD_MATRIX)?,
            matrix_auto_update: table.handle(MATRIX_AUTO_UPDATE)?,
            world_matrix_needs_update: table.handle(WORLD_MATRIX_NEEDS_UPDATE)?,
        })
    }
}

/// Resolved handles for the hierarchy schema.
#[derive(Clone, Copy, Debug)]
pub struct HierarchyViews {
    /// Parent entity index, [`NO_ENTITY`] at a root.
    pub parent: ViewHandle<u32>,
    /// First child index, [`NO_ENTITY`] at a leaf.
    pub first_child: ViewHandle<u32>,
    /// Previous sibling index.
    pub prev_sibling: ViewHandle<u32>,
    /// Next sibling index.
    pub next_sibling: ViewHandle<u32>,
}

impl HierarchyViews {
    /// Look up every hierarchy view in `table`.
    pub fn resolve(table: &ViewTable) -> Result<Self, LayoutError> {
        Ok(Self {
            parent: table.handle(PARENT)?,
            first_child: table.handle(FIRST_CHILD)?,
            prev_sibling: table.handle(PREV_SIBLING)?,
            next_sibling: table.handle(NEXT_SIBLING)?,
        })
    }
}

/// Write an entity's lanes as an untransformed identity.
///
/// Fresh snapshots start from this so uninitialized entities present
/// as identity rather than garbage: unit scale, identity quaternion,
/// identity matrices, auto-update on.
pub fn write_identity(views: &TransformViews, entity: EntityId, writer: &mut Producer) {
    let index = entity.index();
    writer.entity_view_mut(&views.position, index).fill(0.0);
    writer.entity_view_mut(&views.scale, index).fill(1.0);
    writer.entity_view_mut(&views.rotation, index).fill(0.0);

    let quat = writer.entity_view_mut(&views.quaternion, index);
    quat.fill(0.0);
    quat[3] = 1.0;

    for handle in [views.local_matrix, views.world_matrix] {
        let mat = writer.entity_view_mut(&handle, index);
        mat.fill(0.0);
        mat[0] = 1.0;
        mat[5] = 1.0;
        mat[10] = 1.0;
        mat[15] = 1.0;
    }

    writer.view_mut(views.matrix_auto_update)[index] = 1;
    writer.view_mut(views.world_matrix_needs_update)[index] = 0;
}
