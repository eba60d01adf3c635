//! The stamped-snapshot fixture.
//!
//! A small schema whose every lane is a deterministic function of a
//! single stamp value, so that a reader can verify a snapshot is
//! internally consistent — any mixture of two stamps in one read is a
//! torn snapshot. Used by the channel and engine stress tests.

use triptych_channel::{channel, Consumer, Producer};
use triptych_core::{ElemKind, ViewDef, ViewId};
use triptych_layout::{required_capacity, Cursor, StridedHandle, ViewHandle, ViewTable};

/// IDs for the stamped schema's views.
pub const STAMP: ViewId = ViewId(0);
/// Per-entity f32 payload (stride 4).
pub const PAYLOAD: ViewId = ViewId(1);
/// Per-entity f64 payload (stride 2).
pub const WIDE: ViewId = ViewId(2);
/// Per-entity u8 marks.
pub const MARKS: ViewId = ViewId(3);

/// The stamped schema: a u32 stamp lane plus three payload views of
/// different element kinds, exercising all alignment classes.
pub fn stamped_defs() -> Vec<(ViewId, ViewDef)> {
    vec![
        (STAMP, ViewDef::flat("stamp", ElemKind::U32)),
        (PAYLOAD, ViewDef::strided("payload", ElemKind::F32, 4)),
        (WIDE, ViewDef::strided("wide", ElemKind::F64, 2)),
        (MARKS, ViewDef::flat("marks", ElemKind::U8)),
    ]
}

/// Resolved handles for the stamped schema.
#[derive(Clone, Copy)]
pub struct StampedViews {
    /// One stamp per entity.
    pub stamp: StridedHandle<u32>,
    /// Four f32 lanes per entity.
    pub payload: StridedHandle<f32>,
    /// Two f64 lanes per entity.
    pub wide: StridedHandle<f64>,
    /// One mark byte per entity.
    pub marks: ViewHandle<u8>,
}

impl StampedViews {
    /// Resolve the handles out of a table built from [`stamped_defs`].
    pub fn resolve(table: &ViewTable) -> Self {
        Self {
            stamp: table.strided::<u32>(STAMP).unwrap(),
            payload: table.strided::<f32>(PAYLOAD).unwrap(),
            wide: table.strided::<f64>(WIDE).unwrap(),
            marks: table.handle::<u8>(MARKS).unwrap(),
        }
    }

    /// Fill every lane of the write view from `stamp`.
    pub fn write(&self, producer: &mut Producer, stamp: u32) {
        for e in 0..self.stamp.count() {
            producer.entity_view_mut(&self.stamp, e)[0] = stamp;
            let payload = producer.entity_view_mut(&self.payload, e);
            for (lane, v) in payload.iter_mut().enumerate() {
                *v = lane_value(stamp, e, lane) as f32;
            }
            let wide = producer.entity_view_mut(&self.wide, e);
            for (lane, v) in wide.iter_mut().enumerate() {
                *v = lane_value(stamp, e, lane) as f64;
            }
        }
        let marks = producer.view_mut(self.marks);
        marks.fill(stamp as u8);
    }

    /// Verify every lane of the read view is consistent with a single
    /// stamp, and return that stamp.
    ///
    /// # Panics
    ///
    /// Panics if any lane disagrees with the stamp in entity 0's stamp
    /// lane — i.e. the snapshot is torn.
    pub fn check(&self, consumer: &Consumer) -> u32 {
        let stamp = consumer.entity_view(&self.stamp, 0)[0];
        for e in 0..self.stamp.count() {
            assert_eq!(
                consumer.entity_view(&self.stamp, e)[0],
                stamp,
                "stamp lane of entity {e} disagrees"
            );
            let payload = consumer.entity_view(&self.payload, e);
            for (lane, &v) in payload.iter().enumerate() {
                assert_eq!(
                    v,
                    lane_value(stamp, e, lane) as f32,
                    "payload lane {lane} of entity {e} torn at stamp {stamp}"
                );
            }
            let wide = consumer.entity_view(&self.wide, e);
            for (lane, &v) in wide.iter().enumerate() {
                assert_eq!(
                    v,
                    lane_value(stamp, e, lane) as f64,
                    "wide lane {lane} of entity {e} torn at stamp {stamp}"
                );
            }
        }
        for (e, &m) in consumer.view(self.marks).iter().enumerate() {
            assert_eq!(m, stamp as u8, "mark of entity {e} torn at stamp {stamp}");
        }
        stamp
    }
}

fn lane_value(stamp: u32, entity: usize, lane: usize) -> u32 {
    stamp
        .wrapping_mul(1009)
        .wrapping_add((entity as u32) * 31)
        .wrapping_add(lane as u32)
        % 1_000_000 // keep values exactly representable in f32
}

/// A ready-made channel over the stamped schema at the given entity
/// capacity, with handles resolved on both sides by construction.
pub fn stamped_channel(capacity: u32) -> (Producer, Consumer, StampedViews) {
    let defs = stamped_defs();
    let bytes = required_capacity(&defs, capacity).unwrap();

    // Producer and consumer sides each derive the layout themselves,
    // exactly as two real execution contexts would.
    let mut producer_cursor = Cursor::new(bytes);
    let producer_table = ViewTable::from_view_defs(&defs, capacity, &mut producer_cursor).unwrap();
    let mut consumer_cursor = Cursor::new(bytes);
    let consumer_table = ViewTable::from_view_defs(&defs, capacity, &mut consumer_cursor).unwrap();

    let producer_views = StampedViews::resolve(&producer_table);
    let consumer_views = StampedViews::resolve(&consumer_table);
    assert_eq!(producer_views.stamp.flat(), consumer_views.stamp.flat());
    assert_eq!(producer_views.marks, consumer_views.marks);

    let (producer, consumer) = channel(bytes);
    (producer, consumer, producer_views)
}
