//! The channel itself: buffer set, producer half, consumer half.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use triptych_core::Element;
use triptych_layout::{StridedHandle, ViewHandle};

use crate::error::ChannelError;
use crate::flags::Flags;
use crate::region::{Region, SharedRegion};

/// The raw shared state of a channel: three regions plus the control
/// word. This is the only state that crosses an execution-context
/// boundary — no offset tables, no schema, no handshake beyond "here
/// are the regions".
///
/// Cloning shares (never copies) the underlying memory, including the
/// claim flags that record whether a live [`Producer`] or [`Consumer`]
/// currently exists for this set.
#[derive(Clone)]
pub struct BufferSet {
    regions: [SharedRegion; 3],
    flags: Arc<AtomicU8>,
    producer_claim: Arc<AtomicBool>,
    consumer_claim: Arc<AtomicBool>,
}

impl BufferSet {
    /// Allocate three fresh zero-filled regions of `capacity_bytes`
    /// each and a control word in the initial state (changed = 0,
    /// temp = 0, write = 1, read = 2).
    pub fn new(capacity_bytes: usize) -> Self {
        Self {
            regions: [
                Arc::new(Region::new(capacity_bytes)),
                Arc::new(Region::new(capacity_bytes)),
                Arc::new(Region::new(capacity_bytes)),
            ],
            flags: Arc::new(AtomicU8::new(Flags::INITIAL.bits())),
            producer_claim: Arc::new(AtomicBool::new(false)),
            consumer_claim: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Assemble a buffer set from existing shared parts.
    ///
    /// The control word is adopted as-is: a channel built over this set
    /// resumes, it does not restart.
    ///
    /// # Safety
    ///
    /// The returned set carries fresh claim flags, so [`resume`] cannot
    /// see halves derived from any other set over the same regions. The
    /// caller must guarantee that no other [`Producer`] or [`Consumer`]
    /// over these regions is live, now or while halves built from this
    /// set exist — otherwise two producers could resolve overlapping
    /// mutable slices, which is undefined behavior.
    pub unsafe fn from_parts(regions: [SharedRegion; 3], flags: Arc<AtomicU8>) -> Self {
        Self {
            regions,
            flags,
            producer_claim: Arc::new(AtomicBool::new(false)),
            consumer_claim: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Claim both halves, failing if either is already live.
    fn claim(&self) -> Result<(), ChannelError> {
        if self
            .producer_claim
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ChannelError::HalvesInUse);
        }
        if self
            .consumer_claim
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.producer_claim.store(false, Ordering::Release);
            return Err(ChannelError::HalvesInUse);
        }
        Ok(())
    }

    /// The three shared regions.
    pub fn regions(&self) -> &[SharedRegion; 3] {
        &self.regions
    }

    /// The shared control word.
    pub fn flags(&self) -> &Arc<AtomicU8> {
        &self.flags
    }

    /// Byte length of each region.
    ///
    /// Meaningful once the set has passed [`resume`]'s validation;
    /// reports region 0 otherwise.
    pub fn region_len(&self) -> usize {
        self.regions[0].len()
    }

    fn validate(&self) -> Result<(), ChannelError> {
        let lengths = [
            self.regions[0].len(),
            self.regions[1].len(),
            self.regions[2].len(),
        ];
        if lengths[0] != lengths[1] || lengths[1] != lengths[2] {
            return Err(ChannelError::MismatchedRegions { lengths });
        }
        Ok(())
    }
}

/// Create a channel with three fresh regions of `capacity_bytes` each.
///
/// Returns the two halves. Each half is `Send` and owned: move the
/// producer into the simulation context and the consumer into the
/// rendering context. Neither half is `Clone` — one producer, one
/// consumer, enforced by ownership.
pub fn channel(capacity_bytes: usize) -> (Producer, Consumer) {
    let set = BufferSet::new(capacity_bytes);
    // A fresh set has no other holders; claiming cannot fail.
    set.producer_claim.store(true, Ordering::Release);
    set.consumer_claim.store(true, Ordering::Release);
    (
        Producer { set: set.clone() },
        Consumer { set },
    )
}

/// Build the two halves over an existing buffer set, adopting its
/// control word without reinitialisation.
///
/// Fails fast if the regions differ in length (a configuration error;
/// unequal regions would corrupt view resolution silently), or if a
/// producer or consumer derived from this set is still live
/// ([`ChannelError::HalvesInUse`]): a second live producer could
/// resolve a mutable slice aliasing the first one's write view.
/// Dropping a half releases its claim, so a set can be resumed once
/// its previous halves are gone.
pub fn resume(set: BufferSet) -> Result<(Producer, Consumer), ChannelError> {
    set.validate()?;
    set.claim()?;
    Ok((
        Producer { set: set.clone() },
        Consumer { set },
    ))
}

/// Outcome of [`Consumer::try_adopt_latest`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum Adopt {
    /// A new snapshot was adopted; the read view now holds it.
    Fresh,
    /// Nothing published since the last adoption; the read view still
    /// holds the last delivered snapshot.
    NoNewData,
}

impl Adopt {
    /// Whether a new snapshot was adopted.
    pub fn is_fresh(self) -> bool {
        matches!(self, Self::Fresh)
    }
}

/// The writing half of a channel.
///
/// Owned by the fixed-rate simulation context. All view accessors
/// resolve against whichever region currently holds the write role;
/// the stores are plain — only [`Producer::publish`] touches shared
/// synchronisation state.
pub struct Producer {
    set: BufferSet,
}

impl Producer {
    fn flags(&self) -> Flags {
        Flags::from_bits(self.set.flags.load(Ordering::Acquire))
    }

    fn write_region(&self) -> &Region {
        // The write index only changes in publish(), i.e. under
        // &mut self; it is stable between our own publishes.
        &self.set.regions[self.flags().write_index()]
    }

    /// Mutable typed slice for `handle` in the current write view.
    ///
    /// # Panics
    ///
    /// Panics if the handle came from a layout larger than the regions
    /// (misaligned or out-of-bounds range).
    pub fn view_mut<T: Element>(&mut self, handle: ViewHandle<T>) -> &mut [T] {
        // SAFETY: the write-role region is addressed by this producer
        // alone (the consumer only resolves slices in the read role,
        // and {read, write, temp} is always a permutation), and the
        // returned borrow holds &mut self, so no second mutable slice
        // can be created while it lives.
        #[allow(unsafe_code)]
        unsafe {
            self.write_region().slice_mut(handle.offset_bytes(), handle.len())
        }
    }

    /// Mutable typed slice for one entity of a strided view.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is out of range or the handle does not fit
    /// the regions.
    pub fn entity_view_mut<T: Element>(
        &mut self,
        handle: &StridedHandle<T>,
        entity: usize,
    ) -> &mut [T] {
        self.view_mut(handle.view(entity))
    }

    /// Publish the write view as the latest snapshot.
    ///
    /// Atomically exchanges the write and temp roles and sets the
    /// changed bit. The compare-exchange retries only against the
    /// consumer's concurrent adoption of the same word, so the loop is
    /// bounded by the other side's progress — never adversarial. The
    /// release ordering makes every plain store into the old write
    /// region visible to a consumer that subsequently adopts it.
    pub fn publish(&mut self) {
        let mut cur = self.set.flags.load(Ordering::Acquire);
        loop {
            let next = Flags::from_bits(cur).swap_write_with_temp().bits();
            match self.set.flags.compare_exchange_weak(
                cur,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return,
                Err(actual) => cur = actual,
            }
        }
    }

    /// Byte length of each region.
    pub fn region_len(&self) -> usize {
        self.set.region_len()
    }

    /// The shared state, for handing to another execution context.
    pub fn buffer_set(&self) -> BufferSet {
        self.set.clone()
    }
}

impl Drop for Producer {
    fn drop(&mut self) {
        self.set.producer_claim.store(false, Ordering::Release);
    }
}

/// The reading half of a channel.
///
/// Owned by the variable-rate rendering context. Between adoptions the
/// read view keeps the last delivered snapshot — never a stale role's
/// garbage, never a region the producer is writing.
pub struct Consumer {
    set: BufferSet,
}

impl Consumer {
    fn flags(&self) -> Flags {
        Flags::from_bits(self.set.flags.load(Ordering::Acquire))
    }

    fn read_region(&self) -> &Region {
        // The read index only changes in try_adopt_latest(), i.e.
        // under &mut self; it is stable between our own adoptions.
        &self.set.regions[self.flags().read_index()]
    }

    /// Adopt the latest published snapshot, if any.
    ///
    /// Non-blocking: returns [`Adopt::NoNewData`] immediately when
    /// nothing has been published since the last adoption. Otherwise
    /// atomically exchanges the read and temp roles and clears the
    /// changed bit. The changed bit is re-checked on every retry — a
    /// concurrent publish between the load and the exchange moves the
    /// snapshot we are adopting, so the exchange must restart from the
    /// freshly observed word, not blindly re-apply the old swap.
    pub fn try_adopt_latest(&mut self) -> Adopt {
        let mut cur = self.set.flags.load(Ordering::Acquire);
        loop {
            let flags = Flags::from_bits(cur);
            if !flags.changed() {
                return Adopt::NoNewData;
            }
            let next = flags.swap_read_with_temp().bits();
            match self.set.flags.compare_exchange_weak(
                cur,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Adopt::Fresh,
                Err(actual) => cur = actual,
            }
        }
    }

    /// Shared typed slice for `handle` in the current read view.
    ///
    /// # Panics
    ///
    /// Panics if the handle came from a layout larger than the regions.
    pub fn view<T: Element>(&self, handle: ViewHandle<T>) -> &[T] {
        // SAFETY: the read-role region is never the producer's write
        // target (role permutation), and it can only leave the read
        // role through try_adopt_latest(&mut self), which cannot be
        // called while this shared borrow of self is live.
        #[allow(unsafe_code)]
        unsafe {
            self.read_region().slice(handle.offset_bytes(), handle.len())
        }
    }

    /// Shared typed slice for one entity of a strided view.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is out of range or the handle does not fit
    /// the regions.
    pub fn entity_view<T: Element>(&self, handle: &StridedHandle<T>, entity: usize) -> &[T] {
        self.view(handle.view(entity))
    }

    /// Byte length of each region.
    pub fn region_len(&self) -> usize {
        self.set.region_len()
    }

    /// The shared state, for handing to another execution context.
    pub fn buffer_set(&self) -> BufferSet {
        self.set.clone()
    }
}

// Compile-time assertions: both halves must be Send (they move into
// their execution contexts) and the set must be shareable.
impl Drop for Consumer {
    fn drop(&mut self) {
        self.set.consumer_claim.store(false, Ordering::Release);
    }
}

const _: fn() = || {
    fn assert_send<T: Send>() {}
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send::<Producer>();
    assert_send::<Consumer>();
    assert_send_sync::<BufferSet>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use triptych_layout::Cursor;

    /// Three f32s per region, like a single position vector.
    fn vec3_channel() -> (Producer, Consumer, ViewHandle<f32>) {
        let mut cursor = Cursor::new(12);
        let handle = cursor.alloc::<f32>(3).unwrap();
        let (producer, consumer) = channel(12);
        (producer, consumer, handle)
    }

    #[test]
    fn round_trip_delivers_exact_snapshot() {
        let (mut producer, mut consumer, h) = vec3_channel();
        producer.view_mut(h).copy_from_slice(&[1.0, 2.0, 3.0]);
        producer.publish();
        assert_eq!(consumer.try_adopt_latest(), Adopt::Fresh);
        assert_eq!(consumer.view(h), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn adopt_without_publish_reports_no_new_data() {
        let (_producer, mut consumer, h) = vec3_channel();
        assert_eq!(consumer.try_adopt_latest(), Adopt::NoNewData);
        // The initial read view is zero-filled, not garbage.
        assert_eq!(consumer.view(h), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn no_new_data_is_idempotent() {
        let (mut producer, mut consumer, h) = vec3_channel();
        producer.view_mut(h).copy_from_slice(&[9.0, 8.0, 7.0]);
        producer.publish();
        assert_eq!(consumer.try_adopt_latest(), Adopt::Fresh);
        let first: Vec<f32> = consumer.view(h).to_vec();
        assert_eq!(consumer.try_adopt_latest(), Adopt::NoNewData);
        assert_eq!(consumer.try_adopt_latest(), Adopt::NoNewData);
        assert_eq!(consumer.view(h), first.as_slice());
    }

    #[test]
    fn freshest_snapshot_wins() {
        // Publish S1 then S2 before any adoption; one adoption must
        // yield S2, never S1, never a mix.
        let (mut producer, mut consumer, h) = vec3_channel();
        producer.view_mut(h).copy_from_slice(&[1.0, 0.0, 0.0]);
        producer.publish();
        producer.view_mut(h).copy_from_slice(&[1.0, 1.0, 0.0]);
        producer.publish();
        assert_eq!(consumer.try_adopt_latest(), Adopt::Fresh);
        assert_eq!(consumer.view(h), &[1.0, 1.0, 0.0]);
        // The skipped snapshot is gone for good.
        assert_eq!(consumer.try_adopt_latest(), Adopt::NoNewData);
        assert_eq!(consumer.view(h), &[1.0, 1.0, 0.0]);
    }

    #[test]
    fn interleaved_publish_adopt_sequence() {
        let (mut producer, mut consumer, h) = vec3_channel();
        for i in 1..=10u32 {
            let v = i as f32;
            producer.view_mut(h).copy_from_slice(&[v, v * 2.0, v * 3.0]);
            producer.publish();
            assert_eq!(consumer.try_adopt_latest(), Adopt::Fresh);
            assert_eq!(consumer.view(h), &[v, v * 2.0, v * 3.0]);
        }
    }

    #[test]
    fn every_observed_word_is_a_role_permutation() {
        let (mut producer, mut consumer, h) = vec3_channel();
        let flags = producer.buffer_set().flags().clone();
        let check = |flags: &AtomicU8| {
            let f = Flags::from_bits(flags.load(Ordering::Acquire));
            assert!(f.is_role_permutation(), "broken word {f:?}");
        };
        check(&flags);
        for _ in 0..7 {
            producer.view_mut(h)[0] += 1.0;
            producer.publish();
            check(&flags);
            let _ = consumer.try_adopt_latest();
            check(&flags);
        }
    }

    #[test]
    fn resume_adopts_control_word_as_is() {
        let (mut producer, mut consumer, h) = vec3_channel();
        producer.view_mut(h).copy_from_slice(&[4.0, 5.0, 6.0]);
        producer.publish();
        drop(consumer);

        // Hand the raw set to a "new context": the pending snapshot
        // must survive the handoff.
        let set = producer.buffer_set();
        drop(producer);
        let (_p2, mut c2) = resume(set).unwrap();
        assert_eq!(c2.try_adopt_latest(), Adopt::Fresh);
        assert_eq!(c2.view(h), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn resume_rejects_mismatched_regions() {
        let flags = Arc::new(AtomicU8::new(Flags::INITIAL.bits()));
        // SAFETY: the regions are freshly allocated here; no other
        // halves over them exist.
        let set = unsafe {
            BufferSet::from_parts(
                [
                    Arc::new(Region::new(64)),
                    Arc::new(Region::new(64)),
                    Arc::new(Region::new(32)),
                ],
                flags,
            )
        };
        assert_eq!(
            resume(set).err(),
            Some(ChannelError::MismatchedRegions {
                lengths: [64, 64, 32]
            })
        );
    }

    #[test]
    fn resume_refuses_while_halves_are_live() {
        let (mut producer, consumer, h) = vec3_channel();
        producer.view_mut(h)[0] = 1.0;

        // A second producer over the same regions would let two
        // mutable views alias the same bytes; the claim must hold as
        // long as either half is live.
        assert_eq!(
            resume(producer.buffer_set()).err(),
            Some(ChannelError::HalvesInUse)
        );
        drop(consumer);
        assert_eq!(
            resume(producer.buffer_set()).err(),
            Some(ChannelError::HalvesInUse)
        );

        // A failed resume must not leak a half-taken claim.
        let set = producer.buffer_set();
        drop(producer);
        let (_p2, _c2) = resume(set).unwrap();
    }

    #[test]
    fn failed_resume_rolls_back_the_producer_claim() {
        let (producer, consumer, _h) = vec3_channel();
        let set = producer.buffer_set();
        drop(producer);

        // Consumer still live: the claim briefly taken on the producer
        // side must be released again, or the set would be lost.
        assert_eq!(resume(set.clone()).err(), Some(ChannelError::HalvesInUse));
        drop(consumer);
        assert!(resume(set).is_ok());
    }

    #[test]
    fn dropping_both_halves_releases_the_set() {
        let (mut producer, consumer, h) = vec3_channel();
        producer.view_mut(h).copy_from_slice(&[7.0, 8.0, 9.0]);
        producer.publish();
        let set = producer.buffer_set();
        drop(producer);
        drop(consumer);

        let (_p2, mut c2) = resume(set).unwrap();
        assert_eq!(c2.try_adopt_latest(), Adopt::Fresh);
        assert_eq!(c2.view(h), &[7.0, 8.0, 9.0]);
    }

    #[test]
    fn strided_entity_views_round_trip() {
        let mut cursor = Cursor::new(1024);
        let positions = cursor.alloc_strided::<f32>(3, 4).unwrap();
        let (mut producer, mut consumer) = channel(1024);
        for e in 0..4 {
            let v = e as f32;
            producer
                .entity_view_mut(&positions, e)
                .copy_from_slice(&[v, v + 0.5, -v]);
        }
        producer.publish();
        assert!(consumer.try_adopt_latest().is_fresh());
        assert_eq!(consumer.entity_view(&positions, 2), &[2.0, 2.5, -2.0]);
    }

    #[test]
    fn zero_capacity_channel_is_valid() {
        let (producer, consumer) = channel(0);
        assert_eq!(producer.region_len(), 0);
        assert_eq!(consumer.region_len(), 0);
    }
}
