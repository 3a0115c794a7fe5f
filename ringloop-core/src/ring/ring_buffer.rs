// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Lock-free bounded ring of fixed-size elements.
//!
//! The ring stores `capacity` slots of `element_size` bytes each. Pointer-sized
//! handles (`usize`) go through the handle API; arbitrary fixed-width records
//! go through the `*_elem` API over byte slices. Both share one claim/publish
//! protocol, selected per side by [`SyncMode`].
//!
//! Cursor invariant at every observable instant:
//! `consumer_tail <= consumer_head <= producer_tail <= producer_head <= consumer_tail + capacity`.

use std::cell::UnsafeCell;
use std::fmt;
use std::mem;
use std::ptr;

use serde::Serialize;

use crate::config::RingConfig;
use crate::error::RingError;
use crate::types::RingName;

use super::headtail::{Claim, HeadTail};
use super::sync::{Behavior, SyncMode, Transfer};

/// Byte width of one handle element.
pub const HANDLE_SIZE: usize = mem::size_of::<usize>();

/// Smallest accepted capacity.
pub const MIN_CAPACITY: usize = 1;

/// Largest accepted capacity (2^28 slots).
pub const MAX_CAPACITY: usize = 1 << 28;

/// How a transfer drives one side of the ring.
#[derive(Debug, Clone, Copy)]
pub(super) enum Access {
    /// Through `&RingBuffer`, under the given sync mode.
    Shared(SyncMode),
    /// Through the side's only endpoint handle.
    Owned,
}

/// Read-only snapshot of a ring for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RingInfo {
    pub name: String,
    pub is_single_producer: bool,
    pub is_single_consumer: bool,
    pub producer_sync_type: &'static str,
    pub consumer_sync_type: &'static str,
    pub configured_size: usize,
    pub current_count: usize,
    pub usable_capacity: usize,
    pub element_size: usize,
}

/// Lock-free bounded ring buffer.
///
/// Slot bytes are only touched by the thread holding the claim on that
/// logical position; exclusivity comes entirely from cursor arithmetic.
///
/// # Panics
///
/// A transfer panics if it finds another thread claiming or publishing
/// concurrently on a side it drives as [`SyncMode::Single`].
/// [`RingBuffer::split`] hands each side of a Single/Single ring to one
/// endpoint, which skips those checks.
pub struct RingBuffer {
    name: RingName,
    capacity: usize,
    mask: u64,
    element_size: usize,
    producer_mode: SyncMode,
    consumer_mode: SyncMode,
    prod: HeadTail,
    cons: HeadTail,
    slots: Box<[UnsafeCell<u8>]>,
}

// SAFETY: slot bytes are accessed only inside a claimed range, and claims on
// one side never overlap; the opposing side is excluded by the published
// cursors loaded with Acquire and stored with Release.
unsafe impl Sync for RingBuffer {}

impl RingBuffer {
    /// Create a ring with zeroed storage for `capacity` elements.
    ///
    /// `capacity` must be a power of two; it is never rounded.
    pub fn create(
        name: RingName,
        capacity: usize,
        element_size: usize,
        producer_mode: SyncMode,
        consumer_mode: SyncMode,
    ) -> Result<Self, RingError> {
        if !capacity.is_power_of_two() || !(MIN_CAPACITY..=MAX_CAPACITY).contains(&capacity) {
            return Err(RingError::InvalidCapacity {
                capacity,
                min: MIN_CAPACITY,
                max: MAX_CAPACITY,
            });
        }

        if element_size == 0 || element_size % 4 != 0 {
            return Err(RingError::InvalidElementSize { element_size });
        }

        let bytes = capacity
            .checked_mul(element_size)
            .ok_or(RingError::StorageOverflow {
                capacity,
                element_size,
            })?;

        let mut slots: Vec<UnsafeCell<u8>> = Vec::new();
        slots
            .try_reserve_exact(bytes)
            .map_err(|_| RingError::OutOfMemory { bytes })?;
        slots.resize_with(bytes, || UnsafeCell::new(0));

        tracing::debug!(
            ring = %name,
            capacity = capacity,
            element_size = element_size,
            producer = %producer_mode,
            consumer = %consumer_mode,
            "Ring created"
        );

        Ok(Self {
            name,
            capacity,
            mask: (capacity - 1) as u64,
            element_size,
            producer_mode,
            consumer_mode,
            prod: HeadTail::new(),
            cons: HeadTail::new(),
            slots: slots.into_boxed_slice(),
        })
    }

    /// Create a ring of pointer-sized handles.
    pub fn with_handles(
        name: RingName,
        capacity: usize,
        producer_mode: SyncMode,
        consumer_mode: SyncMode,
    ) -> Result<Self, RingError> {
        Self::create(name, capacity, HANDLE_SIZE, producer_mode, consumer_mode)
    }

    /// Create a ring from a validated configuration entry.
    pub fn from_config(config: &RingConfig) -> Result<Self, RingError> {
        Self::create(
            config.name.clone(),
            config.capacity,
            config.element_size,
            config.producer,
            config.consumer,
        )
    }

    // =========================================================================
    // Handle API
    // =========================================================================

    /// Enqueue all of `handles` or none of them.
    pub fn enqueue_bulk(&self, handles: &[usize]) -> Result<usize, RingError> {
        self.enqueue_with(handles, Transfer::BULK)
    }

    /// Enqueue as many of `handles` as fit, starting from index 0.
    pub fn enqueue_burst(&self, handles: &[usize]) -> Result<usize, RingError> {
        self.enqueue_with(handles, Transfer::BURST)
    }

    /// Fill `out` completely or not at all.
    pub fn dequeue_bulk(&self, out: &mut [usize]) -> Result<usize, RingError> {
        self.dequeue_with(out, Transfer::BULK)
    }

    /// Dequeue up to `out.len()` handles.
    pub fn dequeue_burst(&self, out: &mut [usize]) -> Result<usize, RingError> {
        self.dequeue_with(out, Transfer::BURST)
    }

    /// Enqueue a single handle. Returns false when the ring is full.
    pub fn enqueue(&self, handle: usize) -> Result<bool, RingError> {
        self.enqueue_bulk(std::slice::from_ref(&handle))
            .map(|n| n == 1)
    }

    /// Dequeue a single handle.
    pub fn dequeue(&self) -> Result<Option<usize>, RingError> {
        let mut slot = [0usize; 1];
        let n = self.dequeue_bulk(&mut slot)?;
        Ok((n == 1).then_some(slot[0]))
    }

    /// Enqueue handles under an explicit transfer policy.
    pub fn enqueue_with(&self, handles: &[usize], transfer: Transfer) -> Result<usize, RingError> {
        self.check_handles(handles.len())?;
        // SAFETY: `handles` is valid for `len * HANDLE_SIZE` bytes and
        // HANDLE_SIZE matches the ring's element size.
        Ok(unsafe {
            self.do_enqueue(
                handles.as_ptr().cast::<u8>(),
                handles.len(),
                transfer.behavior,
                Access::Shared(transfer.resolve(self.producer_mode)),
            )
        })
    }

    /// Dequeue handles under an explicit transfer policy.
    pub fn dequeue_with(&self, out: &mut [usize], transfer: Transfer) -> Result<usize, RingError> {
        self.check_handles(out.len())?;
        // SAFETY: `out` is valid for writes of `len * HANDLE_SIZE` bytes and
        // every bit pattern is a valid usize.
        Ok(unsafe {
            self.do_dequeue(
                out.as_mut_ptr().cast::<u8>(),
                out.len(),
                transfer.behavior,
                Access::Shared(transfer.resolve(self.consumer_mode)),
            )
        })
    }

    // =========================================================================
    // Generic-element API
    // =========================================================================

    /// Enqueue all elements of `objs` (`element_size` bytes each) or none.
    pub fn enqueue_bulk_elem(&self, objs: &[u8], element_size: usize) -> Result<usize, RingError> {
        self.enqueue_elem_with(objs, element_size, Transfer::BULK)
    }

    /// Enqueue as many elements of `objs` as fit.
    pub fn enqueue_burst_elem(&self, objs: &[u8], element_size: usize) -> Result<usize, RingError> {
        self.enqueue_elem_with(objs, element_size, Transfer::BURST)
    }

    /// Fill `out` with whole elements, completely or not at all.
    pub fn dequeue_bulk_elem(
        &self,
        out: &mut [u8],
        element_size: usize,
    ) -> Result<usize, RingError> {
        self.dequeue_elem_with(out, element_size, Transfer::BULK)
    }

    /// Dequeue up to `out.len() / element_size` elements.
    pub fn dequeue_burst_elem(
        &self,
        out: &mut [u8],
        element_size: usize,
    ) -> Result<usize, RingError> {
        self.dequeue_elem_with(out, element_size, Transfer::BURST)
    }

    pub fn enqueue_elem_with(
        &self,
        objs: &[u8],
        element_size: usize,
        transfer: Transfer,
    ) -> Result<usize, RingError> {
        let n = self.check_elems(objs.len(), element_size)?;
        // SAFETY: `objs` holds exactly `n * element_size` bytes.
        Ok(unsafe {
            self.do_enqueue(
                objs.as_ptr(),
                n,
                transfer.behavior,
                Access::Shared(transfer.resolve(self.producer_mode)),
            )
        })
    }

    pub fn dequeue_elem_with(
        &self,
        out: &mut [u8],
        element_size: usize,
        transfer: Transfer,
    ) -> Result<usize, RingError> {
        let n = self.check_elems(out.len(), element_size)?;
        // SAFETY: `out` holds exactly `n * element_size` writable bytes.
        Ok(unsafe {
            self.do_dequeue(
                out.as_mut_ptr(),
                n,
                transfer.behavior,
                Access::Shared(transfer.resolve(self.consumer_mode)),
            )
        })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn name(&self) -> &RingName {
        &self.name
    }

    /// Configured slot count.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of elements the ring can hold at once.
    pub fn usable_capacity(&self) -> usize {
        self.capacity
    }

    pub fn element_size(&self) -> usize {
        self.element_size
    }

    pub fn producer_mode(&self) -> SyncMode {
        self.producer_mode
    }

    pub fn consumer_mode(&self) -> SyncMode {
        self.consumer_mode
    }

    /// Number of published, not yet released elements.
    pub fn count(&self) -> usize {
        // Consumer tail first: the producer tail read afterwards can only be
        // further ahead, so the difference never underflows.
        let cons_tail = self.cons.tail();
        let prod_tail = self.prod.tail();
        (prod_tail.wrapping_sub(cons_tail) as usize).min(self.capacity)
    }

    pub fn free_count(&self) -> usize {
        self.capacity - self.count()
    }

    pub fn is_full(&self) -> bool {
        self.free_count() == 0
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Diagnostic snapshot. Does not mutate ring state.
    pub fn info(&self) -> RingInfo {
        RingInfo {
            name: self.name.to_string(),
            is_single_producer: self.producer_mode.is_single(),
            is_single_consumer: self.consumer_mode.is_single(),
            producer_sync_type: self.producer_mode.sync_type(),
            consumer_sync_type: self.consumer_mode.sync_type(),
            configured_size: self.capacity,
            current_count: self.count(),
            usable_capacity: self.usable_capacity(),
            element_size: self.element_size,
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    pub(super) fn check_handles(&self, len: usize) -> Result<(), RingError> {
        if self.element_size != HANDLE_SIZE {
            return Err(RingError::ElementSizeMismatch {
                expected: self.element_size,
                actual: HANDLE_SIZE,
            });
        }
        if len == 0 {
            return Err(RingError::EmptyRequest);
        }
        Ok(())
    }

    pub(super) fn check_elems(&self, len: usize, element_size: usize) -> Result<usize, RingError> {
        if element_size != self.element_size {
            return Err(RingError::ElementSizeMismatch {
                expected: self.element_size,
                actual: element_size,
            });
        }
        if len == 0 {
            return Err(RingError::EmptyRequest);
        }
        if len % element_size != 0 {
            return Err(RingError::MisalignedBuffer { len, element_size });
        }
        Ok(len / element_size)
    }

    /// # Safety
    /// `src` must be readable for `n * element_size` bytes. With
    /// [`Access::Owned`] the caller must be the producer side's only driver.
    pub(super) unsafe fn do_enqueue(
        &self,
        src: *const u8,
        n: usize,
        behavior: Behavior,
        access: Access,
    ) -> usize {
        let capacity = self.capacity as u64;
        let free = |prod_head: u64| capacity.wrapping_sub(prod_head.wrapping_sub(self.cons.tail()));

        let claim = match access {
            Access::Shared(mode) => self.prod.claim(n, behavior, mode, capacity, free),
            Access::Owned => self.prod.claim_owned(n, behavior, free),
        };
        let Some(claim) = claim else {
            return 0;
        };

        self.copy_in(claim, src);
        match access {
            Access::Shared(mode) => self.prod.publish(claim, mode),
            Access::Owned => self.prod.publish_owned(claim),
        }
        claim.len()
    }

    /// # Safety
    /// `dst` must be writable for `n * element_size` bytes. With
    /// [`Access::Owned`] the caller must be the consumer side's only driver.
    pub(super) unsafe fn do_dequeue(
        &self,
        dst: *mut u8,
        n: usize,
        behavior: Behavior,
        access: Access,
    ) -> usize {
        let capacity = self.capacity as u64;
        let used = |cons_head: u64| self.prod.tail().wrapping_sub(cons_head);

        let claim = match access {
            Access::Shared(mode) => self.cons.claim(n, behavior, mode, capacity, used),
            Access::Owned => self.cons.claim_owned(n, behavior, used),
        };
        let Some(claim) = claim else {
            return 0;
        };

        self.copy_out(claim, dst);
        match access {
            Access::Shared(mode) => self.cons.publish(claim, mode),
            Access::Owned => self.cons.publish_owned(claim),
        }
        claim.len()
    }

    #[inline]
    fn slots_ptr(&self) -> *mut u8 {
        UnsafeCell::raw_get(self.slots.as_ptr())
    }

    /// Split a claim into the contiguous run up to the end of storage and the
    /// wrapped remainder, both in element counts.
    #[inline]
    fn split_claim(&self, claim: Claim) -> (usize, usize, usize) {
        let index = (claim.start & self.mask) as usize;
        let n = claim.len();
        let first = n.min(self.capacity - index);
        (index, first, n - first)
    }

    /// # Safety
    /// The caller holds the producer claim and `src` covers it.
    #[inline]
    unsafe fn copy_in(&self, claim: Claim, src: *const u8) {
        let (index, first, rest) = self.split_claim(claim);
        let es = self.element_size;
        let base = self.slots_ptr();

        ptr::copy_nonoverlapping(src, base.add(index * es), first * es);
        if rest > 0 {
            ptr::copy_nonoverlapping(src.add(first * es), base, rest * es);
        }
    }

    /// # Safety
    /// The caller holds the consumer claim and `dst` covers it.
    #[inline]
    unsafe fn copy_out(&self, claim: Claim, dst: *mut u8) {
        let (index, first, rest) = self.split_claim(claim);
        let es = self.element_size;
        let base = self.slots_ptr();

        ptr::copy_nonoverlapping(base.add(index * es), dst, first * es);
        if rest > 0 {
            ptr::copy_nonoverlapping(base, dst.add(first * es), rest * es);
        }
    }

    #[cfg(test)]
    fn cursors(&self) -> [u64; 4] {
        [self.cons.tail(), self.cons.head(), self.prod.tail(), self.prod.head()]
    }
}

impl fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("element_size", &self.element_size)
            .field("producer_mode", &self.producer_mode)
            .field("consumer_mode", &self.consumer_mode)
            .field("count", &self.count())
            .finish()
    }
}

impl Drop for RingBuffer {
    fn drop(&mut self) {
        tracing::debug!(ring = %self.name, "Ring freed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spsc(capacity: usize) -> RingBuffer {
        RingBuffer::with_handles(
            RingName::new("test-ring").unwrap(),
            capacity,
            SyncMode::Single,
            SyncMode::Single,
        )
        .unwrap()
    }

    #[test]
    fn test_create_rejects_non_power_of_two() {
        let name = RingName::new("bad").unwrap();
        for capacity in [0, 3, 6, 1000] {
            let err =
                RingBuffer::with_handles(name.clone(), capacity, SyncMode::Multi, SyncMode::Multi)
                    .unwrap_err();
            assert!(matches!(err, RingError::InvalidCapacity { .. }));
        }
        assert!(
            RingBuffer::with_handles(name, MAX_CAPACITY * 2, SyncMode::Multi, SyncMode::Multi)
                .is_err()
        );
    }

    #[test]
    fn test_create_rejects_bad_element_size() {
        let name = RingName::new("bad").unwrap();
        for element_size in [0, 3, 6] {
            let err = RingBuffer::create(
                name.clone(),
                8,
                element_size,
                SyncMode::Multi,
                SyncMode::Multi,
            )
            .unwrap_err();
            assert!(matches!(err, RingError::InvalidElementSize { .. }));
        }
    }

    #[test]
    fn test_bulk_then_burst_scenario() {
        let ring = spsc(8);
        assert_eq!(ring.enqueue_bulk(&[1, 2, 3]).unwrap(), 3);

        let mut out = [0usize; 5];
        assert_eq!(ring.dequeue_burst(&mut out).unwrap(), 3);
        assert_eq!(&out[..3], &[1, 2, 3]);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_fifo_order() {
        let ring = spsc(4);
        for v in [10, 20, 30] {
            assert!(ring.enqueue(v).unwrap());
        }
        assert_eq!(ring.dequeue().unwrap(), Some(10));
        assert_eq!(ring.dequeue().unwrap(), Some(20));
        assert_eq!(ring.dequeue().unwrap(), Some(30));
        assert_eq!(ring.dequeue().unwrap(), None);
    }

    #[test]
    fn test_bulk_enqueue_all_or_nothing() {
        let ring = spsc(8);
        assert_eq!(ring.enqueue_bulk(&[1, 2, 3, 4, 5, 6]).unwrap(), 6);
        let before = ring.cursors();

        assert_eq!(ring.enqueue_bulk(&[7, 8, 9]).unwrap(), 0);
        assert_eq!(ring.cursors(), before);
        assert_eq!(ring.count(), 6);
    }

    #[test]
    fn test_bulk_dequeue_all_or_nothing() {
        let ring = spsc(8);
        ring.enqueue_bulk(&[1, 2]).unwrap();
        let before = ring.cursors();

        let mut out = [0usize; 3];
        assert_eq!(ring.dequeue_bulk(&mut out).unwrap(), 0);
        assert_eq!(out, [0, 0, 0]);
        assert_eq!(ring.cursors(), before);
    }

    #[test]
    fn test_burst_fills_remaining_space() {
        let ring = spsc(8);
        ring.enqueue_bulk(&[0; 5]).unwrap();

        assert_eq!(ring.enqueue_burst(&[11, 12, 13, 14, 15]).unwrap(), 3);
        assert!(ring.is_full());
        assert_eq!(ring.enqueue_burst(&[99]).unwrap(), 0);

        let mut out = [0usize; 8];
        assert_eq!(ring.dequeue_burst(&mut out).unwrap(), 8);
        assert_eq!(&out[5..], &[11, 12, 13]);
    }

    #[test]
    fn test_wraparound_preserves_order() {
        let ring = spsc(4);
        let mut out = [0usize; 3];
        let mut next = 0usize;
        let mut expected = 0usize;

        for _ in 0..10 {
            let batch = [next, next + 1, next + 2];
            assert_eq!(ring.enqueue_bulk(&batch).unwrap(), 3);
            next += 3;

            assert_eq!(ring.dequeue_bulk(&mut out).unwrap(), 3);
            for v in out {
                assert_eq!(v, expected);
                expected += 1;
            }
        }
    }

    #[test]
    fn test_conservation_of_counts() {
        let ring = spsc(16);
        let mut enqueued = 0;
        let mut dequeued = 0;
        let mut out = [0usize; 5];

        for round in 0..50usize {
            let batch = vec![round; (round % 7) + 1];
            enqueued += ring.enqueue_burst(&batch).unwrap();
            if round % 3 == 0 {
                dequeued += ring.dequeue_burst(&mut out).unwrap();
            }
            assert_eq!(enqueued, dequeued + ring.count());
        }
    }

    #[test]
    fn test_zero_length_requests_rejected() {
        let ring = spsc(8);
        assert!(matches!(ring.enqueue_bulk(&[]), Err(RingError::EmptyRequest)));
        assert!(matches!(ring.dequeue_burst(&mut []), Err(RingError::EmptyRequest)));
    }

    #[test]
    fn test_elem_mode() {
        let ring = RingBuffer::create(
            RingName::new("elem").unwrap(),
            4,
            12,
            SyncMode::Single,
            SyncMode::Single,
        )
        .unwrap();

        let records: Vec<u8> = (0u8..36).collect();
        assert_eq!(ring.enqueue_bulk_elem(&records, 12).unwrap(), 3);
        assert_eq!(ring.enqueue_burst_elem(&records, 12).unwrap(), 1);

        let mut out = vec![0u8; 48];
        assert_eq!(ring.dequeue_burst_elem(&mut out, 12).unwrap(), 4);
        assert_eq!(&out[..36], &records[..]);
        assert_eq!(&out[36..], &records[..12]);
    }

    #[test]
    fn test_elem_argument_checks() {
        let ring = RingBuffer::create(
            RingName::new("elem").unwrap(),
            4,
            16,
            SyncMode::Multi,
            SyncMode::Multi,
        )
        .unwrap();

        assert!(matches!(
            ring.enqueue_bulk_elem(&[0u8; 16], 8),
            Err(RingError::ElementSizeMismatch { expected: 16, actual: 8 })
        ));
        assert!(matches!(
            ring.enqueue_bulk_elem(&[0u8; 20], 16),
            Err(RingError::MisalignedBuffer { .. })
        ));
        // Handle API requires handle-sized slots.
        assert!(matches!(
            ring.enqueue_bulk(&[1]),
            Err(RingError::ElementSizeMismatch { .. })
        ));
    }

    #[test]
    fn test_sync_override() {
        let ring = RingBuffer::with_handles(
            RingName::new("mixed").unwrap(),
            8,
            SyncMode::Multi,
            SyncMode::Multi,
        )
        .unwrap();

        let sp = Transfer::BULK.with_sync(SyncMode::Single);
        assert_eq!(ring.enqueue_with(&[1, 2], sp).unwrap(), 2);

        let mut out = [0usize; 2];
        let sc = Transfer::BURST.with_sync(SyncMode::Single);
        assert_eq!(ring.dequeue_with(&mut out, sc).unwrap(), 2);
        assert_eq!(out, [1, 2]);
    }

    #[test]
    fn test_info_snapshot() {
        let ring = RingBuffer::with_handles(
            RingName::new("diag").unwrap(),
            16,
            SyncMode::Single,
            SyncMode::Multi,
        )
        .unwrap();
        ring.enqueue_bulk(&[1, 2, 3]).unwrap();

        let info = ring.info();
        assert_eq!(info.name, "diag");
        assert!(info.is_single_producer);
        assert!(!info.is_single_consumer);
        assert_eq!(info.producer_sync_type, "ST");
        assert_eq!(info.consumer_sync_type, "MT");
        assert_eq!(info.configured_size, 16);
        assert_eq!(info.current_count, 3);
        assert_eq!(info.usable_capacity, 16);

        // Querying leaves the ring untouched.
        assert_eq!(ring.count(), 3);
    }

    #[test]
    fn test_spsc_across_threads() {
        use std::sync::Arc;

        const TOTAL: usize = 100_000;
        let ring = Arc::new(spsc(64));

        let producer = {
            let ring = Arc::clone(&ring);
            std::thread::spawn(move || {
                let mut next = 0;
                while next < TOTAL {
                    let end = (next + 5).min(TOTAL);
                    let batch: Vec<usize> = (next..end).collect();
                    next += ring.enqueue_burst(&batch).unwrap();
                }
            })
        };

        let mut expected = 0;
        let mut out = [0usize; 16];
        while expected < TOTAL {
            let n = ring.dequeue_burst(&mut out).unwrap();
            for &v in &out[..n] {
                assert_eq!(v, expected);
                expected += 1;
            }
        }
        producer.join().unwrap();
        assert!(ring.is_empty());
    }

    #[test]
    fn test_capacity_one_ring() {
        let ring = spsc(1);
        assert!(ring.enqueue(7).unwrap());
        assert!(ring.is_full());
        assert!(!ring.enqueue(8).unwrap());
        assert_eq!(ring.dequeue().unwrap(), Some(7));
        assert_eq!(ring.dequeue().unwrap(), None);
    }
}
