// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Single-threaded ring endpoints.
//!
//! [`RingBuffer::split`] turns a ring whose sides are both
//! [`SyncMode::Single`] into one producer and one consumer handle. Each
//! handle is `Send` but neither `Sync` nor `Clone`, so exactly one thread
//! drives each side and cursors move with plain stores: no compare-exchange
//! on claim and no wait on publish.

use std::cell::Cell;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::RingError;

use super::ring_buffer::{Access, RingBuffer, RingInfo};
use super::sync::{Behavior, SyncMode};

/// Makes a handle `!Sync` while keeping it `Send`.
type NotSync = PhantomData<Cell<()>>;

impl RingBuffer {
    /// Split into single-threaded producer and consumer endpoints.
    ///
    /// Fails unless both sides were created as [`SyncMode::Single`].
    pub fn split(self) -> Result<(RingProducer, RingConsumer), RingError> {
        for (side, mode) in [
            ("producer", self.producer_mode()),
            ("consumer", self.consumer_mode()),
        ] {
            if mode != SyncMode::Single {
                return Err(RingError::NotSplittable {
                    name: self.name().to_string(),
                    side,
                });
            }
        }

        tracing::debug!(ring = %self.name(), "Ring split into endpoints");

        let ring = Arc::new(self);
        Ok((
            RingProducer {
                ring: Arc::clone(&ring),
                _not_sync: PhantomData,
            },
            RingConsumer {
                ring,
                _not_sync: PhantomData,
            },
        ))
    }
}

/// Sole producer of a split ring.
pub struct RingProducer {
    ring: Arc<RingBuffer>,
    _not_sync: NotSync,
}

impl RingProducer {
    pub fn enqueue_bulk(&mut self, handles: &[usize]) -> Result<usize, RingError> {
        self.enqueue_handles(handles, Behavior::Fixed)
    }

    pub fn enqueue_burst(&mut self, handles: &[usize]) -> Result<usize, RingError> {
        self.enqueue_handles(handles, Behavior::Variable)
    }

    /// Enqueue a single handle. Returns false when the ring is full.
    pub fn enqueue(&mut self, handle: usize) -> Result<bool, RingError> {
        self.enqueue_bulk(std::slice::from_ref(&handle))
            .map(|n| n == 1)
    }

    pub fn enqueue_bulk_elem(
        &mut self,
        objs: &[u8],
        element_size: usize,
    ) -> Result<usize, RingError> {
        self.enqueue_elems(objs, element_size, Behavior::Fixed)
    }

    pub fn enqueue_burst_elem(
        &mut self,
        objs: &[u8],
        element_size: usize,
    ) -> Result<usize, RingError> {
        self.enqueue_elems(objs, element_size, Behavior::Variable)
    }

    pub fn free_count(&self) -> usize {
        self.ring.free_count()
    }

    pub fn info(&self) -> RingInfo {
        self.ring.info()
    }

    fn enqueue_handles(
        &mut self,
        handles: &[usize],
        behavior: Behavior,
    ) -> Result<usize, RingError> {
        self.ring.check_handles(handles.len())?;
        // SAFETY: `self` is the only producer of this ring and is not Sync;
        // `handles` covers `len * HANDLE_SIZE` bytes.
        Ok(unsafe {
            self.ring.do_enqueue(
                handles.as_ptr().cast::<u8>(),
                handles.len(),
                behavior,
                Access::Owned,
            )
        })
    }

    fn enqueue_elems(
        &mut self,
        objs: &[u8],
        element_size: usize,
        behavior: Behavior,
    ) -> Result<usize, RingError> {
        let n = self.ring.check_elems(objs.len(), element_size)?;
        // SAFETY: sole producer; `objs` holds exactly `n * element_size` bytes.
        Ok(unsafe { self.ring.do_enqueue(objs.as_ptr(), n, behavior, Access::Owned) })
    }
}

/// Sole consumer of a split ring.
pub struct RingConsumer {
    ring: Arc<RingBuffer>,
    _not_sync: NotSync,
}

impl RingConsumer {
    pub fn dequeue_bulk(&mut self, out: &mut [usize]) -> Result<usize, RingError> {
        self.dequeue_handles(out, Behavior::Fixed)
    }

    pub fn dequeue_burst(&mut self, out: &mut [usize]) -> Result<usize, RingError> {
        self.dequeue_handles(out, Behavior::Variable)
    }

    pub fn dequeue(&mut self) -> Result<Option<usize>, RingError> {
        let mut slot = [0usize; 1];
        let n = self.dequeue_bulk(&mut slot)?;
        Ok((n == 1).then_some(slot[0]))
    }

    pub fn dequeue_bulk_elem(
        &mut self,
        out: &mut [u8],
        element_size: usize,
    ) -> Result<usize, RingError> {
        self.dequeue_elems(out, element_size, Behavior::Fixed)
    }

    pub fn dequeue_burst_elem(
        &mut self,
        out: &mut [u8],
        element_size: usize,
    ) -> Result<usize, RingError> {
        self.dequeue_elems(out, element_size, Behavior::Variable)
    }

    pub fn count(&self) -> usize {
        self.ring.count()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn info(&self) -> RingInfo {
        self.ring.info()
    }

    fn dequeue_handles(
        &mut self,
        out: &mut [usize],
        behavior: Behavior,
    ) -> Result<usize, RingError> {
        self.ring.check_handles(out.len())?;
        // SAFETY: `self` is the only consumer of this ring and is not Sync;
        // every bit pattern is a valid usize.
        Ok(unsafe {
            self.ring.do_dequeue(
                out.as_mut_ptr().cast::<u8>(),
                out.len(),
                behavior,
                Access::Owned,
            )
        })
    }

    fn dequeue_elems(
        &mut self,
        out: &mut [u8],
        element_size: usize,
        behavior: Behavior,
    ) -> Result<usize, RingError> {
        let n = self.ring.check_elems(out.len(), element_size)?;
        // SAFETY: sole consumer; `out` holds exactly `n * element_size` bytes.
        Ok(unsafe { self.ring.do_dequeue(out.as_mut_ptr(), n, behavior, Access::Owned) })
    }
}
