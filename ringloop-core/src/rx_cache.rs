// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Refillable receive staging buffer.
//!
//! A `ReceiveCache` bulk-acquires handles from a [`BurstSource`] and hands
//! them out one at a time (or forwards them into a ring). Each refill first
//! gives every unread handle back to the source, so nothing leaks across
//! cycles. The cache is owned by exactly one consuming thread.

use std::fmt;

use crate::error::{RingError, SourceError};
use crate::ring::RingBuffer;
use crate::types::{ChannelId, LocalityHint, SourceId};

/// Size of the caller-defined metadata area in a cache header.
pub const USER_AREA_SIZE: usize = 64;

/// External producer of element handles, e.g. a device receive queue.
pub trait BurstSource {
    /// Handle to one element owned by the source's allocator.
    type Handle: Copy;

    /// Append up to `max` handles from `channel` of `source` to `out` and
    /// return how many were appended. Zero is a valid outcome.
    fn burst_receive(
        &mut self,
        source: SourceId,
        channel: ChannelId,
        out: &mut Vec<Self::Handle>,
        max: usize,
    ) -> Result<usize, SourceError>;

    /// Give a handle back to its owning allocator.
    fn release(&mut self, handle: Self::Handle);
}

/// Metadata carried alongside the cached handles.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CacheHeader {
    pub source: SourceId,
    pub channel: ChannelId,
    /// Opaque caller-defined bytes.
    pub user: [u8; USER_AREA_SIZE],
}

impl CacheHeader {
    pub fn new(source: SourceId, channel: ChannelId) -> Self {
        Self {
            source,
            channel,
            user: [0; USER_AREA_SIZE],
        }
    }
}

impl fmt::Debug for CacheHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheHeader")
            .field("source", &self.source)
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

/// Staging buffer between a burst source and its consumer.
pub struct ReceiveCache<S: BurstSource> {
    header: CacheHeader,
    source: S,
    buffer: Vec<S::Handle>,
    size: usize,
    cursor: usize,
    locality: LocalityHint,
}

impl<S: BurstSource> ReceiveCache<S> {
    /// Allocate a cache able to hold `size` handles.
    ///
    /// Storage is reserved up front so refills never allocate.
    pub fn create(
        source: S,
        header: CacheHeader,
        size: usize,
        locality: LocalityHint,
    ) -> Result<Self, SourceError> {
        if size == 0 {
            return Err(SourceError::ZeroSize);
        }

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(size)
            .map_err(|_| SourceError::OutOfMemory { size })?;

        tracing::debug!(
            source = %header.source,
            channel = %header.channel,
            size = size,
            locality = %locality,
            "Receive cache created"
        );

        Ok(Self {
            header,
            source,
            buffer,
            size,
            cursor: 0,
            locality,
        })
    }

    /// Release unread handles, then pull a fresh burst from the source.
    ///
    /// Returns the number of handles now available. On error the cache is
    /// left empty with every handle given back.
    pub fn refill(&mut self) -> Result<usize, SourceError> {
        self.discard();

        let reported = match self.source.burst_receive(
            self.header.source,
            self.header.channel,
            &mut self.buffer,
            self.size,
        ) {
            Ok(n) => n,
            Err(e) => {
                self.discard();
                return Err(e);
            }
        };

        let written = self.buffer.len();
        let violation = if written > self.size {
            Some(SourceError::Overrun {
                returned: written,
                max: self.size,
            })
        } else if reported != written {
            Some(SourceError::CountMismatch { reported, written })
        } else {
            None
        };

        if let Some(err) = violation {
            self.discard();
            return Err(err);
        }

        Ok(written)
    }

    /// Next unread handle, or `None` once the current burst is exhausted.
    #[inline]
    pub fn take(&mut self) -> Option<S::Handle> {
        let handle = *self.buffer.get(self.cursor)?;
        self.cursor += 1;
        Some(handle)
    }

    /// Release unread handles and drop the cache. Returns how many were
    /// released.
    pub fn close(mut self) -> usize {
        let released = self.release_remaining();
        tracing::debug!(
            source = %self.header.source,
            channel = %self.header.channel,
            released = released,
            "Receive cache closed"
        );
        released
    }

    pub fn header(&self) -> &CacheHeader {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut CacheHeader {
        &mut self.header
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Maximum handles per refill.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Handles returned by the last refill.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor == self.buffer.len()
    }

    /// All handles from the last refill, read or not.
    pub fn received(&self) -> &[S::Handle] {
        &self.buffer
    }

    pub fn locality(&self) -> LocalityHint {
        self.locality
    }

    fn release_remaining(&mut self) -> usize {
        let released = self.buffer.len() - self.cursor;
        for &handle in &self.buffer[self.cursor..] {
            self.source.release(handle);
        }
        self.cursor = self.buffer.len();
        released
    }

    /// Release unread handles and reset to an empty burst.
    fn discard(&mut self) {
        self.release_remaining();
        self.buffer.clear();
        self.cursor = 0;
    }
}

impl<S: BurstSource<Handle = usize>> ReceiveCache<S> {
    /// Burst-enqueue unread handles into `ring`, advancing the cursor past
    /// the ones accepted.
    pub fn forward(&mut self, ring: &RingBuffer) -> Result<usize, RingError> {
        if self.is_exhausted() {
            return Ok(0);
        }
        let moved = ring.enqueue_burst(&self.buffer[self.cursor..])?;
        self.cursor += moved;
        Ok(moved)
    }
}

impl<S: BurstSource> Drop for ReceiveCache<S> {
    fn drop(&mut self) {
        self.release_remaining();
    }
}

impl<S: BurstSource> fmt::Debug for ReceiveCache<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReceiveCache")
            .field("header", &self.header)
            .field("size", &self.size)
            .field("length", &self.buffer.len())
            .field("cursor", &self.cursor)
            .field("locality", &self.locality)
            .finish()
    }
}
