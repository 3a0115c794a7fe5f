// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Claim/publish cursor pair shared by the producer and consumer sides.
//!
//! Each side owns two monotonically increasing 64-bit cursors:
//! `head` is the claim cursor and `tail` the publish cursor. A thread first
//! moves `head` forward to reserve a contiguous logical range, copies its
//! elements, then moves `tail` over the range once every earlier claim has
//! been published. The opposing side only ever reads `tail`.
//!
//! Memory ordering:
//! - the opposing `tail` is loaded with Acquire before a claim, so slot
//!   accesses of the other side happen-before ours;
//! - `head` is loaded with Acquire and moved with AcqRel, so a claimant
//!   that sees another claimant's `head` also sees the opposing `tail` it
//!   claimed against, and never computes availability from an older one;
//! - `tail` is stored with Release after the copy, publishing the slots;
//! - in Multi mode the wait for `tail == start` loads with Acquire so the
//!   earlier claimant's copy is carried along by our Release store.
//!
//! Single mode skips the retry and wait loops but still moves both cursors
//! with a compare-exchange, so two threads sharing a Single side through
//! `&RingBuffer` panic instead of touching the same slots. A side owned by
//! exactly one endpoint handle uses the plain-store path of
//! [`HeadTail::claim_owned`] and [`HeadTail::publish_owned`].

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_utils::{Backoff, CachePadded};

use super::sync::{Behavior, SyncMode};

/// A reserved logical range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Claim {
    pub start: u64,
    pub end: u64,
}

impl Claim {
    #[inline]
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }
}

/// One side (producer or consumer) of a ring.
pub(crate) struct HeadTail {
    head: CachePadded<AtomicU64>,
    tail: CachePadded<AtomicU64>,
}

/// Entries to take out of `avail` for a request of `n`.
#[inline]
fn take(n: usize, behavior: Behavior, avail: u64) -> u64 {
    let wanted = n as u64;
    match behavior {
        Behavior::Fixed if wanted > avail => 0,
        Behavior::Fixed => wanted,
        Behavior::Variable => wanted.min(avail),
    }
}

impl HeadTail {
    pub fn new() -> Self {
        Self {
            head: CachePadded::new(AtomicU64::new(0)),
            tail: CachePadded::new(AtomicU64::new(0)),
        }
    }

    #[inline]
    pub fn head(&self) -> u64 {
        self.head.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn tail(&self) -> u64 {
        self.tail.load(Ordering::Acquire)
    }

    /// Reserve up to `n` entries.
    ///
    /// `available` maps the current claim cursor to the number of entries
    /// this side may take (free slots for producers, published slots for
    /// consumers); it must read the opposing tail with Acquire. A value
    /// above `limit` can only come from a cursor pair read across a
    /// concurrent update, so the cursors are reloaded. Returns `None` when
    /// nothing is claimed, leaving both cursors untouched.
    #[inline]
    pub fn claim<F>(
        &self,
        n: usize,
        behavior: Behavior,
        mode: SyncMode,
        limit: u64,
        available: F,
    ) -> Option<Claim>
    where
        F: Fn(u64) -> u64,
    {
        let backoff = Backoff::new();

        loop {
            let start = self.head.load(Ordering::Acquire);
            let avail = available(start);
            if avail > limit {
                backoff.spin();
                continue;
            }

            let take = take(n, behavior, avail);
            if take == 0 {
                return None;
            }

            let end = start.wrapping_add(take);
            match mode {
                SyncMode::Single => {
                    if self
                        .head
                        .compare_exchange(start, end, Ordering::AcqRel, Ordering::Acquire)
                        .is_err()
                    {
                        panic!("concurrent claim on a single-threaded ring side");
                    }
                    return Some(Claim { start, end });
                }
                SyncMode::Multi => {
                    if self
                        .head
                        .compare_exchange_weak(start, end, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        return Some(Claim { start, end });
                    }
                    backoff.spin();
                }
            }
        }
    }

    /// Reserve up to `n` entries on a side driven by exactly one thread.
    ///
    /// # Safety
    /// No other thread may claim or publish on this side for as long as
    /// the caller drives it through the `*_owned` methods.
    #[inline]
    pub unsafe fn claim_owned<F>(&self, n: usize, behavior: Behavior, available: F) -> Option<Claim>
    where
        F: Fn(u64) -> u64,
    {
        // Our own cursor; the opposing tail only moves forward.
        let start = self.head.load(Ordering::Relaxed);
        let take = take(n, behavior, available(start));
        if take == 0 {
            return None;
        }
        let end = start.wrapping_add(take);
        self.head.store(end, Ordering::Relaxed);
        Some(Claim { start, end })
    }

    /// Publish a range claimed with [`HeadTail::claim_owned`].
    ///
    /// # Safety
    /// Same contract as [`HeadTail::claim_owned`].
    #[inline]
    pub unsafe fn publish_owned(&self, claim: Claim) {
        self.tail.store(claim.end, Ordering::Release);
    }

    /// Make a claimed range visible to the opposing side.
    ///
    /// In Multi mode this waits until every earlier claim on this side has
    /// been published, so ranges become visible in claim order. In Single
    /// mode there is no earlier claim to wait for.
    #[inline]
    pub fn publish(&self, claim: Claim, mode: SyncMode) {
        match mode {
            SyncMode::Single => {
                if self
                    .tail
                    .compare_exchange(
                        claim.start,
                        claim.end,
                        Ordering::Release,
                        Ordering::Relaxed,
                    )
                    .is_err()
                {
                    panic!("concurrent publish on a single-threaded ring side");
                }
            }
            SyncMode::Multi => {
                let backoff = Backoff::new();
                while self.tail.load(Ordering::Acquire) != claim.start {
                    backoff.snooze();
                }
                self.tail.store(claim.end, Ordering::Release);
            }
        }
    }
}
