// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Per-source link-state change counters.
//!
//! A device notifier subscribes a source and feeds events through the
//! returned [`LinkSubscription`]; the diagnostic surface reads the counter.
//! Dropping the subscription unregisters the source.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;

use crate::error::LinkStateError;
use crate::types::SourceId;

/// Device event delivered to a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// Link went up or down.
    StatusChange,
    Reset,
    Removed,
}

/// Snapshot returned by [`LinkStateCounters::query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkStateInfo {
    pub enabled: bool,
    pub lsc_counter: u64,
}

/// Registry of link-state counters keyed by source.
#[derive(Debug, Default)]
pub struct LinkStateCounters {
    counters: DashMap<SourceId, Arc<AtomicU64>>,
}

impl LinkStateCounters {
    pub fn new() -> Self {
        Self {
            counters: DashMap::new(),
        }
    }

    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register `source` and return its subscription.
    pub fn subscribe(
        self: &Arc<Self>,
        source: SourceId,
    ) -> Result<LinkSubscription, LinkStateError> {
        match self.counters.entry(source) {
            Entry::Occupied(_) => Err(LinkStateError::AlreadySubscribed { source_id: source }),
            Entry::Vacant(entry) => {
                let counter = Arc::new(AtomicU64::new(0));
                entry.insert(Arc::clone(&counter));
                tracing::debug!(source = %source, "Link-state subscription registered");
                Ok(LinkSubscription {
                    registry: Arc::clone(self),
                    source,
                    counter,
                })
            }
        }
    }

    /// Counter state of a subscribed source.
    pub fn query(&self, source: SourceId) -> Result<LinkStateInfo, LinkStateError> {
        self.counters
            .get(&source)
            .map(|counter| LinkStateInfo {
                enabled: true,
                lsc_counter: counter.load(Ordering::Relaxed),
            })
            .ok_or(LinkStateError::NotSubscribed { source_id: source })
    }

    pub fn is_subscribed(&self, source: SourceId) -> bool {
        self.counters.contains_key(&source)
    }

    /// Subscribed sources, sorted.
    pub fn sources(&self) -> Vec<SourceId> {
        let mut sources: Vec<SourceId> = self.counters.iter().map(|e| *e.key()).collect();
        sources.sort();
        sources
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    fn unregister(&self, source: SourceId, counter: &Arc<AtomicU64>) {
        let removed = self
            .counters
            .remove_if(&source, |_, registered| Arc::ptr_eq(registered, counter));
        if removed.is_some() {
            tracing::debug!(source = %source, "Link-state subscription released");
        }
    }
}

/// Live registration of one source. Unregisters on drop.
#[derive(Debug)]
pub struct LinkSubscription {
    registry: Arc<LinkStateCounters>,
    source: SourceId,
    counter: Arc<AtomicU64>,
}

impl LinkSubscription {
    pub fn source(&self) -> SourceId {
        self.source
    }

    /// Feed one device event; only status changes are counted.
    #[inline]
    pub fn record(&self, event: LinkEvent) {
        if event == LinkEvent::StatusChange {
            self.counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Shared counter handle, readable after the subscription is gone.
    pub fn counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.counter)
    }

    pub fn count(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }

    /// Unregister now instead of at drop.
    pub fn unsubscribe(self) {}
}

impl Drop for LinkSubscription {
    fn drop(&mut self) {
        self.registry.unregister(self.source, &self.counter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, RingloopError};

    #[test]
    fn test_subscribe_and_count() {
        let counters = LinkStateCounters::new_shared();
        let sub = counters.subscribe(SourceId::new(3)).unwrap();

        sub.record(LinkEvent::StatusChange);
        sub.record(LinkEvent::Reset);
        sub.record(LinkEvent::StatusChange);
        sub.record(LinkEvent::Removed);

        assert_eq!(sub.count(), 2);
        let info = counters.query(SourceId::new(3)).unwrap();
        assert!(info.enabled);
        assert_eq!(info.lsc_counter, 2);
    }

    #[test]
    fn test_duplicate_subscription() {
        let counters = LinkStateCounters::new_shared();
        let _sub = counters.subscribe(SourceId::new(0)).unwrap();
        let err: RingloopError = counters.subscribe(SourceId::new(0)).unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_drop_unregisters() {
        let counters = LinkStateCounters::new_shared();
        let sub = counters.subscribe(SourceId::new(9)).unwrap();
        let handle = sub.counter();
        sub.record(LinkEvent::StatusChange);

        drop(sub);
        assert!(!counters.is_subscribed(SourceId::new(9)));
        let err = counters.query(SourceId::new(9)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        // The counter handle outlives the registration.
        assert_eq!(handle.load(Ordering::Relaxed), 1);

        // The source can be subscribed again with a fresh counter.
        let again = counters.subscribe(SourceId::new(9)).unwrap();
        assert_eq!(again.count(), 0);
    }

    #[test]
    fn test_explicit_unsubscribe() {
        let counters = LinkStateCounters::new_shared();
        let a = counters.subscribe(SourceId::new(1)).unwrap();
        let _b = counters.subscribe(SourceId::new(2)).unwrap();
        assert_eq!(counters.sources(), vec![SourceId::new(1), SourceId::new(2)]);

        a.unsubscribe();
        assert_eq!(counters.sources(), vec![SourceId::new(2)]);
        assert_eq!(counters.len(), 1);
    }

    #[test]
    fn test_no_upper_bound_on_source_ids() {
        let counters = LinkStateCounters::new_shared();
        let sub = counters.subscribe(SourceId::new(u16::MAX)).unwrap();
        sub.record(LinkEvent::StatusChange);
        assert_eq!(counters.query(SourceId::new(u16::MAX)).unwrap().lsc_counter, 1);
    }

    #[test]
    fn test_concurrent_events() {
        let counters = LinkStateCounters::new_shared();
        let sub = Arc::new(counters.subscribe(SourceId::new(4)).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sub = Arc::clone(&sub);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        sub.record(LinkEvent::StatusChange);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(counters.query(SourceId::new(4)).unwrap().lsc_counter, 4000);
    }
}
