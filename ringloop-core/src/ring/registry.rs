// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Thread-safe registry of named rings using DashMap.
//!
//! Backs the read-only diagnostic surface: lookup by name, info snapshots
//! and the list of live rings. The registry holds weak references, so a
//! ring is freed when its last user drops it and disappears from `list()`.

use std::sync::{Arc, Weak};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::config::RingConfig;
use crate::error::{RegistryError, RingloopResult};
use crate::types::RingName;

use super::ring_buffer::{RingBuffer, RingInfo};
use super::sync::SyncMode;

/// Registry of live rings keyed by name.
#[derive(Debug, Default)]
pub struct RingRegistry {
    rings: DashMap<RingName, Weak<RingBuffer>>,
}

impl RingRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            rings: DashMap::new(),
        }
    }

    /// Create a registry wrapped in an Arc for sharing across threads.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Create and register a ring.
    ///
    /// Fails with `AlreadyExists` while a ring of the same name is alive.
    pub fn create(
        &self,
        name: RingName,
        capacity: usize,
        element_size: usize,
        producer_mode: SyncMode,
        consumer_mode: SyncMode,
    ) -> RingloopResult<Arc<RingBuffer>> {
        let entry = self.rings.entry(name.clone());
        let replaced = match &entry {
            Entry::Occupied(existing) if existing.get().strong_count() > 0 => {
                return Err(RegistryError::AlreadyExists {
                    name: name.to_string(),
                }
                .into());
            }
            Entry::Occupied(_) => true,
            Entry::Vacant(_) => false,
        };

        let ring = Arc::new(RingBuffer::create(
            name,
            capacity,
            element_size,
            producer_mode,
            consumer_mode,
        )?);
        entry.insert(Arc::downgrade(&ring));

        tracing::debug!(ring = %ring.name(), replaced = replaced, "Ring registered");
        Ok(ring)
    }

    /// Create and register a ring from a validated configuration entry.
    pub fn create_from_config(&self, config: &RingConfig) -> RingloopResult<Arc<RingBuffer>> {
        self.create(
            config.name.clone(),
            config.capacity,
            config.element_size,
            config.producer,
            config.consumer,
        )
    }

    /// Find a live ring by name.
    pub fn lookup(&self, name: &str) -> Option<Arc<RingBuffer>> {
        self.rings.get(name).and_then(|weak| weak.upgrade())
    }

    /// Diagnostic snapshot of a live ring.
    pub fn info(&self, name: &str) -> Result<RingInfo, RegistryError> {
        self.lookup(name)
            .map(|ring| ring.info())
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            })
    }

    /// Names of all live rings, sorted.
    pub fn list(&self) -> Vec<RingName> {
        let mut names: Vec<RingName> = self
            .rings
            .iter()
            .filter(|r| r.value().strong_count() > 0)
            .map(|r| r.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Drop the registry's entry for `name`.
    ///
    /// The ring's storage is released once the last outstanding `Arc` is
    /// dropped.
    pub fn free(&self, name: &str) -> Result<(), RegistryError> {
        match self.rings.remove(name) {
            Some((name, weak)) if weak.strong_count() > 0 => {
                tracing::debug!(ring = %name, "Ring unregistered");
                Ok(())
            }
            _ => Err(RegistryError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Remove entries whose rings have been dropped.
    pub fn prune(&self) -> usize {
        let before = self.rings.len();
        self.rings.retain(|_, weak| weak.strong_count() > 0);
        before - self.rings.len()
    }

    /// Number of live rings.
    pub fn len(&self) -> usize {
        self.rings
            .iter()
            .filter(|r| r.value().strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, RingloopError};
    use crate::ring::HANDLE_SIZE;

    fn name(s: &str) -> RingName {
        RingName::new(s).unwrap()
    }

    fn create(registry: &RingRegistry, s: &str) -> RingloopResult<Arc<RingBuffer>> {
        registry.create(name(s), 64, HANDLE_SIZE, SyncMode::Multi, SyncMode::Single)
    }

    #[test]
    fn test_create_and_lookup() {
        let registry = RingRegistry::new();
        let ring = create(&registry, "rx-0").unwrap();

        let found = registry.lookup("rx-0").unwrap();
        assert!(Arc::ptr_eq(&ring, &found));
        assert!(registry.lookup("rx-1").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_name_rejected_while_alive() {
        let registry = RingRegistry::new();
        let ring = create(&registry, "dup").unwrap();

        let err = create(&registry, "dup").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        // Name becomes reusable once the ring is gone.
        drop(ring);
        assert!(create(&registry, "dup").is_ok());
    }

    #[test]
    fn test_list_only_live_rings() {
        let registry = RingRegistry::new();
        let a = create(&registry, "a").unwrap();
        let b = create(&registry, "b").unwrap();
        let names: Vec<String> = registry.list().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["a", "b"]);

        drop(b);
        assert_eq!(registry.list(), vec![name("a")]);
        assert_eq!(registry.prune(), 1);
        drop(a);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_info_and_not_found() {
        let registry = RingRegistry::new();
        let ring = create(&registry, "diag").unwrap();
        ring.enqueue_bulk(&[1, 2]).unwrap();

        let info = registry.info("diag").unwrap();
        assert_eq!(info.current_count, 2);
        assert!(!info.is_single_producer);
        assert!(info.is_single_consumer);
        assert_eq!(ring.count(), 2);

        let err: RingloopError = registry.info("missing").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_free_unregisters() {
        let registry = RingRegistry::new();
        let ring = create(&registry, "gone").unwrap();

        registry.free("gone").unwrap();
        assert!(registry.lookup("gone").is_none());
        assert!(registry.free("gone").is_err());

        // Outstanding handles keep working after unregistering.
        assert_eq!(ring.enqueue_bulk(&[7]).unwrap(), 1);
    }

    #[test]
    fn test_invalid_ring_is_not_registered() {
        let registry = RingRegistry::new();
        let err = registry
            .create(name("bad"), 12, HANDLE_SIZE, SyncMode::Multi, SyncMode::Multi)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(registry.lookup("bad").is_none());
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_reregistration_is_logged() {
        let logs = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer({
                let logs = logs.clone();
                move || logs.clone()
            })
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let registry = RingRegistry::new();
            drop(create(&registry, "again").unwrap());
            let _ring = create(&registry, "again").unwrap();
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.matches("Ring registered").count(), 2);
        assert!(output.contains("replaced=false"));
        assert!(output.contains("replaced=true"));
    }
}
