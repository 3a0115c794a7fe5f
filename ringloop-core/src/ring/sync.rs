// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Synchronization policy values for ring transfers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How many threads may drive one side of a ring concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Exactly one thread calls this side of the ring at any time.
    /// Claims never retry and publishes never wait; a concurrent caller
    /// is detected and panics.
    Single,
    /// Any number of threads may race; ranges are claimed with CAS and
    /// published in claim order.
    #[default]
    Multi,
}

impl SyncMode {
    pub fn is_single(&self) -> bool {
        matches!(self, Self::Single)
    }

    /// Short sync type tag reported by diagnostics.
    pub const fn sync_type(&self) -> &'static str {
        match self {
            Self::Single => "ST",
            Self::Multi => "MT",
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Multi => write!(f, "multi"),
        }
    }
}

/// All-or-nothing versus best-effort transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Move exactly `n` elements or none.
    Fixed,
    /// Move as many as currently possible, up to `n`.
    Variable,
}

/// Transfer policy: behavior plus an optional per-call sync override.
///
/// When `sync` is `None` the ring's configured producer or consumer mode
/// applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub behavior: Behavior,
    pub sync: Option<SyncMode>,
}

impl Transfer {
    pub const BULK: Self = Self {
        behavior: Behavior::Fixed,
        sync: None,
    };

    pub const BURST: Self = Self {
        behavior: Behavior::Variable,
        sync: None,
    };

    /// Force a specific sync path for this call.
    pub const fn with_sync(self, sync: SyncMode) -> Self {
        Self {
            behavior: self.behavior,
            sync: Some(sync),
        }
    }

    pub(crate) fn resolve(&self, configured: SyncMode) -> SyncMode {
        self.sync.unwrap_or(configured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_type_tags() {
        assert_eq!(SyncMode::Single.sync_type(), "ST");
        assert_eq!(SyncMode::Multi.sync_type(), "MT");
    }

    #[test]
    fn test_transfer_resolve() {
        assert_eq!(Transfer::BULK.resolve(SyncMode::Single), SyncMode::Single);
        assert_eq!(
            Transfer::BURST
                .with_sync(SyncMode::Multi)
                .resolve(SyncMode::Single),
            SyncMode::Multi
        );
    }

    #[test]
    fn test_sync_mode_yaml() {
        let mode: SyncMode = serde_yaml::from_str("single").unwrap();
        assert_eq!(mode, SyncMode::Single);
        let mode: SyncMode = serde_yaml::from_str("multi").unwrap();
        assert_eq!(mode, SyncMode::Multi);
    }
}
