// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for validated inputs.
//!
//! Following the "Newtype" pattern in Rust to ensure valid state by construction.
//! All types validate their invariants at creation time.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{HardValidationError, PipelineError};

/// Maximum length of a ring name.
pub const MAX_RING_NAME_LEN: usize = 32;

/// Validated ring name.
/// Must be non-empty, alphanumeric with hyphens/underscores, max 32 chars.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RingName(String);

impl RingName {
    /// Create a new RingName with validation.
    pub fn new(name: impl Into<String>) -> Result<Self, HardValidationError> {
        let name = name.into();

        if name.is_empty() {
            return Err(HardValidationError::InvalidFieldValue {
                field: "ring_name",
                value: name,
                reason: "Ring name cannot be empty".to_string(),
            });
        }

        if name.len() > MAX_RING_NAME_LEN {
            return Err(HardValidationError::InvalidFieldValue {
                field: "ring_name",
                value: name.clone(),
                reason: format!(
                    "Ring name too long: {} chars (max {})",
                    name.len(),
                    MAX_RING_NAME_LEN
                ),
            });
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(HardValidationError::InvalidFieldValue {
                field: "ring_name",
                value: name,
                reason: "Ring name must contain only ASCII alphanumeric characters, hyphens, and underscores".to_string(),
            });
        }

        Ok(Self(name))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::borrow::Borrow<str> for RingName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RingName {
    type Error = HardValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RingName> for String {
    fn from(name: RingName) -> Self {
        name.0
    }
}

/// Identifier of an external element source (a device port, a socket, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceId(u16);

impl SourceId {
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SourceId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u16>().map(Self)
    }
}

/// Identifier of a channel (queue) within a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChannelId(u16);

impl ChannelId {
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated flush interval for a pipeline loop.
/// Zero disables flushing; any other value must be a power of two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct FlushInterval(u32);

impl FlushInterval {
    /// Never flush, never call the control callback.
    pub const NEVER: Self = Self(0);

    /// Create a new FlushInterval with validation.
    pub fn new(interval: u32) -> Result<Self, PipelineError> {
        if interval != 0 && !interval.is_power_of_two() {
            return Err(PipelineError::InvalidFlushInterval { interval });
        }
        Ok(Self(interval))
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn is_never(&self) -> bool {
        self.0 == 0
    }

    /// True when the 1-based `iteration` lands on a flush point.
    #[inline]
    pub fn is_due(&self, iteration: u64) -> bool {
        self.0 != 0 && iteration & (u64::from(self.0) - 1) == 0
    }
}

impl fmt::Display for FlushInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_never() {
            write!(f, "never")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl TryFrom<u32> for FlushInterval {
    type Error = PipelineError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FlushInterval> for u32 {
    fn from(interval: FlushInterval) -> Self {
        interval.0
    }
}

/// Memory placement request for per-core buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalityHint {
    /// No preference.
    #[default]
    Any,
    /// Prefer memory close to the given NUMA node.
    Node(usize),
}

impl fmt::Display for LocalityHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Node(node) => write!(f, "node {}", node),
        }
    }
}
