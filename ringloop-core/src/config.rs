// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration parser with strict schema validation.
//!
//! Validates ring, pipeline and receive cache settings at boot-up time.
//! Any invalid field results in a HardValidationError that prevents startup.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HardValidationError, RingloopError, RingloopResult};
use crate::ring::{SyncMode, HANDLE_SIZE, MAX_CAPACITY};
use crate::types::{FlushInterval, LocalityHint, RingName};

/// Upper bound on the number of handles moved per pipeline step.
const MAX_BURST_SIZE: usize = 1024;

/// Upper bound on receive cache size.
const MAX_CACHE_SIZE: usize = u16::MAX as usize;

/// Raw ring configuration as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
struct RawRingConfig {
    name: String,
    capacity: usize,
    #[serde(default = "default_element_size")]
    element_size: usize,
    #[serde(default)]
    producer: SyncMode,
    #[serde(default)]
    consumer: SyncMode,
}

fn default_element_size() -> usize {
    HANDLE_SIZE
}

/// Raw pipeline configuration.
#[derive(Debug, Deserialize)]
struct RawPipelineConfig {
    #[serde(default = "default_flush_interval")]
    flush_interval: u32,
    #[serde(default = "default_burst_size")]
    burst_size: usize,
}

fn default_flush_interval() -> u32 {
    1024
}

fn default_burst_size() -> usize {
    32
}

impl Default for RawPipelineConfig {
    fn default() -> Self {
        Self {
            flush_interval: default_flush_interval(),
            burst_size: default_burst_size(),
        }
    }
}

/// Raw receive cache configuration.
#[derive(Debug, Deserialize)]
struct RawReceiveCacheConfig {
    #[serde(default = "default_cache_size")]
    size: usize,
    #[serde(default)]
    numa_node: Option<usize>,
}

fn default_cache_size() -> usize {
    32
}

impl Default for RawReceiveCacheConfig {
    fn default() -> Self {
        Self {
            size: default_cache_size(),
            numa_node: None,
        }
    }
}

/// Raw root configuration file.
#[derive(Debug, Deserialize)]
struct RawConfig {
    rings: Vec<RawRingConfig>,
    #[serde(default)]
    pipeline: RawPipelineConfig,
    #[serde(default)]
    receive_cache: RawReceiveCacheConfig,
}

/// Validated ring configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingConfig {
    pub name: RingName,
    pub capacity: usize,
    pub element_size: usize,
    pub producer: SyncMode,
    pub consumer: SyncMode,
}

/// Validated pipeline loop configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub flush_interval: FlushInterval,
    pub burst_size: usize,
}

/// Validated receive cache configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiveCacheConfig {
    pub size: usize,
    pub locality: LocalityHint,
}

/// Complete validated configuration.
#[derive(Debug)]
pub struct Config {
    pub rings: Vec<RingConfig>,
    pub pipeline: PipelineConfig,
    pub receive_cache: ReceiveCacheConfig,
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file.
    /// Returns HardValidationError for any invalid fields.
    pub fn load_file(path: impl AsRef<Path>) -> RingloopResult<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(RingloopError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| RingloopError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str) -> RingloopResult<Config> {
        let raw: RawConfig =
            serde_yaml::from_str(content).map_err(|e| RingloopError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?;

        Self::validate(raw)
    }

    /// Validate raw configuration and convert to validated types.
    fn validate(raw: RawConfig) -> RingloopResult<Config> {
        let pipeline = Self::validate_pipeline(raw.pipeline)?;
        let receive_cache = Self::validate_receive_cache(raw.receive_cache)?;

        let mut rings = Vec::with_capacity(raw.rings.len());
        let mut seen_names = std::collections::HashSet::new();

        for (index, raw_ring) in raw.rings.into_iter().enumerate() {
            let ring = Self::validate_ring(raw_ring, index)?;

            if !seen_names.insert(ring.name.clone()) {
                return Err(HardValidationError::DuplicateRingName {
                    name: ring.name.to_string(),
                }
                .into());
            }

            rings.push(ring);
        }

        if rings.is_empty() {
            return Err(HardValidationError::SchemaValidation {
                message: "At least one ring must be defined".to_string(),
            }
            .into());
        }

        Ok(Config {
            rings,
            pipeline,
            receive_cache,
        })
    }

    /// Validate a single ring configuration.
    fn validate_ring(raw: RawRingConfig, index: usize) -> RingloopResult<RingConfig> {
        let name = RingName::new(&raw.name)?;

        if !raw.capacity.is_power_of_two() || raw.capacity > MAX_CAPACITY {
            return Err(HardValidationError::InvalidFieldValue {
                field: "capacity",
                value: raw.capacity.to_string(),
                reason: format!(
                    "Ring {} at index {}: capacity must be a power of two no larger than {}",
                    name, index, MAX_CAPACITY
                ),
            }
            .into());
        }

        if raw.element_size == 0 || raw.element_size % 4 != 0 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "element_size",
                value: raw.element_size.to_string(),
                reason: format!(
                    "Ring {} at index {}: element size must be a non-zero multiple of 4",
                    name, index
                ),
            }
            .into());
        }

        Ok(RingConfig {
            name,
            capacity: raw.capacity,
            element_size: raw.element_size,
            producer: raw.producer,
            consumer: raw.consumer,
        })
    }

    /// Validate pipeline configuration.
    fn validate_pipeline(raw: RawPipelineConfig) -> RingloopResult<PipelineConfig> {
        let flush_interval = FlushInterval::new(raw.flush_interval).map_err(|e| {
            HardValidationError::InvalidFieldValue {
                field: "flush_interval",
                value: raw.flush_interval.to_string(),
                reason: e.to_string(),
            }
        })?;

        if raw.burst_size == 0 || raw.burst_size > MAX_BURST_SIZE {
            return Err(HardValidationError::InvalidFieldValue {
                field: "burst_size",
                value: raw.burst_size.to_string(),
                reason: format!("Must be between 1 and {}", MAX_BURST_SIZE),
            }
            .into());
        }

        Ok(PipelineConfig {
            flush_interval,
            burst_size: raw.burst_size,
        })
    }

    /// Validate receive cache configuration.
    fn validate_receive_cache(raw: RawReceiveCacheConfig) -> RingloopResult<ReceiveCacheConfig> {
        if raw.size == 0 || raw.size > MAX_CACHE_SIZE {
            return Err(HardValidationError::InvalidFieldValue {
                field: "receive_cache.size",
                value: raw.size.to_string(),
                reason: format!("Must be between 1 and {}", MAX_CACHE_SIZE),
            }
            .into());
        }

        let locality = match raw.numa_node {
            Some(node) => LocalityHint::Node(node),
            None => LocalityHint::Any,
        };

        Ok(ReceiveCacheConfig {
            size: raw.size,
            locality,
        })
    }
}
