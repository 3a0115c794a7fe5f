// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Ringloop Core Library
//!
//! Lock-free bounded rings for moving object handles between threads,
//! a receive cache that stages bursts from an external source, and the
//! drive loop that pulls bursts through a processing stage with periodic
//! flushing and cooperative termination. Read-only diagnostics cover
//! rings and per-source link-state counters.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod link_state;
pub mod pipeline;
pub mod ring;
pub mod rx_cache;
pub mod types;

// Re-export commonly used types
pub use config::{Config, ConfigLoader, PipelineConfig, ReceiveCacheConfig, RingConfig};
pub use diagnostics::DiagnosticCommands;
pub use error::{ErrorKind, HardValidationError, RingloopError, RingloopResult};
pub use link_state::{LinkEvent, LinkStateCounters, LinkStateInfo, LinkSubscription};
pub use pipeline::{
    ControlSignal, LoopReport, Pipeline, PipelineLoop, RingDrain, StopController, StopReason,
};
pub use ring::{
    Behavior, RingBuffer, RingConsumer, RingInfo, RingProducer, RingRegistry, SyncMode, Transfer,
};
pub use rx_cache::{BurstSource, CacheHeader, ReceiveCache};
pub use types::{ChannelId, FlushInterval, LocalityHint, RingName, SourceId};
