// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Custom error types for ringloop.
//!
//! Explicit enum error types per area, folded into one top-level error.
//! No `Box<dyn Error>`, no `anyhow::Result` - all errors are strongly typed.
//!
//! Transfer shortfalls (a burst moving fewer elements than requested, a bulk
//! moving none) are not errors and never appear here.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{ChannelId, SourceId};

/// Coarse classification of every error the crate can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed capacity, element size, zero-length request, unknown identifier.
    InvalidArgument,
    /// Storage could not be allocated at creation time.
    OutOfMemory,
    /// Diagnostic query against an unregistered name.
    NotFound,
    /// Registration of a name or source that is already live.
    AlreadyExists,
    /// Negative return from a loop control callback.
    ControlError,
}

/// Top-level error type for ringloop.
#[derive(Debug, Error)]
pub enum RingloopError {
    // =========================================================================
    // Configuration Errors - Fail-Fast on Invalid Config
    // =========================================================================
    #[error("Hard validation error: {0}")]
    HardValidation(#[from] HardValidationError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    // =========================================================================
    // Data Path Errors
    // =========================================================================
    #[error("Ring error: {0}")]
    Ring(#[from] RingError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Burst source error: {0}")]
    Source(#[from] SourceError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Link state error: {0}")]
    LinkState(#[from] LinkStateError),

    #[error("Diagnostic command error: {0}")]
    Diagnostic(#[from] DiagnosticError),

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl RingloopError {
    /// Classify this error into the crate-wide taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::HardValidation(_) | Self::ConfigParse { .. } => ErrorKind::InvalidArgument,
            Self::ConfigNotFound { .. } => ErrorKind::NotFound,
            Self::Ring(e) => e.kind(),
            Self::Registry(e) => e.kind(),
            Self::Source(_) => ErrorKind::InvalidArgument,
            Self::Pipeline(e) => e.kind(),
            Self::LinkState(e) => e.kind(),
            Self::Diagnostic(e) => e.kind(),
            Self::Io { .. } => ErrorKind::InvalidArgument,
        }
    }
}

/// Hard validation errors cause startup to abort.
/// Used when configuration is invalid and the system cannot safely start.
#[derive(Debug, Error)]
pub enum HardValidationError {
    #[error("Missing required field: {field} in {context}")]
    MissingRequiredField {
        field: &'static str,
        context: String,
    },

    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Duplicate ring name: {name}")]
    DuplicateRingName { name: String },

    #[error("Schema validation failed: {message}")]
    SchemaValidation { message: String },
}

/// Ring creation and transfer argument errors.
#[derive(Debug, Error)]
pub enum RingError {
    #[error("Ring capacity {capacity} is not a power of two in [{min}, {max}]")]
    InvalidCapacity {
        capacity: usize,
        min: usize,
        max: usize,
    },

    #[error("Invalid element size {element_size}: must be a non-zero multiple of 4 bytes")]
    InvalidElementSize { element_size: usize },

    #[error("Element size mismatch: ring stores {expected} bytes, request uses {actual}")]
    ElementSizeMismatch { expected: usize, actual: usize },

    #[error("Buffer of {len} bytes is not a whole number of {element_size}-byte elements")]
    MisalignedBuffer { len: usize, element_size: usize },

    #[error("Zero-length transfer request")]
    EmptyRequest,

    #[error("Ring storage size overflows: {capacity} x {element_size} bytes")]
    StorageOverflow { capacity: usize, element_size: usize },

    #[error("Out of memory allocating {bytes} bytes of ring storage")]
    OutOfMemory { bytes: usize },

    #[error("Ring {name} has a multi-threaded {side} side and cannot be split")]
    NotSplittable { name: String, side: &'static str },
}

impl RingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OutOfMemory { .. } => ErrorKind::OutOfMemory,
            _ => ErrorKind::InvalidArgument,
        }
    }
}

/// Ring registry lookups.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Ring not found: {name}")]
    NotFound { name: String },

    #[error("Ring already exists: {name}")]
    AlreadyExists { name: String },
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
        }
    }
}

/// Errors reported by a burst source or by a receive cache driving it.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Unknown source id: {source_id}")]
    UnknownSource { source_id: SourceId },

    #[error("Unknown channel {channel_id} on source {source_id}")]
    UnknownChannel {
        source_id: SourceId,
        channel_id: ChannelId,
    },

    #[error("Source returned {returned} handles for a request of at most {max}")]
    Overrun { returned: usize, max: usize },

    #[error("Source reported {reported} handles but wrote {written}")]
    CountMismatch { reported: usize, written: usize },

    #[error("Receive cache size must be at least 1")]
    ZeroSize,

    #[error("Out of memory allocating receive cache for {size} handles")]
    OutOfMemory { size: usize },
}

impl SourceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OutOfMemory { .. } => ErrorKind::OutOfMemory,
            _ => ErrorKind::InvalidArgument,
        }
    }
}

/// Pipeline loop errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Flush interval {interval} must be zero or a power of two")]
    InvalidFlushInterval { interval: u32 },

    #[error("Control callback failed with code {code} at iteration {iteration}")]
    Control { code: i32, iteration: u64 },
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFlushInterval { .. } => ErrorKind::InvalidArgument,
            Self::Control { .. } => ErrorKind::ControlError,
        }
    }
}

/// Link-state counter registration errors.
#[derive(Debug, Error)]
pub enum LinkStateError {
    #[error("Source {source_id} is already subscribed")]
    AlreadySubscribed { source_id: SourceId },

    #[error("Source {source_id} is not subscribed")]
    NotSubscribed { source_id: SourceId },
}

impl LinkStateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadySubscribed { .. } => ErrorKind::AlreadyExists,
            Self::NotSubscribed { .. } => ErrorKind::NotFound,
        }
    }
}

/// Diagnostic command dispatch errors.
#[derive(Debug, Error)]
pub enum DiagnosticError {
    #[error("Unknown diagnostic command: {command}")]
    UnknownCommand { command: String },

    #[error("Command {command} requires a parameter")]
    MissingParameter { command: String },

    #[error("Invalid parameter for {command}: {param}")]
    InvalidParameter { command: String, param: String },

    #[error("Diagnostic command already registered: {command}")]
    DuplicateCommand { command: String },

    #[error("Failed to encode reply for {command}: {message}")]
    Encode { command: String, message: String },
}

impl DiagnosticError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownCommand { .. } => ErrorKind::NotFound,
            Self::DuplicateCommand { .. } => ErrorKind::AlreadyExists,
            _ => ErrorKind::InvalidArgument,
        }
    }
}

/// Result type alias using RingloopError.
pub type RingloopResult<T> = Result<T, RingloopError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hard_validation_error_display() {
        let err = HardValidationError::MissingRequiredField {
            field: "capacity",
            context: "ring 'rx-0'".to_string(),
        };
        assert!(err.to_string().contains("capacity"));
        assert!(err.to_string().contains("rx-0"));
    }

    #[test]
    fn test_error_chain() {
        let ring_err = RingError::InvalidCapacity {
            capacity: 3,
            min: 2,
            max: 1 << 28,
        };
        let err: RingloopError = ring_err.into();
        assert!(matches!(err, RingloopError::Ring(_)));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_error_kinds() {
        let oom: RingloopError = RingError::OutOfMemory { bytes: 64 }.into();
        assert_eq!(oom.kind(), ErrorKind::OutOfMemory);

        let missing: RingloopError = RegistryError::NotFound {
            name: "rx".to_string(),
        }
        .into();
        assert_eq!(missing.kind(), ErrorKind::NotFound);

        let control: RingloopError = PipelineError::Control {
            code: -5,
            iteration: 8,
        }
        .into();
        assert_eq!(control.kind(), ErrorKind::ControlError);

        let dup: RingloopError = LinkStateError::AlreadySubscribed {
            source_id: SourceId::new(1),
        }
        .into();
        assert_eq!(dup.kind(), ErrorKind::AlreadyExists);
    }
}
