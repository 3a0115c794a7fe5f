// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Pipeline drive loop.
//!
//! Runs a processing engine step after step, and every `flush_interval`
//! iterations forces buffered output downstream and asks a control callback
//! whether to keep going. Cancellation is cooperative: a stop flag is
//! polled between steps, never inside one. The loop does not allocate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, RingError};
use crate::ring::{RingBuffer, HANDLE_SIZE};
use crate::types::FlushInterval;

/// Processing engine driven by [`PipelineLoop`].
pub trait Pipeline {
    /// One non-blocking pass over the engine's inputs.
    fn run_step(&mut self);

    /// Emit any buffered, not yet emitted output.
    fn flush(&mut self);
}

/// Verdict of a control callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    Continue,
    Stop,
    Fail(i32),
}

impl From<i32> for ControlSignal {
    /// 0 continues, a positive value stops, a negative value fails.
    fn from(rc: i32) -> Self {
        match rc {
            0 => Self::Continue,
            rc if rc > 0 => Self::Stop,
            rc => Self::Fail(rc),
        }
    }
}

/// Why a loop returned successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The control callback asked to stop.
    Control,
    /// The external stop flag was observed.
    StopFlag,
}

/// Counters of a finished loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopReport {
    pub iterations: u64,
    pub flushes: u64,
    pub exit: StopReason,
}

/// Drive loop for one pipeline invocation.
#[derive(Debug, Clone, Copy)]
pub struct PipelineLoop {
    flush_interval: FlushInterval,
}

impl PipelineLoop {
    pub fn new(flush_interval: FlushInterval) -> Self {
        Self { flush_interval }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.flush_interval)
    }

    pub fn flush_interval(&self) -> FlushInterval {
        self.flush_interval
    }

    /// Run `pipeline` until the control callback or the stop flag ends it.
    ///
    /// Iterations are counted from 1. When the flush interval is nonzero,
    /// `flush()` and then `control` run on every iteration that is a
    /// multiple of it, and `stop_flag` is checked after a `Continue`. When
    /// it is zero, only `stop_flag` is checked, once per iteration.
    pub fn run<P, C>(
        &self,
        pipeline: &mut P,
        mut control: C,
        stop_flag: &AtomicBool,
    ) -> Result<LoopReport, PipelineError>
    where
        P: Pipeline + ?Sized,
        C: FnMut(&mut P) -> ControlSignal,
    {
        let mut iteration: u64 = 0;
        let mut flushes: u64 = 0;

        loop {
            pipeline.run_step();
            iteration += 1;

            if self.flush_interval.is_never() {
                if stop_flag.load(Ordering::Acquire) {
                    return Ok(LoopReport {
                        iterations: iteration,
                        flushes,
                        exit: StopReason::StopFlag,
                    });
                }
                continue;
            }

            if !self.flush_interval.is_due(iteration) {
                continue;
            }

            pipeline.flush();
            flushes += 1;

            match control(pipeline) {
                ControlSignal::Continue => {}
                ControlSignal::Stop => {
                    return Ok(LoopReport {
                        iterations: iteration,
                        flushes,
                        exit: StopReason::Control,
                    });
                }
                ControlSignal::Fail(code) => {
                    tracing::warn!(
                        code = code,
                        iteration = iteration,
                        "Pipeline control callback failed"
                    );
                    return Err(PipelineError::Control { code, iteration });
                }
            }

            if stop_flag.load(Ordering::Acquire) {
                return Ok(LoopReport {
                    iterations: iteration,
                    flushes,
                    exit: StopReason::StopFlag,
                });
            }
        }
    }
}

/// Shareable stop switch usable as a control callback by several loops.
#[derive(Debug, Clone, Default)]
pub struct StopController {
    stop: Arc<AtomicBool>,
}

impl StopController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal every loop watching this controller to stop.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// The underlying flag, for use as a loop's stop flag.
    pub fn flag(&self) -> &AtomicBool {
        &self.stop
    }

    /// Control callback: `Stop` once `stop()` has been called.
    pub fn control<P: ?Sized>(&self, _pipeline: &mut P) -> ControlSignal {
        if self.is_stopped() {
            ControlSignal::Stop
        } else {
            ControlSignal::Continue
        }
    }
}

/// Pipeline stage that drains a ring in bursts into a buffered sink.
///
/// `run_step` moves up to `burst_size` handles from the ring into an output
/// buffer and emits the buffer once full; `flush` emits whatever is left.
pub struct RingDrain<F>
where
    F: FnMut(&[usize]),
{
    ring: Arc<RingBuffer>,
    scratch: Vec<usize>,
    pending: Vec<usize>,
    burst_size: usize,
    sink: F,
    drained: u64,
}

impl<F> RingDrain<F>
where
    F: FnMut(&[usize]),
{
    /// Fails with `ElementSizeMismatch` unless `ring` holds handles.
    pub fn new(ring: Arc<RingBuffer>, burst_size: usize, sink: F) -> Result<Self, RingError> {
        if ring.element_size() != HANDLE_SIZE {
            return Err(RingError::ElementSizeMismatch {
                expected: ring.element_size(),
                actual: HANDLE_SIZE,
            });
        }
        let burst_size = burst_size.max(1);
        Ok(Self {
            ring,
            scratch: vec![0; burst_size],
            pending: Vec::with_capacity(burst_size * 2),
            burst_size,
            sink,
            drained: 0,
        })
    }

    /// Handles taken from the ring so far.
    pub fn drained(&self) -> u64 {
        self.drained
    }

    /// Handles taken but not yet emitted.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn emit(&mut self) {
        if !self.pending.is_empty() {
            (self.sink)(&self.pending);
            self.pending.clear();
        }
    }
}

impl<F> Pipeline for RingDrain<F>
where
    F: FnMut(&[usize]),
{
    fn run_step(&mut self) {
        // Handle size is checked in `new` and `scratch` is never empty.
        let n = self.ring.dequeue_burst(&mut self.scratch).unwrap_or(0);
        if n == 0 {
            return;
        }
        self.drained += n as u64;
        self.pending.extend_from_slice(&self.scratch[..n]);
        if self.pending.len() >= self.burst_size {
            self.emit();
        }
    }

    fn flush(&mut self) {
        self.emit();
    }
}
