// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `ringloop stress` command - Multi-producer ring stress check.
//!
//! Every producer enqueues uniquely tagged handles into one multi-producer
//! ring while a single consumer drains it concurrently. The run fails if any
//! tag is lost or seen twice.

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use ringloop_core::ring::MAX_CAPACITY;
use ringloop_core::{LocalityHint, RingBuffer, RingName, SyncMode};
use thiserror::Error;

use crate::cpu_affinity::CpuAllocator;

/// Producer index lives above this bit in a tag.
const TAG_SHIFT: u32 = 32;

/// Largest ring the stress check will allocate.
const STRESS_RING_CAPACITY: usize = 1 << 16;

#[derive(Debug, Error)]
pub enum StressError {
    #[error("Invalid stress parameters: {0}")]
    InvalidParameters(String),

    #[error("Lost handles: expected {expected}, received {received}")]
    Lost { expected: usize, received: usize },

    #[error("Duplicate handle: producer {producer}, sequence {sequence}")]
    Duplicate { producer: usize, sequence: usize },

    #[error("Unknown handle tag {0:#x}")]
    UnknownTag(usize),

    #[error("Worker thread panicked")]
    WorkerPanicked,
}

fn tag(producer: usize, sequence: usize) -> usize {
    (producer << TAG_SHIFT) | sequence
}

pub async fn execute(
    producers: usize,
    per_producer: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    if producers == 0 || per_producer == 0 {
        return Err(StressError::InvalidParameters(
            "producers and per-producer count must be non-zero".to_string(),
        )
        .into());
    }
    if per_producer >= 1 << TAG_SHIFT || producers >= 1 << (usize::BITS - TAG_SHIFT) {
        return Err(StressError::InvalidParameters(format!(
            "at most 2^{} handles per producer",
            TAG_SHIFT
        ))
        .into());
    }

    let total = producers * per_producer;
    let capacity = total
        .next_power_of_two()
        .min(STRESS_RING_CAPACITY)
        .min(MAX_CAPACITY);
    let ring = Arc::new(RingBuffer::with_handles(
        RingName::new("stress")?,
        capacity,
        SyncMode::Multi,
        SyncMode::Single,
    )?);
    let allocator = Arc::new(CpuAllocator::new());

    tracing::info!(
        producers = producers,
        per_producer = per_producer,
        capacity = capacity,
        "Starting ring stress check"
    );

    let started = Instant::now();
    let workers: Vec<_> = (0..producers)
        .map(|p| {
            let ring = Arc::clone(&ring);
            let allocator = Arc::clone(&allocator);
            thread::spawn(move || {
                allocator.pin_or_warn(LocalityHint::Any, "stress-producer");
                let mut batch = Vec::with_capacity(32);
                let mut sequence = 0;
                while sequence < per_producer {
                    let end = (sequence + 32).min(per_producer);
                    batch.clear();
                    batch.extend((sequence..end).map(|s| tag(p, s)));
                    // Handle rings always accept `usize` batches.
                    sequence += ring.enqueue_burst(&batch).unwrap_or(0);
                }
            })
        })
        .collect();

    // Drain on a dedicated thread so the ring can be smaller than the total.
    let consumer = {
        let ring = Arc::clone(&ring);
        let allocator = Arc::clone(&allocator);
        thread::spawn(move || -> Result<usize, StressError> {
            allocator.pin_or_warn(LocalityHint::Any, "stress-consumer");
            let mut seen = vec![false; total];
            let mut out = [0usize; 64];
            let mut received = 0;
            let mut idle_since: Option<Instant> = None;

            while received < total {
                let n = ring.dequeue_burst(&mut out).unwrap_or(0);
                if n == 0 {
                    // All producers finished and nothing arrived for a while.
                    let idle = idle_since.get_or_insert_with(Instant::now);
                    if idle.elapsed().as_secs() >= 2 {
                        break;
                    }
                    std::hint::spin_loop();
                    continue;
                }
                idle_since = None;

                for &t in &out[..n] {
                    let producer = t >> TAG_SHIFT;
                    let sequence = t & ((1 << TAG_SHIFT) - 1);
                    if producer >= producers || sequence >= per_producer {
                        return Err(StressError::UnknownTag(t));
                    }
                    if std::mem::replace(&mut seen[producer * per_producer + sequence], true) {
                        return Err(StressError::Duplicate { producer, sequence });
                    }
                }
                received += n;
            }
            Ok(received)
        })
    };

    for worker in workers {
        worker.join().map_err(|_| StressError::WorkerPanicked)?;
    }
    let received = consumer.join().map_err(|_| StressError::WorkerPanicked)??;
    let elapsed = started.elapsed();

    if received != total || !ring.is_empty() {
        return Err(StressError::Lost {
            expected: total,
            received,
        }
        .into());
    }

    let rate = total as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
    println!("✓ Stress check passed");
    println!("  Producers:          {}", producers);
    println!("  Handles:            {}", total);
    println!("  Ring capacity:      {}", capacity);
    println!("  Elapsed:            {:.2?}", elapsed);
    println!("  Throughput:         {:.0} handles/s", rate);

    Ok(())
}
