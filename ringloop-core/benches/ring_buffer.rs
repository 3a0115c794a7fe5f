// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Ring buffer microbenchmarks.
//!
//! Measures bulk and burst transfers of handles and fixed-width elements
//! through a ring at various batch sizes and sync modes.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ringloop_core::{RingBuffer, RingName, SyncMode};

/// Batch sizes to benchmark (in elements).
const BATCH_SIZES: &[usize] = &[1, 8, 32, 128];

const CAPACITY: usize = 4096;

fn ring(name: &str, producer: SyncMode, consumer: SyncMode) -> RingBuffer {
    RingBuffer::with_handles(RingName::new(name).unwrap(), CAPACITY, producer, consumer)
        .expect("Failed to create ring")
}

/// Benchmark enqueue+dequeue of a batch on one thread, per sync mode.
fn bench_bulk_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_bulk_roundtrip");
    group.measurement_time(Duration::from_secs(5));

    for (label, mode) in [("single", SyncMode::Single), ("multi", SyncMode::Multi)] {
        for &size in BATCH_SIZES {
            group.throughput(Throughput::Elements(size as u64));

            group.bench_with_input(BenchmarkId::new(label, size), &size, |b, &size| {
                let ring = ring("bench-bulk", mode, mode);
                let input: Vec<usize> = (0..size).collect();
                let mut output = vec![0usize; size];

                b.iter(|| {
                    ring.enqueue_bulk(black_box(&input)).unwrap();
                    ring.dequeue_bulk(black_box(&mut output)).unwrap();
                });
            });
        }
    }

    group.finish();
}

/// Benchmark burst dequeue from a partially filled ring.
fn bench_burst_partial(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_burst_partial");
    group.measurement_time(Duration::from_secs(5));

    for &size in BATCH_SIZES {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let ring = ring("bench-burst", SyncMode::Single, SyncMode::Single);
            let input: Vec<usize> = (0..size / 2 + 1).collect();
            let mut output = vec![0usize; size];

            b.iter(|| {
                ring.enqueue_burst(&input).unwrap();
                black_box(ring.dequeue_burst(&mut output).unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark 16-byte elements in generic-element mode.
fn bench_elem_roundtrip(c: &mut Criterion) {
    const ESIZE: usize = 16;
    let mut group = c.benchmark_group("ring_elem_roundtrip");
    group.measurement_time(Duration::from_secs(5));

    for &size in BATCH_SIZES {
        group.throughput(Throughput::Bytes((size * ESIZE) as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let ring = RingBuffer::create(
                RingName::new("bench-elem").unwrap(),
                CAPACITY,
                ESIZE,
                SyncMode::Single,
                SyncMode::Single,
            )
            .expect("Failed to create ring");
            let input = vec![0xABu8; size * ESIZE];
            let mut output = vec![0u8; size * ESIZE];

            b.iter(|| {
                ring.enqueue_bulk_elem(black_box(&input), ESIZE).unwrap();
                ring.dequeue_bulk_elem(black_box(&mut output), ESIZE).unwrap();
            });
        });
    }

    group.finish();
}

/// Benchmark a producer thread against a consumer thread.
fn bench_cross_thread(c: &mut Criterion) {
    const BATCH: usize = 32;
    const TOTAL: usize = 1 << 16;

    let mut group = c.benchmark_group("ring_cross_thread");
    group.sample_size(20);
    group.throughput(Throughput::Elements(TOTAL as u64));

    for (label, mode) in [("spsc", SyncMode::Single), ("mpmc", SyncMode::Multi)] {
        group.bench_function(label, |b| {
            b.iter(|| {
                let ring = Arc::new(ring("bench-xthread", mode, mode));
                let producer = {
                    let ring = Arc::clone(&ring);
                    thread::spawn(move || {
                        let batch: Vec<usize> = (0..BATCH).collect();
                        let mut sent = 0;
                        while sent < TOTAL {
                            sent += ring.enqueue_burst(&batch).unwrap();
                        }
                    })
                };

                let mut out = [0usize; BATCH];
                let mut received = 0;
                while received < TOTAL {
                    received += ring.dequeue_burst(&mut out).unwrap();
                }
                producer.join().unwrap();
                black_box(received);
            });
        });
    }

    group.bench_function("spsc_split", |b| {
        b.iter(|| {
            let (mut tx, mut rx) = ring("bench-split", SyncMode::Single, SyncMode::Single)
                .split()
                .expect("Failed to split ring");
            let producer = thread::spawn(move || {
                let batch: Vec<usize> = (0..BATCH).collect();
                let mut sent = 0;
                while sent < TOTAL {
                    sent += tx.enqueue_burst(&batch).unwrap();
                }
            });

            let mut out = [0usize; BATCH];
            let mut received = 0;
            while received < TOTAL {
                received += rx.dequeue_burst(&mut out).unwrap();
            }
            producer.join().unwrap();
            black_box(received);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_bulk_roundtrip,
    bench_burst_partial,
    bench_elem_roundtrip,
    bench_cross_thread
);
criterion_main!(benches);
