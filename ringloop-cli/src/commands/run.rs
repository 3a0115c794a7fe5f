// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `ringloop run` command - Drive synthetic traffic through a pipeline loop.
//!
//! Each producer thread owns a receive cache over a synthetic source and
//! forwards into the first handle ring of the configuration. One consumer
//! thread drains that ring under a pipeline loop. Ctrl-C or the optional
//! duration stops every worker through a shared stop controller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ringloop_core::error::SourceError;
use ringloop_core::ring::HANDLE_SIZE;
use ringloop_core::{
    BurstSource, CacheHeader, ChannelId, ConfigLoader, DiagnosticCommands, LinkEvent,
    LinkStateCounters, LinkSubscription, LocalityHint, LoopReport, Pipeline, PipelineConfig,
    PipelineLoop, ReceiveCache, ReceiveCacheConfig, RingBuffer, RingDrain, RingRegistry,
    RingloopResult, SourceId, StopController,
};
use thiserror::Error;

use crate::cpu_affinity::CpuAllocator;

/// Refills between synthetic link-state changes.
const LINK_FLAP_PERIOD: u64 = 4096;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("At least one producer is required (max {max})")]
    InvalidProducerCount { max: usize },

    #[error("No ring with handle-sized elements is configured")]
    NoHandleRing,

    #[error("Ring {name} is single-producer but {producers} producers were requested")]
    SingleProducerRing { name: String, producers: usize },

    #[error("Worker thread panicked")]
    WorkerPanicked,
}

/// Source that fabricates sequential handles and counts releases.
struct SyntheticSource {
    id: SourceId,
    next: usize,
    released: Arc<AtomicU64>,
}

impl BurstSource for SyntheticSource {
    type Handle = usize;

    fn burst_receive(
        &mut self,
        source: SourceId,
        channel: ChannelId,
        out: &mut Vec<usize>,
        max: usize,
    ) -> Result<usize, SourceError> {
        if source != self.id {
            return Err(SourceError::UnknownSource { source_id: source });
        }
        if channel.value() != 0 {
            return Err(SourceError::UnknownChannel {
                source_id: source,
                channel_id: channel,
            });
        }
        out.extend(self.next..self.next + max);
        self.next += max;
        Ok(max)
    }

    fn release(&mut self, _handle: usize) {
        self.released.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Debug, Default)]
struct ProducerStats {
    generated: u64,
    forwarded: u64,
    released: u64,
}

fn produce(
    id: SourceId,
    cache_config: ReceiveCacheConfig,
    ring: Arc<RingBuffer>,
    subscription: Arc<LinkSubscription>,
    stop: StopController,
    allocator: Arc<CpuAllocator>,
) -> RingloopResult<ProducerStats> {
    allocator.pin_or_warn(cache_config.locality, "producer");

    let released = Arc::new(AtomicU64::new(0));
    let source = SyntheticSource {
        id,
        next: 0,
        released: Arc::clone(&released),
    };
    let mut cache = ReceiveCache::create(
        source,
        CacheHeader::new(id, ChannelId::new(0)),
        cache_config.size,
        cache_config.locality,
    )?;

    let mut forwarded = 0u64;
    let mut refills = 0u64;
    while !stop.is_stopped() {
        if cache.is_exhausted() {
            cache.refill()?;
            refills += 1;
            if refills % LINK_FLAP_PERIOD == 0 {
                subscription.record(LinkEvent::StatusChange);
            }
        }
        let moved = cache.forward(&ring)?;
        if moved == 0 {
            std::hint::spin_loop();
        }
        forwarded += moved as u64;
    }

    let generated = cache.source().next as u64;
    cache.close();

    Ok(ProducerStats {
        generated,
        forwarded,
        released: released.load(Ordering::Relaxed),
    })
}

fn consume(
    ring: Arc<RingBuffer>,
    pipeline: PipelineConfig,
    stop: StopController,
    allocator: Arc<CpuAllocator>,
) -> RingloopResult<(LoopReport, u64)> {
    allocator.pin_or_warn(LocalityHint::Any, "pipeline");

    let mut delivered = 0u64;
    let report = {
        let mut drain = RingDrain::new(ring, pipeline.burst_size, |batch: &[usize]| {
            delivered += batch.len() as u64
        })?;
        let report = PipelineLoop::from_config(&pipeline).run(
            &mut drain,
            |p| stop.control(p),
            stop.flag(),
        )?;
        // Emit whatever the last steps buffered.
        drain.flush();
        report
    };
    Ok((report, delivered))
}

pub async fn execute(
    config_path: &str,
    producers: usize,
    duration_ms: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigLoader::load_file(config_path)?;

    let max_producers = usize::from(u16::MAX) + 1;
    if producers == 0 || producers > max_producers {
        return Err(RunError::InvalidProducerCount { max: max_producers }.into());
    }

    let registry = RingRegistry::new_shared();
    let rings = config
        .rings
        .iter()
        .map(|rc| registry.create_from_config(rc))
        .collect::<Result<Vec<_>, _>>()?;
    let target = rings
        .iter()
        .find(|r| r.element_size() == HANDLE_SIZE)
        .cloned()
        .ok_or(RunError::NoHandleRing)?;
    if producers > 1 && target.producer_mode().is_single() {
        return Err(RunError::SingleProducerRing {
            name: target.name().to_string(),
            producers,
        }
        .into());
    }

    let counters = LinkStateCounters::new_shared();
    let table = DiagnosticCommands::with_defaults(Arc::clone(&registry), Arc::clone(&counters))?;
    let subscriptions = (0..producers)
        .map(|i| counters.subscribe(SourceId::new(i as u16)).map(Arc::new))
        .collect::<Result<Vec<_>, _>>()?;

    let stop = StopController::new();
    let allocator = Arc::new(CpuAllocator::new());

    tracing::info!(
        ring = %target.name(),
        producers = producers,
        flush_interval = %config.pipeline.flush_interval,
        burst_size = config.pipeline.burst_size,
        "Pipeline running, press Ctrl-C to stop"
    );

    let consumer = {
        let ring = Arc::clone(&target);
        let pipeline = config.pipeline;
        let stop = stop.clone();
        let allocator = Arc::clone(&allocator);
        thread::spawn(move || consume(ring, pipeline, stop, allocator))
    };

    let workers: Vec<_> = subscriptions
        .iter()
        .map(|sub| {
            let id = sub.source();
            let cache_config = config.receive_cache;
            let ring = Arc::clone(&target);
            let sub = Arc::clone(sub);
            let stop = stop.clone();
            let allocator = Arc::clone(&allocator);
            thread::spawn(move || produce(id, cache_config, ring, sub, stop, allocator))
        })
        .collect();

    match duration_ms {
        Some(ms) => {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(ms)) => {}
                result = tokio::signal::ctrl_c() => result?,
            }
        }
        None => tokio::signal::ctrl_c().await?,
    }

    tracing::info!("Stopping pipeline");
    stop.stop();

    let mut totals = ProducerStats::default();
    for worker in workers {
        let stats = worker.join().map_err(|_| RunError::WorkerPanicked)??;
        totals.generated += stats.generated;
        totals.forwarded += stats.forwarded;
        totals.released += stats.released;
    }
    let (report, delivered) = consumer.join().map_err(|_| RunError::WorkerPanicked)??;
    let left_in_ring = target.count() as u64;

    println!("Pipeline stopped ({:?})", report.exit);
    println!("  Iterations:         {}", report.iterations);
    println!("  Flushes:            {}", report.flushes);
    println!("  Generated:          {}", totals.generated);
    println!("  Forwarded:          {}", totals.forwarded);
    println!("  Released unread:    {}", totals.released);
    println!("  Delivered:          {}", delivered);
    println!("  Left in ring:       {}", left_in_ring);

    if totals.forwarded == delivered + left_in_ring
        && totals.generated == totals.forwarded + totals.released
    {
        println!("✓ Every handle accounted for");
    } else {
        tracing::warn!(
            forwarded = totals.forwarded,
            delivered = delivered,
            left_in_ring = left_in_ring,
            "Handle accounting mismatch"
        );
    }

    println!();
    let info = table.execute(&format!("/ring/info,{}", target.name()))?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    for sub in &subscriptions {
        let lsc = table.execute(&format!("/ethdev/lsc,{}", sub.source()))?;
        println!("source {}: {}", sub.source(), lsc);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_source_rejects_foreign_ids() {
        let mut source = SyntheticSource {
            id: SourceId::new(1),
            next: 0,
            released: Arc::new(AtomicU64::new(0)),
        };
        let mut out = Vec::new();

        assert_eq!(
            source
                .burst_receive(SourceId::new(1), ChannelId::new(0), &mut out, 4)
                .unwrap(),
            4
        );
        assert_eq!(out, vec![0, 1, 2, 3]);
        assert!(source
            .burst_receive(SourceId::new(2), ChannelId::new(0), &mut out, 4)
            .is_err());
        assert!(source
            .burst_receive(SourceId::new(1), ChannelId::new(3), &mut out, 4)
            .is_err());
    }

    #[tokio::test]
    async fn test_run_for_duration() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ringloop.yaml");
        std::fs::write(
            &path,
            r#"
rings:
  - name: rx-to-worker
    capacity: 256
    producer: multi
    consumer: single
pipeline:
  flush_interval: 16
  burst_size: 8
receive_cache:
  size: 16
"#,
        )
        .unwrap();

        execute(path.to_str().unwrap(), 2, Some(50)).await.unwrap();
    }

    #[tokio::test]
    async fn test_single_producer_ring_rejects_many_producers() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ringloop.yaml");
        std::fs::write(
            &path,
            r#"
rings:
  - name: sp
    capacity: 64
    producer: single
"#,
        )
        .unwrap();

        let err = execute(path.to_str().unwrap(), 2, Some(1)).await.unwrap_err();
        assert!(err.to_string().contains("single-producer"));
    }
}
