// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Worker thread pinning.
//!
//! Spreads producer and consumer threads round-robin across CPU cores,
//! preferring the cores of a requested NUMA node when the sysfs topology
//! is available.

use std::sync::atomic::{AtomicUsize, Ordering};

use nix::sched::{sched_setaffinity, CpuSet};
use nix::unistd::Pid;
use ringloop_core::LocalityHint;

/// Round-robin CPU allocator for worker threads.
pub struct CpuAllocator {
    num_cpus: usize,
    next_cpu: AtomicUsize,
    /// CPUs per NUMA node; a single node holding every CPU when unknown.
    numa_nodes: Vec<Vec<usize>>,
}

impl CpuAllocator {
    pub fn new() -> Self {
        let num_cpus = num_cpus::get();
        let numa_nodes = detect_numa_nodes(num_cpus);

        tracing::debug!(
            num_cpus = num_cpus,
            numa_nodes = numa_nodes.len(),
            "CpuAllocator initialized"
        );

        Self {
            num_cpus,
            next_cpu: AtomicUsize::new(0),
            numa_nodes,
        }
    }

    /// Next CPU in round-robin order.
    pub fn allocate(&self) -> usize {
        self.next_cpu.fetch_add(1, Ordering::Relaxed) % self.num_cpus
    }

    /// Next CPU honoring `locality`; falls back to any CPU for unknown nodes.
    pub fn allocate_for(&self, locality: LocalityHint) -> usize {
        match locality {
            LocalityHint::Node(node) => match self.numa_nodes.get(node) {
                Some(cpus) if !cpus.is_empty() => {
                    cpus[self.next_cpu.fetch_add(1, Ordering::Relaxed) % cpus.len()]
                }
                _ => self.allocate(),
            },
            LocalityHint::Any => self.allocate(),
        }
    }

    /// Pin the calling thread to the next CPU for `locality`.
    pub fn pin_current_thread(&self, locality: LocalityHint) -> Result<usize, nix::Error> {
        let cpu = self.allocate_for(locality);
        let mut cpuset = CpuSet::new();
        cpuset.set(cpu)?;
        // Pid 0 targets the calling thread.
        sched_setaffinity(Pid::from_raw(0), &cpuset)?;

        tracing::debug!(cpu = cpu, "Thread pinned to CPU");
        Ok(cpu)
    }

    /// Pin the calling thread, logging instead of failing.
    pub fn pin_or_warn(&self, locality: LocalityHint, worker: &str) -> Option<usize> {
        match self.pin_current_thread(locality) {
            Ok(cpu) => Some(cpu),
            Err(e) => {
                tracing::warn!(
                    worker = %worker,
                    error = %e,
                    "Failed to pin thread, running unpinned"
                );
                None
            }
        }
    }

    pub fn num_cpus(&self) -> usize {
        self.num_cpus
    }

    pub fn num_numa_nodes(&self) -> usize {
        self.numa_nodes.len()
    }
}

impl Default for CpuAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Read per-node CPU lists from /sys/devices/system/node.
fn detect_numa_nodes(num_cpus: usize) -> Vec<Vec<usize>> {
    let mut nodes: Vec<Vec<usize>> = Vec::new();

    if let Ok(entries) = std::fs::read_dir("/sys/devices/system/node") {
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(node) = name
                .to_str()
                .and_then(|n| n.strip_prefix("node"))
                .and_then(|n| n.parse::<usize>().ok())
            else {
                continue;
            };
            let Ok(cpulist) = std::fs::read_to_string(entry.path().join("cpulist")) else {
                continue;
            };
            let cpus = parse_cpu_list(cpulist.trim());
            if cpus.is_empty() {
                continue;
            }
            if nodes.len() <= node {
                nodes.resize_with(node + 1, Vec::new);
            }
            nodes[node] = cpus;
        }
    }

    if nodes.iter().all(|n| n.is_empty()) {
        nodes = vec![(0..num_cpus).collect()];
    }
    nodes
}

/// Parse a CPU list string like "0-3,8-11" into CPU indices.
fn parse_cpu_list(s: &str) -> Vec<usize> {
    let mut cpus = Vec::new();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                if let (Ok(start), Ok(end)) = (start.parse::<usize>(), end.parse::<usize>()) {
                    cpus.extend(start..=end);
                }
            }
            None => {
                if let Ok(cpu) = part.parse::<usize>() {
                    cpus.push(cpu);
                }
            }
        }
    }
    cpus
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_parse_cpu_list() {
        assert_eq!(parse_cpu_list("0-3"), vec![0, 1, 2, 3]);
        assert_eq!(parse_cpu_list("0,2,4"), vec![0, 2, 4]);
        assert_eq!(parse_cpu_list("0,2-4,7,10-12"), vec![0, 2, 3, 4, 7, 10, 11, 12]);
        assert_eq!(parse_cpu_list(""), Vec::<usize>::new());
        assert_eq!(parse_cpu_list("x,1"), vec![1]);
    }

    #[test]
    fn test_allocator_initialization() {
        let allocator = CpuAllocator::new();
        assert!(allocator.num_cpus() > 0);
        assert!(allocator.num_numa_nodes() > 0);
    }

    #[test]
    fn test_full_cycle_covers_all_cpus() {
        let allocator = CpuAllocator::new();
        let num = allocator.num_cpus();

        let seen: HashSet<usize> = (0..num).map(|_| allocator.allocate()).collect();
        assert_eq!(seen.len(), num);

        // Wraps back to the first CPU.
        assert_eq!(allocator.allocate(), 0);
    }

    #[test]
    fn test_locality_allocation_is_valid() {
        let allocator = CpuAllocator::new();
        for hint in [LocalityHint::Any, LocalityHint::Node(0), LocalityHint::Node(999)] {
            assert!(allocator.allocate_for(hint) < allocator.num_cpus());
        }
    }

    #[test]
    fn test_concurrent_allocation() {
        let allocator = Arc::new(CpuAllocator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let alloc = Arc::clone(&allocator);
                thread::spawn(move || (0..100).map(|_| alloc.allocate()).collect::<Vec<_>>())
            })
            .collect();

        let mut total = 0;
        for h in handles {
            let cpus = h.join().unwrap();
            assert!(cpus.iter().all(|&c| c < allocator.num_cpus()));
            total += cpus.len();
        }
        assert_eq!(total, 400);
    }

    #[test]
    fn test_pin_current_thread() {
        let allocator = CpuAllocator::new();
        // May fail in restricted environments; must not panic.
        thread::spawn(move || {
            if let Some(cpu) = allocator.pin_or_warn(LocalityHint::Any, "test") {
                assert!(cpu < allocator.num_cpus());
            }
        })
        .join()
        .unwrap();
    }
}
