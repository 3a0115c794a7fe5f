// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Lock-free bounded rings.
//!
//! Fixed-size element handles move between producer and consumer threads
//! with Single or Multi synchronization on each side, in all-or-nothing
//! (bulk) or best-effort (burst) transfers.

mod endpoint;
mod headtail;
mod registry;
mod ring_buffer;
mod sync;

pub use endpoint::{RingConsumer, RingProducer};
pub use registry::RingRegistry;
pub use ring_buffer::{RingBuffer, RingInfo, HANDLE_SIZE, MAX_CAPACITY, MIN_CAPACITY};
pub use sync::{Behavior, SyncMode, Transfer};
