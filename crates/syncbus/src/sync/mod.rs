// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Synchronization primitives and thread-safe containers.
//!
//! Each container holds its lock for a single operation and never across a
//! caller-supplied callback (except the item constructor of `emplace`).

mod dictionary;
mod queue;
mod ring;
mod ring_buffer;
mod signal;

pub use dictionary::SyncDictionary;
pub use queue::SyncQueue;
pub use ring::RingBuffer;
pub use ring_buffer::SyncRingBuffer;
pub use signal::Signal;
