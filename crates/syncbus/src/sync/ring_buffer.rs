// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounded FIFO guarded by one mutex.

use super::ring::RingBuffer;
use parking_lot::Mutex;

/// Thread-safe wrapper around [`RingBuffer`].
///
/// Push on a full buffer is rejected: the item comes back in `Err`, nothing
/// already stored is overwritten.
#[derive(Debug)]
pub struct SyncRingBuffer<T, const N: usize> {
    ring: Mutex<RingBuffer<T, N>>,
}

impl<T, const N: usize> SyncRingBuffer<T, N> {
    pub fn new() -> Self {
        Self {
            ring: Mutex::new(RingBuffer::new()),
        }
    }

    #[inline]
    pub fn push(&self, item: T) -> Result<(), T> {
        self.ring.lock().push(item)
    }

    /// Build the item under the lock and append it.
    ///
    /// The constructor runs even when the buffer turns out full; the built
    /// item is then returned in `Err`.
    pub fn emplace<F>(&self, make: F) -> Result<(), T>
    where
        F: FnOnce() -> T,
    {
        let mut ring = self.ring.lock();
        ring.push(make())
    }

    #[inline]
    pub fn pop(&self) {
        self.ring.lock().pop();
    }

    #[inline]
    pub fn front_pop(&self) -> Option<T> {
        self.ring.lock().front_pop()
    }

    /// Remove every element, returned in FIFO order.
    pub fn drain(&self) -> Vec<T> {
        let mut ring = self.ring.lock();
        let mut out = Vec::with_capacity(ring.len());
        while let Some(item) = ring.front_pop() {
            out.push(item);
        }
        out
    }

    /// Atomically take the tail and discard the rest.
    pub fn back_clear(&self) -> Option<T> {
        let mut ring = self.ring.lock();
        let last = ring.back_pop();
        ring.clear();
        last
    }

    pub fn clear(&self) {
        self.ring.lock().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ring.lock().is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.ring.lock().is_full()
    }

    pub fn len(&self) -> usize {
        self.ring.lock().len()
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<T: Clone, const N: usize> SyncRingBuffer<T, N> {
    pub fn front(&self) -> Option<T> {
        self.ring.lock().front().cloned()
    }

    pub fn back(&self) -> Option<T> {
        self.ring.lock().back().cloned()
    }
}

impl<T, const N: usize> Default for SyncRingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
