// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Unbounded FIFO guarded by one mutex.
//!
//! Every operation takes the lock for exactly one container operation.
//! `is_empty`/`len` are snapshots: another thread may change the queue right
//! after they return, so use [`SyncQueue::front_pop`] instead of
//! check-then-pop.

use parking_lot::Mutex;
use std::collections::VecDeque;

/// Thread-safe unbounded queue.
///
/// # Example
/// ```
/// use syncbus::SyncQueue;
///
/// let queue = SyncQueue::new();
/// queue.push("toto".to_string());
/// assert_eq!(queue.front_pop().as_deref(), Some("toto"));
/// assert!(queue.front_pop().is_none());
/// ```
#[derive(Debug)]
pub struct SyncQueue<T> {
    queue: Mutex<VecDeque<T>>,
}

impl<T> SyncQueue<T> {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Insert at the tail.
    #[inline]
    pub fn push(&self, item: T) {
        self.queue.lock().push_back(item);
    }

    /// Build the item under the lock and insert it at the tail.
    ///
    /// Items built this way land in the order their constructors ran.
    #[inline]
    pub fn emplace<F>(&self, make: F)
    where
        F: FnOnce() -> T,
    {
        let mut queue = self.queue.lock();
        queue.push_back(make());
    }

    /// Remove the head if present.
    #[inline]
    pub fn pop(&self) {
        let _ = self.queue.lock().pop_front();
    }

    /// Atomically read and remove the head.
    #[inline]
    pub fn front_pop(&self) -> Option<T> {
        self.queue.lock().pop_front()
    }

    /// Remove every element, returned in FIFO order.
    pub fn drain(&self) -> Vec<T> {
        let mut queue = self.queue.lock();
        queue.drain(..).collect()
    }

    /// Atomically take the tail and discard everything before it.
    pub fn back_clear(&self) -> Option<T> {
        let mut queue = self.queue.lock();
        let last = queue.pop_back();
        queue.clear();
        last
    }

    pub fn clear(&self) {
        self.queue.lock().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }
}

impl<T: Clone> SyncQueue<T> {
    /// Clone of the head, without removing it.
    pub fn front(&self) -> Option<T> {
        self.queue.lock().front().cloned()
    }

    /// Clone of the tail, without removing it.
    pub fn back(&self) -> Option<T> {
        self.queue.lock().back().cloned()
    }
}

impl<T> Default for SyncQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
