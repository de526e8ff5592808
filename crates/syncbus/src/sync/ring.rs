// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed-capacity FIFO storage (not synchronized).
//!
//! Slots live inline in a `[Option<T>; N]` array indexed by `head` and `len`.
//! A push on a full ring is rejected and the item is handed back.

/// Bounded FIFO with const-generic capacity `N`.
///
/// Invariant: `len() <= N` at all times. `N == 0` fails to compile.
///
/// # Example
/// ```
/// use syncbus::RingBuffer;
///
/// let mut ring: RingBuffer<u32, 2> = RingBuffer::new();
/// assert!(ring.push(1).is_ok());
/// assert!(ring.push(2).is_ok());
/// assert_eq!(ring.push(3), Err(3));
/// assert_eq!(ring.front_pop(), Some(1));
/// ```
#[derive(Debug)]
pub struct RingBuffer<T, const N: usize> {
    slots: [Option<T>; N],
    head: usize,
    len: usize,
}

impl<T, const N: usize> RingBuffer<T, N> {
    const NON_ZERO: () = assert!(N > 0, "RingBuffer capacity must be greater than zero");

    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_ZERO;
        Self {
            slots: std::array::from_fn(|_| None),
            head: 0,
            len: 0,
        }
    }

    #[inline]
    fn slot(&self, offset: usize) -> usize {
        (self.head + offset) % N
    }

    /// Append at the tail.
    ///
    /// # Returns
    /// * `Ok(())` - stored
    /// * `Err(item)` - ring full, item handed back
    pub fn push(&mut self, item: T) -> Result<(), T> {
        if self.len == N {
            return Err(item);
        }
        let tail = self.slot(self.len);
        self.slots[tail] = Some(item);
        self.len += 1;
        Ok(())
    }

    /// Drop the head if present.
    pub fn pop(&mut self) {
        let _ = self.front_pop();
    }

    /// Remove and return the head.
    pub fn front_pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let item = self.slots[self.head].take();
        self.head = (self.head + 1) % N;
        self.len -= 1;
        item
    }

    /// Remove and return the tail.
    pub fn back_pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let tail = self.slot(self.len - 1);
        self.len -= 1;
        self.slots[tail].take()
    }

    pub fn front(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        self.slots[self.head].as_ref()
    }

    pub fn back(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        self.slots[self.slot(self.len - 1)].as_ref()
    }

    pub fn clear(&mut self) {
        while self.front_pop().is_some() {}
        self.head = 0;
    }

    /// Iterate from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len).filter_map(move |i| self.slots[self.slot(i)].as_ref())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<T, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
