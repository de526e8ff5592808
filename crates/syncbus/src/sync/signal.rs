// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sticky single-slot wake signal.
//!
//! One thread calls [`Signal::signal`], a blocked waiter wakes. A burst of
//! signals before any wait collapses into one wakeup: the flag is a slot, not
//! a counter.
//!
//! # Architecture
//! - `Mutex<SignalState>` holds the `signaled` and `stop` flags
//! - `Condvar` parks waiters
//! - Stop wakes every waiter and makes all later waits return immediately

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct SignalState {
    signaled: bool,
    stop: bool,
}

/// Binary wake object with optional timeout.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use syncbus::Signal;
///
/// let signal = Arc::new(Signal::new());
/// let producer = Arc::clone(&signal);
///
/// let handle = std::thread::spawn(move || producer.signal());
/// assert!(signal.wait_timeout(Duration::from_secs(1)));
/// handle.join().unwrap();
/// ```
#[derive(Debug)]
pub struct Signal {
    state: Mutex<SignalState>,
    condvar: Condvar,
}

impl Signal {
    #[inline]
    pub fn new() -> Self {
        Self::with_state(false)
    }

    /// Create a signal that starts in the given state.
    pub fn with_state(signaled: bool) -> Self {
        Self {
            state: Mutex::new(SignalState {
                signaled,
                stop: false,
            }),
            condvar: Condvar::new(),
        }
    }

    /// Set the flag and wake one blocked waiter.
    ///
    /// With no waiter parked the flag stays set for the next `wait`.
    #[inline]
    pub fn signal(&self) {
        let mut state = self.state.lock();
        state.signaled = true;
        self.condvar.notify_one();
    }

    /// Block until signaled or stopped.
    ///
    /// Clears the flag when consumed. Returns `true` when woken by a signal,
    /// `false` when the signal was stopped.
    pub fn wait(&self) -> bool {
        let mut state = self.state.lock();
        while !state.signaled && !state.stop {
            self.condvar.wait(&mut state);
        }
        Self::consume(&mut state)
    }

    /// Block until signaled, stopped, or `timeout` elapsed.
    ///
    /// # Returns
    /// * `true` if a signal was consumed
    /// * `false` on timeout or stop
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.state.lock();
        while !state.signaled && !state.stop {
            match deadline {
                Some(deadline) => {
                    if self.condvar.wait_until(&mut state, deadline).timed_out() {
                        break;
                    }
                }
                // Timeout too large to represent: behave like an untimed wait
                None => self.condvar.wait(&mut state),
            }
        }
        Self::consume(&mut state)
    }

    /// Wake all waiters and make every subsequent wait return immediately.
    pub fn request_stop(&self) {
        let mut state = self.state.lock();
        state.stop = true;
        self.condvar.notify_all();
    }

    /// Snapshot of the flag (lock-protected, immediately stale).
    pub fn is_signaled(&self) -> bool {
        self.state.lock().signaled
    }

    pub fn is_stopped(&self) -> bool {
        self.state.lock().stop
    }

    #[inline]
    fn consume(state: &mut SignalState) -> bool {
        if state.stop {
            return false;
        }
        std::mem::replace(&mut state.signaled, false)
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Signal {
    fn drop(&mut self) {
        self.request_stop();
    }
}
