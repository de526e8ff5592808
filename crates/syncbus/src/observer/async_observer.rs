// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Observer that queues events for a consumer on another thread.
//!
//! `inform` never blocks on application logic: it pushes the triple into a
//! [`SyncQueue`] and signals a private [`Signal`]. The owner's consumer loop
//! waits on the signal and pulls events with the `pop_*` family.
//!
//! ```text
//! publisher thread               consumer thread
//!   inform() ──push──> queue       wait_for_events()
//!            ──signal─> signal ──>   pop_all_events()
//! ```

use super::{Event, Observer};
use crate::config::DEFAULT_EVENT_WAIT_TIMEOUT;
use crate::sync::{Signal, SyncQueue};
use std::time::Duration;

/// Queue + signal observer.
///
/// Application observers usually hold one of these and forward `inform`:
///
/// ```
/// use std::sync::Arc;
/// use syncbus::{AsyncObserver, Observer, Subject};
///
/// struct Display {
///     inbox: AsyncObserver<u8, String>,
/// }
///
/// impl Observer<u8, String> for Display {
///     fn inform(&self, topic: &u8, event: &String, origin: &str) {
///         self.inbox.inform(topic, event, origin);
///     }
/// }
///
/// let display = Arc::new(Display { inbox: AsyncObserver::new() });
/// let subject = Subject::<u8, String>::new("source");
/// subject.subscribe(1u8, &display);
/// subject.publish(&1, &"toto".to_string());
///
/// let event = display.inbox.pop_first_event().unwrap();
/// assert_eq!(event.event, "toto");
/// assert_eq!(event.origin, "source");
/// ```
#[derive(Debug)]
pub struct AsyncObserver<T, E> {
    events: SyncQueue<Event<T, E>>,
    signal: Signal,
}

impl<T, E> AsyncObserver<T, E> {
    pub fn new() -> Self {
        Self {
            events: SyncQueue::new(),
            signal: Signal::new(),
        }
    }

    /// Oldest queued event.
    pub fn pop_first_event(&self) -> Option<Event<T, E>> {
        self.events.front_pop()
    }

    /// Every queued event, oldest first.
    pub fn pop_all_events(&self) -> Vec<Event<T, E>> {
        self.events.drain()
    }

    /// Freshest event; everything older is discarded in the same lock.
    pub fn pop_last_event(&self) -> Option<Event<T, E>> {
        self.events.back_clear()
    }

    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn number_of_events(&self) -> usize {
        self.events.len()
    }

    /// Block until at least one `inform` arrived since the last wait.
    ///
    /// Waits in [`DEFAULT_EVENT_WAIT_TIMEOUT`] slices and returns early when
    /// events are already queued. Returns `false` once stopped.
    pub fn wait_for_events(&self) -> bool {
        loop {
            if self.signal.wait_timeout(DEFAULT_EVENT_WAIT_TIMEOUT) || self.has_events() {
                return true;
            }
            if self.signal.is_stopped() {
                return false;
            }
        }
    }

    /// Like [`wait_for_events`](Self::wait_for_events) with a bound.
    ///
    /// # Returns
    /// * `true` - signaled, or events already queued
    /// * `false` - timeout or stop with nothing queued
    pub fn wait_for_events_timeout(&self, timeout: Duration) -> bool {
        self.signal.wait_timeout(timeout) || self.has_events()
    }

    /// Release a consumer parked in `wait_for_events*`.
    pub fn request_stop(&self) {
        self.signal.request_stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.signal.is_stopped()
    }
}

impl<T, E> Default for AsyncObserver<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Observer<T, E> for AsyncObserver<T, E>
where
    T: Clone + Send + Sync,
    E: Clone + Send + Sync,
{
    fn inform(&self, topic: &T, event: &E, origin: &str) {
        self.events
            .push(Event::new(topic.clone(), event.clone(), origin));
        self.signal.signal();
    }
}
