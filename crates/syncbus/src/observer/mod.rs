// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Observer trait, queued async observer, and topic subject.

mod async_observer;
mod subject;

pub use async_observer::AsyncObserver;
pub use subject::Subject;

/// Anything that can be informed of `(topic, event, origin)`.
///
/// `inform` runs on the publisher's thread. Implementations that need to do
/// real work elsewhere compose an [`AsyncObserver`] and forward to it.
///
/// # Thread Safety
/// Must be `Send + Sync`: a subject may publish from any thread.
///
/// # Examples
/// ```
/// use syncbus::Observer;
///
/// struct Logger;
///
/// impl Observer<u8, String> for Logger {
///     fn inform(&self, topic: &u8, event: &String, origin: &str) {
///         println!("topic {} event {} from {}", topic, event, origin);
///     }
/// }
/// ```
pub trait Observer<T, E>: Send + Sync {
    /// Called once per published event on a subscribed topic.
    ///
    /// # Arguments
    /// - `topic`: topic the event was published on
    /// - `event`: payload
    /// - `origin`: name of the publishing subject
    ///
    /// # Panics
    /// A panic here is not caught and propagates to the publisher.
    fn inform(&self, topic: &T, event: &E, origin: &str);
}

/// Immutable `(topic, event, origin)` triple queued by [`AsyncObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event<T, E> {
    pub topic: T,
    pub event: E,
    /// Name of the subject that published the event.
    pub origin: String,
}

impl<T, E> Event<T, E> {
    pub fn new(topic: T, event: E, origin: impl Into<String>) -> Self {
        Self {
            topic,
            event,
            origin: origin.into(),
        }
    }
}
