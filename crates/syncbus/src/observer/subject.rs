// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Topic-keyed subscriber registry with synchronous publish.
//!
//! # Architecture
//!
//! ```text
//! Subject
//!   └── RwLock<HashMap<T, Vec<SubscriberEntry>>>
//!         ├── Observer(Weak<dyn Observer>)   (identity-deduplicated)
//!         └── Handler { name, callback }     (name-deduplicated)
//! ```
//!
//! `publish` snapshots a topic's live subscribers under the read lock, drops
//! the lock, then calls each one on the publisher's thread in subscription
//! order. Subscribers may therefore publish, subscribe or unsubscribe from
//! inside `inform` without deadlocking. Expired observers are skipped and
//! pruned afterwards under the write lock.

use super::Observer;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Weak};

type Handler<T, E> = Arc<dyn Fn(&T, &E, &str) + Send + Sync>;

// ============================================================================
// Subscriber Entries
// ============================================================================

enum SubscriberEntry<T, E> {
    Observer(Weak<dyn Observer<T, E>>),
    Handler { name: Arc<str>, callback: Handler<T, E> },
}

impl<T, E> SubscriberEntry<T, E> {
    #[inline]
    fn is_observer(&self, ptr: *const ()) -> bool {
        matches!(self, SubscriberEntry::Observer(weak) if weak.as_ptr() as *const () == ptr)
    }

    #[inline]
    fn is_handler(&self, handler_name: &str) -> bool {
        matches!(self, SubscriberEntry::Handler { name, .. } if &**name == handler_name)
    }

    #[inline]
    fn is_live(&self) -> bool {
        match self {
            SubscriberEntry::Observer(weak) => weak.strong_count() > 0,
            SubscriberEntry::Handler { .. } => true,
        }
    }
}

/// Strong reference taken for the duration of one publish.
enum Delivery<T, E> {
    Observer(Arc<dyn Observer<T, E>>),
    Handler(Handler<T, E>),
}

impl<T, E> Delivery<T, E> {
    #[inline]
    fn deliver(&self, topic: &T, event: &E, origin: &str) {
        match self {
            Delivery::Observer(observer) => observer.inform(topic, event, origin),
            Delivery::Handler(callback) => callback(topic, event, origin),
        }
    }
}

#[inline]
fn observer_ptr<O: ?Sized>(observer: &Arc<O>) -> *const () {
    Arc::as_ptr(observer) as *const ()
}

// ============================================================================
// Subject
// ============================================================================

/// Named publisher owning a topic -> subscribers table.
///
/// Observers are held weakly: dropping the last `Arc` unsubscribes them
/// implicitly. Named handlers are held strongly until removed.
///
/// # Example
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use syncbus::Subject;
///
/// let hits = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&hits);
///
/// let subject = Subject::<&'static str, u32>::new("sampler");
/// subject.subscribe_handler("external", "loose_coupled_handler_1", move |_, v, _| {
///     counter.fetch_add(*v as usize, Ordering::Relaxed);
/// });
/// subject.publish(&"external", &3);
/// subject.publish(&"generic", &100);
/// assert_eq!(hits.load(Ordering::Relaxed), 3);
/// ```
pub struct Subject<T, E> {
    name: String,
    topics: RwLock<HashMap<T, Vec<SubscriberEntry<T, E>>>>,
}

impl<T, E> Subject<T, E>
where
    T: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    E: 'static,
{
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            topics: RwLock::new(HashMap::new()),
        }
    }

    /// Subject name, passed as `origin` to every subscriber.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Subscribe `observer` to `topic`, held weakly.
    ///
    /// Returns `false` if this observer (same allocation) is already
    /// subscribed to the topic; the table is left unchanged.
    pub fn subscribe<O>(&self, topic: T, observer: &Arc<O>) -> bool
    where
        O: Observer<T, E> + 'static,
    {
        let ptr = observer_ptr(observer);
        let mut topics = self.topics.write();
        let entries = topics.entry(topic.clone()).or_default();
        if entries.iter().any(|e| e.is_observer(ptr)) {
            log::debug!(
                "[subject] '{}' duplicate observer on {:?} ignored",
                self.name,
                topic
            );
            return false;
        }

        let strong: Arc<dyn Observer<T, E>> = Arc::clone(observer) as Arc<dyn Observer<T, E>>;
        entries.push(SubscriberEntry::Observer(Arc::downgrade(&strong)));
        log::debug!(
            "[subject] '{}' observer subscribed to {:?} ({} total)",
            self.name,
            topic,
            entries.len()
        );
        true
    }

    /// Subscribe a named closure to `topic`.
    ///
    /// Returns `false` if a handler with the same name is already registered
    /// on the topic.
    pub fn subscribe_handler<F>(&self, topic: T, name: &str, callback: F) -> bool
    where
        F: Fn(&T, &E, &str) + Send + Sync + 'static,
    {
        let mut topics = self.topics.write();
        let entries = topics.entry(topic.clone()).or_default();
        if entries.iter().any(|e| e.is_handler(name)) {
            log::debug!(
                "[subject] '{}' duplicate handler '{}' on {:?} ignored",
                self.name,
                name,
                topic
            );
            return false;
        }

        entries.push(SubscriberEntry::Handler {
            name: Arc::from(name),
            callback: Arc::new(callback),
        });
        log::debug!(
            "[subject] '{}' handler '{}' subscribed to {:?}",
            self.name,
            name,
            topic
        );
        true
    }

    /// Remove `observer` from `topic`. Returns `true` if it was subscribed.
    pub fn unsubscribe<O>(&self, topic: &T, observer: &Arc<O>) -> bool
    where
        O: Observer<T, E> + 'static,
    {
        let ptr = observer_ptr(observer);
        let removed = self.remove_where(topic, |e| e.is_observer(ptr));
        if removed {
            log::debug!(
                "[subject] '{}' observer unsubscribed from {:?}",
                self.name,
                topic
            );
        }
        removed
    }

    /// Remove the handler called `name` from `topic`.
    pub fn unsubscribe_handler(&self, topic: &T, name: &str) -> bool {
        let removed = self.remove_where(topic, |e| e.is_handler(name));
        if removed {
            log::debug!(
                "[subject] '{}' handler '{}' unsubscribed from {:?}",
                self.name,
                name,
                topic
            );
        }
        removed
    }

    fn remove_where<P>(&self, topic: &T, predicate: P) -> bool
    where
        P: Fn(&SubscriberEntry<T, E>) -> bool,
    {
        let mut topics = self.topics.write();
        let Some(entries) = topics.get_mut(topic) else {
            return false;
        };
        let Some(index) = entries.iter().position(predicate) else {
            return false;
        };
        entries.remove(index);
        if entries.is_empty() {
            topics.remove(topic);
        }
        true
    }

    /// Deliver `event` to every live subscriber of `topic`, in subscription
    /// order, on the calling thread.
    ///
    /// A topic without subscribers is a no-op. No lock is held while
    /// subscribers run.
    ///
    /// # Panics
    /// Propagates any panic raised by a subscriber; later subscribers of the
    /// same publish are then not called.
    pub fn publish(&self, topic: &T, event: &E) {
        let (deliveries, expired) = {
            let topics = self.topics.read();
            let Some(entries) = topics.get(topic) else {
                return;
            };

            let mut expired = 0usize;
            let mut deliveries = Vec::with_capacity(entries.len());
            for entry in entries {
                match entry {
                    SubscriberEntry::Observer(weak) => match weak.upgrade() {
                        Some(observer) => deliveries.push(Delivery::Observer(observer)),
                        None => expired += 1,
                    },
                    SubscriberEntry::Handler { callback, .. } => {
                        deliveries.push(Delivery::Handler(Arc::clone(callback)));
                    }
                }
            }
            (deliveries, expired)
        };

        log::trace!(
            "[subject] '{}' publish on {:?} to {} subscriber(s)",
            self.name,
            topic,
            deliveries.len()
        );

        for delivery in &deliveries {
            delivery.deliver(topic, event, &self.name);
        }

        if expired > 0 {
            self.prune(topic);
        }
    }

    /// Drop expired observers of `topic`, removing the topic once empty.
    fn prune(&self, topic: &T) {
        let mut topics = self.topics.write();
        let Some(entries) = topics.get_mut(topic) else {
            return;
        };
        let before = entries.len();
        entries.retain(SubscriberEntry::is_live);
        let pruned = before - entries.len();
        if entries.is_empty() {
            topics.remove(topic);
        }
        if pruned > 0 {
            log::debug!(
                "[subject] '{}' pruned {} expired observer(s) from {:?}",
                self.name,
                pruned,
                topic
            );
        }
    }

    /// Live observers plus handlers on `topic`.
    pub fn subscriber_count(&self, topic: &T) -> usize {
        self.topics
            .read()
            .get(topic)
            .map_or(0, |entries| entries.iter().filter(|e| e.is_live()).count())
    }

    pub fn has_subscribers(&self, topic: &T) -> bool {
        self.subscriber_count(topic) > 0
    }

    /// Number of topics with at least one registered entry.
    pub fn topic_count(&self) -> usize {
        self.topics.read().len()
    }
}

impl<T, E> fmt::Debug for Subject<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("name", &self.name)
            .field("topics", &self.topics.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::AsyncObserver;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Topic {
        Generic,
        System,
        External,
    }

    /// Records `(observer_name, event)` into a shared log.
    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<(&'static str, String)>>>,
    }

    impl Observer<Topic, String> for Recorder {
        fn inform(&self, _topic: &Topic, event: &String, _origin: &str) {
            self.log.lock().push((self.name, event.clone()));
        }
    }

    fn recorder(
        name: &'static str,
        log: &Arc<Mutex<Vec<(&'static str, String)>>>,
    ) -> Arc<Recorder> {
        Arc::new(Recorder {
            name,
            log: Arc::clone(log),
        })
    }

    #[test]
    fn test_unsubscribed_observer_stops_receiving() {
        let subject = Subject::new("source1");
        let log = Arc::new(Mutex::new(Vec::new()));
        let o1 = recorder("O1", &log);
        let o2 = recorder("O2", &log);

        assert!(subject.subscribe(Topic::Generic, &o1));
        assert!(subject.subscribe(Topic::Generic, &o2));

        subject.publish(&Topic::Generic, &"toto".to_string());
        assert!(subject.unsubscribe(&Topic::Generic, &o1));
        subject.publish(&Topic::Generic, &"titi".to_string());

        assert_eq!(
            *log.lock(),
            vec![
                ("O1", "toto".to_string()),
                ("O2", "toto".to_string()),
                ("O2", "titi".to_string()),
            ]
        );
    }

    #[test]
    fn test_delivery_follows_subscription_order() {
        let subject = Subject::new("ordered");
        let log = Arc::new(Mutex::new(Vec::new()));
        let observers: Vec<_> = ["a", "b", "c", "d"]
            .iter()
            .map(|n| recorder(*n, &log))
            .collect();
        for o in observers.iter().rev() {
            subject.subscribe(Topic::System, o);
        }

        subject.publish(&Topic::System, &"e".to_string());
        let order: Vec<_> = log.lock().iter().map(|(n, _)| *n).collect();
        assert_eq!(order, vec!["d", "c", "b", "a"]);
    }

    #[test]
    fn test_topics_are_isolated() {
        let subject = Subject::new("iso");
        let log = Arc::new(Mutex::new(Vec::new()));
        let o = recorder("O", &log);
        subject.subscribe(Topic::System, &o);

        subject.publish(&Topic::Generic, &"nope".to_string());
        subject.publish(&Topic::External, &"nope".to_string());
        assert!(log.lock().is_empty());

        subject.publish(&Topic::System, &"yes".to_string());
        assert_eq!(log.lock().len(), 1);
    }

    #[test]
    fn test_duplicate_subscription_rejected() {
        let subject = Subject::new("dup");
        let log = Arc::new(Mutex::new(Vec::new()));
        let o = recorder("O", &log);

        assert!(subject.subscribe(Topic::Generic, &o));
        assert!(!subject.subscribe(Topic::Generic, &o));
        // Same observer on another topic is a different subscription
        assert!(subject.subscribe(Topic::System, &o));
        assert_eq!(subject.subscriber_count(&Topic::Generic), 1);

        subject.publish(&Topic::Generic, &"once".to_string());
        assert_eq!(log.lock().len(), 1);

        assert!(subject.subscribe_handler(Topic::Generic, "h", |_, _, _| {}));
        assert!(!subject.subscribe_handler(Topic::Generic, "h", |_, _, _| {}));
        assert_eq!(subject.subscriber_count(&Topic::Generic), 2);
    }

    #[test]
    fn test_unsubscribe_unknown_returns_false() {
        let subject: Subject<Topic, String> = Subject::new("none");
        let log = Arc::new(Mutex::new(Vec::new()));
        let o = recorder("O", &log);

        assert!(!subject.unsubscribe(&Topic::Generic, &o));
        assert!(!subject.unsubscribe_handler(&Topic::Generic, "missing"));

        subject.subscribe(Topic::Generic, &o);
        assert!(subject.unsubscribe(&Topic::Generic, &o));
        assert!(!subject.unsubscribe(&Topic::Generic, &o));
        assert_eq!(subject.topic_count(), 0);
    }

    #[test]
    fn test_expired_observer_skipped_and_pruned() {
        let subject = Subject::new("weak");
        let log = Arc::new(Mutex::new(Vec::new()));
        let keep = recorder("keep", &log);
        let gone = recorder("gone", &log);

        subject.subscribe(Topic::Generic, &gone);
        subject.subscribe(Topic::Generic, &keep);
        drop(gone);

        assert_eq!(subject.subscriber_count(&Topic::Generic), 1);
        subject.publish(&Topic::Generic, &"x".to_string());
        assert_eq!(*log.lock(), vec![("keep", "x".to_string())]);

        // Pruned: only one entry left in the table
        let topics = subject.topics.read();
        assert_eq!(topics.get(&Topic::Generic).map(Vec::len), Some(1));
    }

    #[test]
    fn test_all_expired_removes_topic() {
        let subject = Subject::new("weak");
        let log = Arc::new(Mutex::new(Vec::new()));
        let gone = recorder("gone", &log);
        subject.subscribe(Topic::External, &gone);
        drop(gone);

        assert!(!subject.has_subscribers(&Topic::External));
        subject.publish(&Topic::External, &"x".to_string());
        assert_eq!(subject.topic_count(), 0);
    }

    #[test]
    fn test_handler_receives_origin() {
        let subject = Subject::<Topic, u32>::new("sampler");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        subject.subscribe_handler(Topic::External, "loose_coupled_handler_1", move |t, v, o| {
            s.lock().push((*t, *v, o.to_string()));
        });

        subject.publish(&Topic::External, &7);
        assert_eq!(
            *seen.lock(),
            vec![(Topic::External, 7, "sampler".to_string())]
        );

        assert!(subject.unsubscribe_handler(&Topic::External, "loose_coupled_handler_1"));
        subject.publish(&Topic::External, &8);
        assert_eq!(seen.lock().len(), 1);
    }

    /// Re-publishes on `System` when informed on `Generic`.
    struct Relay {
        subject: Arc<Subject<Topic, String>>,
        hops: AtomicUsize,
    }

    impl Observer<Topic, String> for Relay {
        fn inform(&self, topic: &Topic, event: &String, _origin: &str) {
            self.hops.fetch_add(1, Ordering::SeqCst);
            if *topic == Topic::Generic {
                self.subject.publish(&Topic::System, event);
            }
        }
    }

    #[test]
    fn test_reentrant_publish_does_not_deadlock() {
        let subject = Arc::new(Subject::new("relay"));
        let relay = Arc::new(Relay {
            subject: Arc::clone(&subject),
            hops: AtomicUsize::new(0),
        });
        subject.subscribe(Topic::Generic, &relay);
        subject.subscribe(Topic::System, &relay);

        subject.publish(&Topic::Generic, &"ping".to_string());
        assert_eq!(relay.hops.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_subscribe_from_inside_inform() {
        let subject = Arc::new(Subject::<Topic, u32>::new("self-wiring"));
        let calls = Arc::new(AtomicUsize::new(0));

        let (sub, c) = (Arc::clone(&subject), Arc::clone(&calls));
        subject.subscribe_handler(Topic::Generic, "installer", move |_, _, _| {
            let c2 = Arc::clone(&c);
            sub.subscribe_handler(Topic::System, "late", move |_, _, _| {
                c2.fetch_add(1, Ordering::SeqCst);
            });
        });

        subject.publish(&Topic::Generic, &1);
        subject.publish(&Topic::System, &2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_async_observer_through_subject() {
        let subject = Subject::new("async");
        let inbox: Arc<AsyncObserver<Topic, String>> = Arc::new(AsyncObserver::new());
        subject.subscribe(Topic::Generic, &inbox);

        subject.publish(&Topic::Generic, &"a".to_string());
        subject.publish(&Topic::Generic, &"b".to_string());

        let events = inbox.pop_all_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].origin, "async");
        assert_eq!(events[1].event, "b");
    }
}
