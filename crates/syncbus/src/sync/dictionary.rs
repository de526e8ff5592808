// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Concurrent key/value store, last writer wins.

use dashmap::DashMap;
use std::hash::Hash;

/// Thread-safe dictionary backed by a sharded [`DashMap`].
///
/// Lookups clone the stored value so no shard guard escapes.
#[derive(Debug)]
pub struct SyncDictionary<K, V>
where
    K: Eq + Hash,
{
    map: DashMap<K, V>,
}

impl<K, V> SyncDictionary<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            map: DashMap::new(),
        }
    }

    /// Insert or replace.
    ///
    /// Returns the previous value, if any.
    pub fn add(&self, key: K, value: V) -> Option<V> {
        self.map.insert(key, value)
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.map.remove(key).map(|(_, v)| v)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&self) {
        self.map.clear();
    }
}

impl<K, V> SyncDictionary<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn find(&self, key: &K) -> Option<V> {
        self.map.get(key).map(|entry| entry.value().clone())
    }
}

impl<K, V> Default for SyncDictionary<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}
