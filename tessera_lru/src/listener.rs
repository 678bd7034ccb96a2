// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Removal notifications.

/// Receives every entry that leaves an [`EvictionCache`](crate::EvictionCache).
///
/// The listener is invoked synchronously for capacity evictions, for the old value
/// when [`insert`](crate::EvictionCache::insert) overwrites a key, for explicit
/// [`remove`](crate::EvictionCache::remove) calls, and once per entry on
/// [`clear`](crate::EvictionCache::clear).
///
/// Implementations receive ownership of the key and value. They cannot reach back
/// into the cache that is notifying them.
pub trait EvictionListener<K, V> {
    /// Called with an entry that has just been removed from the cache.
    fn on_remove(&mut self, key: K, value: V);
}

/// The no-op listener.
impl<K, V> EvictionListener<K, V> for () {
    #[inline]
    fn on_remove(&mut self, _key: K, _value: V) {}
}

impl<K, V, F> EvictionListener<K, V> for F
where
    F: FnMut(K, V),
{
    #[inline]
    fn on_remove(&mut self, key: K, value: V) {
        self(key, value);
    }
}
