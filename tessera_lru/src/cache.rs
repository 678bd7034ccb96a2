// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The cache itself: a slab of entries threaded onto a recency list.

use alloc::vec::Vec;
use core::fmt;
use core::hash::Hash;

use hashbrown::HashMap;

use crate::listener::EvictionListener;

/// One resident entry.
///
/// `prev` points toward the most recently used end of the list, `next` toward the
/// least recently used end.
struct Entry<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

/// A fixed-capacity map that evicts its least recently used entry on overflow.
///
/// Every entry that leaves the cache, for whatever reason, is passed by value to the
/// listener `L`. The default listener `()` drops entries silently.
///
/// Capacity is fixed at construction and is at least `1`.
///
/// # Example
///
/// ```
/// use tessera_lru::EvictionCache;
///
/// let mut cache = EvictionCache::new(2);
/// cache.insert(1, "one");
/// cache.insert(2, "two");
///
/// // `peek` does not refresh recency, so 1 is still the eviction candidate.
/// assert_eq!(cache.peek(&1), Some(&"one"));
/// cache.insert(3, "three");
///
/// assert!(!cache.contains(&1));
/// assert_eq!(cache.iter().map(|(k, _)| *k).collect::<Vec<_>>(), vec![2, 3]);
/// ```
pub struct EvictionCache<K, V, L = ()> {
    map: HashMap<K, usize>,
    slots: Vec<Option<Entry<K, V>>>,
    free: Vec<usize>,
    /// Most recently used slot.
    head: Option<usize>,
    /// Least recently used slot.
    tail: Option<usize>,
    capacity: usize,
    listener: L,
}

impl<K, V, L> fmt::Debug for EvictionCache<K, V, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvictionCache")
            .field("len", &self.map.len())
            .field("capacity", &self.capacity)
            .field("free_slots", &self.free.len())
            .finish_non_exhaustive()
    }
}

impl<K, V> EvictionCache<K, V, ()>
where
    K: Clone + Eq + Hash,
{
    /// Creates an empty cache that silently drops evicted entries.
    ///
    /// A `capacity` of `0` is raised to `1`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_listener(capacity, ())
    }
}

impl<K, V, L> EvictionCache<K, V, L>
where
    K: Clone + Eq + Hash,
    L: EvictionListener<K, V>,
{
    /// Creates an empty cache that reports removed entries to `listener`.
    ///
    /// A `capacity` of `0` is raised to `1`.
    #[must_use]
    pub fn with_listener(capacity: usize, listener: L) -> Self {
        Self {
            map: HashMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            capacity: capacity.max(1),
            listener,
        }
    }

    /// Maximum number of resident entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of resident entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no entries are resident.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Shared access to the listener.
    #[must_use]
    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// Exclusive access to the listener, for example to drain a buffer of removed entries.
    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    /// Inserts `value` under `key` and marks it most recently used.
    ///
    /// If `key` was already resident, the listener receives the old value and the entry
    /// keeps its slot. Otherwise the entry is added and, if that exceeds the capacity,
    /// the least recently used entry is evicted and passed to the listener.
    pub fn insert(&mut self, key: K, value: V) {
        if let Some(&slot) = self.map.get(&key) {
            let old = core::mem::replace(&mut self.entry_mut(slot).value, value);
            self.listener.on_remove(key, old);
            self.promote(slot);
            return;
        }

        let slot = self.alloc(Entry {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        });
        self.map.insert(key, slot);
        self.push_front(slot);

        if self.map.len() > self.capacity {
            self.evict_lru();
        }
    }

    /// Returns the value for `key` and marks it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let slot = *self.map.get(key)?;
        self.promote(slot);
        Some(&self.entry(slot).value)
    }

    /// Returns the value for `key` mutably and marks it most recently used.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let slot = *self.map.get(key)?;
        self.promote(slot);
        Some(&mut self.entry_mut(slot).value)
    }

    /// Returns the value for `key` without touching its recency.
    #[must_use]
    pub fn peek(&self, key: &K) -> Option<&V> {
        let slot = *self.map.get(key)?;
        Some(&self.entry(slot).value)
    }

    /// Returns `true` if `key` is resident. Does not touch recency.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Removes `key`, passing its entry to the listener.
    ///
    /// Returns `false` (and does nothing) if the key was not resident.
    pub fn remove(&mut self, key: &K) -> bool {
        let Some(slot) = self.map.remove(key) else {
            return false;
        };
        let entry = self.release(slot);
        self.listener.on_remove(entry.key, entry.value);
        true
    }

    /// Removes every entry, passing each one to the listener exactly once.
    pub fn clear(&mut self) {
        self.map.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        let slots = core::mem::take(&mut self.slots);
        for entry in slots.into_iter().flatten() {
            self.listener.on_remove(entry.key, entry.value);
        }
    }

    /// Iterates entries from least to most recently used without touching recency.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: &self.slots,
            cursor: self.tail,
            remaining: self.map.len(),
        }
    }

    /// Key of the entry that the next overflow would evict.
    #[must_use]
    pub fn lru_key(&self) -> Option<&K> {
        self.tail.map(|slot| &self.entry(slot).key)
    }

    fn evict_lru(&mut self) {
        let Some(slot) = self.tail else {
            return;
        };
        let entry = self.release(slot);
        self.map.remove(&entry.key);
        self.listener.on_remove(entry.key, entry.value);
    }

    fn promote(&mut self, slot: usize) {
        if self.head == Some(slot) {
            return;
        }
        self.unlink(slot);
        self.push_front(slot);
    }

    fn push_front(&mut self, slot: usize) {
        let old_head = self.head;
        {
            let entry = self.entry_mut(slot);
            entry.prev = None;
            entry.next = old_head;
        }
        match old_head {
            Some(h) => self.entry_mut(h).prev = Some(slot),
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = {
            let entry = self.entry_mut(slot);
            (entry.prev.take(), entry.next.take())
        };
        match prev {
            Some(p) => self.entry_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.entry_mut(n).prev = prev,
            None => self.tail = prev,
        }
    }

    /// Unlinks `slot` and returns its entry to the caller, recycling the slot.
    fn release(&mut self, slot: usize) -> Entry<K, V> {
        self.unlink(slot);
        self.free.push(slot);
        self.slots[slot].take().expect("released slot is occupied")
    }

    fn alloc(&mut self, entry: Entry<K, V>) -> usize {
        if let Some(slot) = self.free.pop() {
            self.slots[slot] = Some(entry);
            slot
        } else {
            self.slots.push(Some(entry));
            self.slots.len() - 1
        }
    }

    fn entry(&self, slot: usize) -> &Entry<K, V> {
        self.slots[slot].as_ref().expect("linked slot is occupied")
    }

    fn entry_mut(&mut self, slot: usize) -> &mut Entry<K, V> {
        self.slots[slot].as_mut().expect("linked slot is occupied")
    }
}

/// Iterator over cache entries from least to most recently used.
///
/// Created by [`EvictionCache::iter`].
pub struct Iter<'a, K, V> {
    slots: &'a [Option<Entry<K, V>>],
    cursor: Option<usize>,
    remaining: usize,
}

impl<K, V> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor?;
        let entry = self.slots[slot].as_ref()?;
        self.cursor = entry.prev;
        self.remaining = self.remaining.saturating_sub(1);
        Some((&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;
    use alloc::vec::Vec;
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn recording(
        capacity: usize,
    ) -> (
        EvictionCache<u32, u32, impl FnMut(u32, u32)>,
        Rc<RefCell<Vec<(u32, u32)>>>,
    ) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let cache = EvictionCache::with_listener(capacity, move |k, v| {
            sink.borrow_mut().push((k, v));
        });
        (cache, log)
    }

    fn keys(cache: &EvictionCache<u32, u32, impl EvictionListener<u32, u32>>) -> Vec<u32> {
        cache.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut cache = EvictionCache::<u32, u32>::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.insert(1, 1);
        cache.insert(2, 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&2));
    }

    #[test]
    fn overflow_evicts_exactly_one_least_recent_entry() {
        let (mut cache, log) = recording(3);
        for k in 0..4 {
            cache.insert(k, k * 10);
        }
        assert_eq!(cache.len(), 3);
        assert_eq!(*log.borrow(), vec![(0, 0)]);
        assert_eq!(keys(&cache), vec![1, 2, 3]);
    }

    #[test]
    fn get_promotes_but_peek_contains_and_iter_do_not() {
        let (mut cache, log) = recording(3);
        cache.insert(1, 1);
        cache.insert(2, 2);
        cache.insert(3, 3);

        // None of these should protect 1 from eviction.
        assert_eq!(cache.peek(&1), Some(&1));
        assert!(cache.contains(&1));
        assert_eq!(cache.iter().count(), 3);
        cache.insert(4, 4);
        assert_eq!(*log.borrow(), vec![(1, 1)]);

        // `get` does protect 2.
        assert_eq!(cache.get(&2), Some(&2));
        cache.insert(5, 5);
        assert_eq!(*log.borrow(), vec![(1, 1), (3, 3)]);
        assert_eq!(keys(&cache), vec![4, 2, 5]);
    }

    #[test]
    fn promoted_key_outlives_untouched_peer_by_one_cycle() {
        let (mut cache, log) = recording(2);
        cache.insert(1, 1);
        cache.insert(2, 2);
        let len_before = cache.len();
        assert!(cache.get(&1).is_some());
        assert_eq!(cache.len(), len_before);

        cache.insert(3, 3);
        assert!(cache.contains(&1));
        assert!(!cache.contains(&2));

        cache.insert(4, 4);
        assert!(!cache.contains(&1));
        assert_eq!(*log.borrow(), vec![(2, 2), (1, 1)]);
    }

    #[test]
    fn overwrite_reports_old_value_and_promotes() {
        let (mut cache, log) = recording(2);
        cache.insert(1, 10);
        cache.insert(2, 20);
        cache.insert(1, 11);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.peek(&1), Some(&11));
        assert_eq!(*log.borrow(), vec![(1, 10)]);

        cache.insert(3, 30);
        assert!(cache.contains(&1));
        assert!(!cache.contains(&2));
    }

    #[test]
    fn remove_reports_and_ignores_missing_keys() {
        let (mut cache, log) = recording(4);
        cache.insert(1, 1);
        cache.insert(2, 2);

        assert!(cache.remove(&1));
        assert!(!cache.remove(&1));
        assert_eq!(*log.borrow(), vec![(1, 1)]);
        assert_eq!(keys(&cache), vec![2]);
    }

    #[test]
    fn clear_reports_every_entry_once() {
        let (mut cache, log) = recording(4);
        for k in 0..4 {
            cache.insert(k, k);
        }
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.iter().count(), 0);
        let mut seen = log.borrow().clone();
        seen.sort_unstable();
        assert_eq!(seen, vec![(0, 0), (1, 1), (2, 2), (3, 3)]);

        // The cache is fully usable afterwards.
        cache.insert(9, 9);
        assert_eq!(keys(&cache), vec![9]);
    }

    #[test]
    fn slots_are_recycled_after_removal() {
        let mut cache = EvictionCache::<u32, u32>::new(2);
        for k in 0..100 {
            cache.insert(k, k);
        }
        assert_eq!(cache.len(), 2);
        assert!(cache.slots.len() <= 3);
        assert_eq!(cache.lru_key(), Some(&98));
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut cache = EvictionCache::<u32, u32>::new(2);
        cache.insert(1, 1);
        cache.insert(2, 2);
        if let Some(v) = cache.get_mut(&1) {
            *v = 100;
        }
        assert_eq!(cache.peek(&1), Some(&100));
        assert_eq!(keys(&cache), vec![2, 1]);
    }
}
