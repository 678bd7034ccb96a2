// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generational index mapping keys to payloads and boxes over a pluggable backend.

use alloc::vec::Vec;
use core::fmt;

use crate::backend::Backend;
use crate::backends::rtree::RTree;
use crate::types::{Aabb2D, Scalar};

/// Handle to an entry in an [`Index`].
///
/// Keys stay valid until the entry is removed. A removed slot is reused with a bumped
/// generation, so stale keys never alias a newer entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Key {
    idx: u32,
    generation: u32,
}

impl Key {
    /// Dense slot index of this key.
    #[inline]
    #[must_use]
    pub const fn slot(self) -> usize {
        self.idx as usize
    }
}

struct Slot<T, P> {
    generation: u32,
    entry: Option<(Aabb2D<T>, P)>,
}

/// A 2D AABB index over payloads `P`, using backend `B` for the spatial queries.
///
/// Query results are yielded in the backend's order.
///
/// # Example
///
/// ```
/// use tessera_index::{Aabb2D, Index};
///
/// let mut index: Index<f64, &str> = Index::new();
/// let a = index.insert(Aabb2D::from_xywh(0.0, 0.0, 10.0, 10.0), "a");
/// let _b = index.insert(Aabb2D::from_xywh(20.0, 20.0, 10.0, 10.0), "b");
///
/// let hits: Vec<_> = index.query_point(5.0, 5.0).map(|(_, p)| *p).collect();
/// assert_eq!(hits, ["a"]);
///
/// assert_eq!(index.remove(a), Some("a"));
/// assert_eq!(index.query_point(5.0, 5.0).count(), 0);
/// ```
pub struct Index<T: Scalar, P, B = RTree<T>> {
    slots: Vec<Slot<T, P>>,
    free: Vec<u32>,
    backend: B,
    len: usize,
}

impl<T: Scalar, P, B: fmt::Debug> fmt::Debug for Index<T, P, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Index")
            .field("len", &self.len)
            .field("free_slots", &self.free.len())
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

impl<T: Scalar, P, B: Backend<T> + Default> Default for Index<T, P, B> {
    fn default() -> Self {
        Self::with_backend(B::default())
    }
}

impl<T: Scalar, P, B: Backend<T> + Default> Index<T, P, B> {
    /// Creates an empty index with a default-constructed backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Scalar, P, B: Backend<T>> Index<T, P, B> {
    /// Creates an empty index over the given backend.
    pub fn with_backend(backend: B) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            backend,
            len: 0,
        }
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the index holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The spatial backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Inserts a single entry.
    ///
    /// # Panics
    ///
    /// If every `u32` slot is live.
    #[track_caller]
    pub fn insert(&mut self, aabb: Aabb2D<T>, payload: P) -> Key {
        let key = self.alloc(aabb, payload);
        self.backend.insert(key.slot(), aabb);
        key
    }

    /// Inserts many entries, letting the backend bulk-load them.
    ///
    /// Keys are returned in input order.
    ///
    /// # Panics
    ///
    /// If every `u32` slot is live.
    #[track_caller]
    pub fn extend<I>(&mut self, items: I) -> Vec<Key>
    where
        I: IntoIterator<Item = (Aabb2D<T>, P)>,
    {
        let mut keys = Vec::new();
        let mut boxes = Vec::new();
        for (aabb, payload) in items {
            let key = self.alloc(aabb, payload);
            boxes.push((key.slot(), aabb));
            keys.push(key);
        }
        self.backend.insert_bulk(&boxes);
        keys
    }

    /// Removes an entry, returning its payload. Stale keys return `None`.
    pub fn remove(&mut self, key: Key) -> Option<P> {
        let slot = self.slots.get_mut(key.slot())?;
        if slot.generation != key.generation {
            return None;
        }
        let (_, payload) = slot.entry.take()?;
        self.backend.remove(key.slot());
        self.free.push(key.idx);
        self.len -= 1;
        Some(payload)
    }

    /// Payload of a live entry.
    #[must_use]
    pub fn get(&self, key: Key) -> Option<&P> {
        self.live(key).map(|(_, p)| p)
    }

    /// Box of a live entry.
    #[must_use]
    pub fn bounds(&self, key: Key) -> Option<Aabb2D<T>> {
        self.live(key).map(|(b, _)| *b)
    }

    /// Returns `true` if `key` refers to a live entry.
    #[must_use]
    pub fn contains(&self, key: Key) -> bool {
        self.live(key).is_some()
    }

    /// Removes every entry. All outstanding keys become stale.
    pub fn clear(&mut self) {
        // Slot count never exceeds the u32 key space; see `alloc`.
        for (idx, slot) in (0_u32..).zip(self.slots.iter_mut()) {
            if slot.entry.take().is_some() {
                self.free.push(idx);
            }
        }
        self.backend.clear();
        self.len = 0;
    }

    /// Entries whose box contains the point.
    pub fn query_point(&self, x: T, y: T) -> impl Iterator<Item = (Key, &P)> + '_ {
        let mut hits = Vec::new();
        self.backend.visit_point(x, y, |slot| hits.push(slot));
        hits.into_iter().filter_map(|slot| self.resolve(slot))
    }

    /// Entries whose box intersects the rectangle.
    pub fn query_rect(&self, rect: Aabb2D<T>) -> impl Iterator<Item = (Key, &P)> + '_ {
        let mut hits = Vec::new();
        self.backend.visit_rect(rect, |slot| hits.push(slot));
        hits.into_iter().filter_map(|slot| self.resolve(slot))
    }

    #[track_caller]
    fn alloc(&mut self, aabb: Aabb2D<T>, payload: P) -> Key {
        let key = if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.entry = Some((aabb, payload));
            Key {
                idx,
                generation: slot.generation,
            }
        } else {
            let Ok(idx) = u32::try_from(self.slots.len()) else {
                panic!("index holds {} slots, the most a Key can address", self.slots.len());
            };
            self.slots.push(Slot {
                generation: 1,
                entry: Some((aabb, payload)),
            });
            Key { idx, generation: 1 }
        };
        self.len += 1;
        key
    }

    fn live(&self, key: Key) -> Option<&(Aabb2D<T>, P)> {
        let slot = self.slots.get(key.slot())?;
        if slot.generation != key.generation {
            return None;
        }
        slot.entry.as_ref()
    }

    fn resolve(&self, idx: usize) -> Option<(Key, &P)> {
        let slot = self.slots.get(idx)?;
        let (_, payload) = slot.entry.as_ref()?;
        let key = Key {
            idx: u32::try_from(idx).ok()?,
            generation: slot.generation,
        };
        Some((key, payload))
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::backends::flatvec::FlatVec;

    #[test]
    fn stale_keys_do_not_alias_reused_slots() {
        let mut index: Index<i64, u32> = Index::new();
        let a = index.insert(Aabb2D::new(0, 0, 1, 1), 1);
        assert_eq!(index.remove(a), Some(1));
        let b = index.insert(Aabb2D::new(0, 0, 1, 1), 2);

        assert_eq!(a.slot(), b.slot());
        assert_ne!(a, b);
        assert_eq!(index.get(a), None);
        assert_eq!(index.remove(a), None);
        assert_eq!(index.get(b), Some(&2));
    }

    #[test]
    fn extend_returns_keys_in_input_order() {
        let mut index: Index<f64, usize> = Index::new();
        let keys = index.extend((0..50).map(|i| {
            let x = i as f64 * 10.0;
            (Aabb2D::from_xywh(x, 0.0, 5.0, 5.0), i)
        }));
        assert_eq!(keys.len(), 50);
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(index.get(*key), Some(&i));
        }
        let hits: Vec<_> = index.query_point(122.0, 2.0).map(|(_, p)| *p).collect();
        assert_eq!(hits, [12]);
    }

    #[test]
    fn cleared_slots_are_reused_before_growing() {
        let mut index: Index<i64, u8, FlatVec<i64>> = Index::new();
        let old = index.extend((0..3).map(|i| (Aabb2D::new(i, 0, i + 1, 1), 0)));
        index.clear();
        let new = index.extend((0..3).map(|i| (Aabb2D::new(i, 5, i + 1, 6), 1)));

        let mut slots: Vec<_> = new.iter().map(|k| k.slot()).collect();
        slots.sort_unstable();
        assert_eq!(slots, [0, 1, 2]);
        assert!(old.iter().all(|k| !index.contains(*k)));
        assert_eq!(index.len(), 3);
        assert_eq!(index.query_rect(Aabb2D::new(0, 5, 3, 6)).count(), 3);
        assert_eq!(index.query_rect(Aabb2D::new(0, 0, 3, 1)).count(), 0);
    }

    #[test]
    fn clear_invalidates_everything() {
        let mut index: Index<f64, u8, FlatVec<f64>> = Index::new();
        let k = index.insert(Aabb2D::from_xywh(0.0, 0.0, 1.0, 1.0), 7);
        index.clear();
        assert!(index.is_empty());
        assert!(!index.contains(k));
        assert_eq!(index.query_rect(Aabb2D::new(-1.0, -1.0, 2.0, 2.0)).count(), 0);

        let k2 = index.insert(Aabb2D::from_xywh(0.0, 0.0, 1.0, 1.0), 8);
        assert_ne!(k, k2);
        assert_eq!(index.bounds(k2), Some(Aabb2D::new(0.0, 0.0, 1.0, 1.0)));
    }
}
