// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Linear-scan backend over a dense, slot-sorted vector.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::Backend;
use crate::types::{Aabb2D, Scalar};

/// Linear-scan backend.
///
/// Live slots are kept densely, sorted by slot, so scans never step over holes left by
/// removals and results are reported in slot order. Appending a slot larger than every live
/// slot (the common case for a fresh [`Index`](crate::Index)) is amortized `O(1)`.
pub struct FlatVec<T: Scalar> {
    entries: Vec<(usize, Aabb2D<T>)>,
}

impl<T: Scalar> FlatVec<T> {
    /// Number of live slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no slot is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, slot: usize) -> Result<usize, usize> {
        match self.entries.last() {
            Some(&(last, _)) if last < slot => Err(self.entries.len()),
            None => Err(0),
            _ => self.entries.binary_search_by_key(&slot, |&(s, _)| s),
        }
    }

    fn scan(&self, mut hit: impl FnMut(&Aabb2D<T>) -> bool, mut f: impl FnMut(usize)) {
        self.entries
            .iter()
            .filter(|(_, aabb)| hit(aabb))
            .for_each(|&(slot, _)| f(slot));
    }
}

impl<T: Scalar> Default for FlatVec<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: Scalar> Debug for FlatVec<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FlatVec")
            .field("live", &self.entries.len())
            .field("max_slot", &self.entries.last().map(|&(s, _)| s))
            .finish_non_exhaustive()
    }
}

impl<T: Scalar> Backend<T> for FlatVec<T> {
    fn insert(&mut self, slot: usize, aabb: Aabb2D<T>) {
        match self.position(slot) {
            Ok(i) => self.entries[i].1 = aabb,
            Err(i) => self.entries.insert(i, (slot, aabb)),
        }
    }

    fn insert_bulk(&mut self, items: &[(usize, Aabb2D<T>)]) {
        self.entries.reserve(items.len());
        for &(slot, aabb) in items {
            self.insert(slot, aabb);
        }
    }

    fn remove(&mut self, slot: usize) {
        if let Ok(i) = self.position(slot) {
            self.entries.remove(i);
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn visit_point<F: FnMut(usize)>(&self, x: T, y: T, f: F) {
        self.scan(|a| a.contains_point(x, y), f);
    }

    fn visit_rect<F: FnMut(usize)>(&self, rect: Aabb2D<T>, f: F) {
        self.scan(|a| a.intersects(&rect), f);
    }
}
