// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! R-tree backend.
//!
//! Nodes hold between [`MIN_ENTRIES`] and [`MAX_ENTRIES`] children (the root and
//! bulk-packed tail nodes may hold fewer). All leaves sit at the same depth.
//!
//! - Bulk loads use a sort-tile-recursive (STR) pass: entries are sorted by center x,
//!   cut into vertical slices, each slice sorted by center y and packed into leaves,
//!   then the same pass repeats on the nodes until a single root remains.
//! - Single insertions descend by least area enlargement and split overflowing nodes
//!   on the axis with the smaller total margin, at the position with the least overlap.
//! - Removal dissolves underflowing nodes and reinserts their entries.

use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::Debug;

use smallvec::SmallVec;

use crate::backend::Backend;
use crate::types::{Aabb2D, Scalar};

/// Maximum number of children per node.
pub const MAX_ENTRIES: usize = 9;
/// Minimum number of children per non-root node after a split or removal.
pub const MIN_ENTRIES: usize = 4;

type Entry<T> = (usize, Aabb2D<T>);

enum Node<T: Scalar> {
    Leaf {
        bbox: Aabb2D<T>,
        entries: Vec<Entry<T>>,
    },
    Branch {
        bbox: Aabb2D<T>,
        children: Vec<Node<T>>,
    },
}

impl<T: Scalar> Node<T> {
    fn empty() -> Self {
        Self::Leaf {
            bbox: Aabb2D::point(T::ZERO, T::ZERO),
            entries: Vec::new(),
        }
    }

    fn leaf(entries: Vec<Entry<T>>) -> Self {
        let bbox = bounds(&entries, |e| e.1).unwrap_or(Aabb2D::point(T::ZERO, T::ZERO));
        Self::Leaf { bbox, entries }
    }

    fn branch(children: Vec<Self>) -> Self {
        let bbox = bounds(&children, |c| *c.bbox()).unwrap_or(Aabb2D::point(T::ZERO, T::ZERO));
        Self::Branch { bbox, children }
    }

    fn bbox(&self) -> &Aabb2D<T> {
        match self {
            Self::Leaf { bbox, .. } | Self::Branch { bbox, .. } => bbox,
        }
    }

    fn child_count(&self) -> usize {
        match self {
            Self::Leaf { entries, .. } => entries.len(),
            Self::Branch { children, .. } => children.len(),
        }
    }

    fn refresh_bbox(&mut self) {
        match self {
            Self::Leaf { bbox, entries } => {
                if let Some(b) = bounds(entries, |e| e.1) {
                    *bbox = b;
                }
            }
            Self::Branch { bbox, children } => {
                if let Some(b) = bounds(children, |c| *c.bbox()) {
                    *bbox = b;
                }
            }
        }
    }

    /// Moves every leaf entry under this node into `out`.
    fn collect_into(self, out: &mut Vec<Entry<T>>) {
        match self {
            Self::Leaf { entries, .. } => out.extend(entries),
            Self::Branch { children, .. } => {
                for child in children {
                    child.collect_into(out);
                }
            }
        }
    }

    /// Inserts `entry` below this node. Returns a new sibling if this node had to split.
    fn insert(&mut self, entry: Entry<T>) -> Option<Self> {
        let overflow = match self {
            Self::Leaf { bbox, entries } => {
                *bbox = if entries.is_empty() {
                    entry.1
                } else {
                    bbox.union(&entry.1)
                };
                entries.push(entry);
                entries.len() > MAX_ENTRIES
            }
            Self::Branch { bbox, children } => {
                *bbox = bbox.union(&entry.1);
                let idx = choose_subtree(children, &entry.1);
                match children[idx].insert(entry) {
                    Some(sibling) => {
                        children.push(sibling);
                        children.len() > MAX_ENTRIES
                    }
                    None => false,
                }
            }
        };
        overflow.then(|| self.split())
    }

    /// Splits an overflowing node in place, returning the second half.
    fn split(&mut self) -> Self {
        match self {
            Self::Leaf { entries, .. } => {
                let rest = split_items(entries, |e| e.1);
                self.refresh_bbox();
                Self::leaf(rest)
            }
            Self::Branch { children, .. } => {
                let rest = split_items(children, |c| *c.bbox());
                self.refresh_bbox();
                Self::branch(rest)
            }
        }
    }

    /// Removes `slot` (whose box is `aabb`) from below this node.
    ///
    /// Children that underflow are dissolved and their entries pushed to `orphans`.
    fn remove(&mut self, slot: usize, aabb: &Aabb2D<T>, orphans: &mut Vec<Entry<T>>) -> bool {
        match self {
            Self::Leaf { entries, .. } => {
                let Some(pos) = entries.iter().position(|e| e.0 == slot) else {
                    return false;
                };
                entries.remove(pos);
            }
            Self::Branch { children, .. } => {
                let mut found = None;
                for (i, child) in children.iter_mut().enumerate() {
                    if child.bbox().contains(aabb) && child.remove(slot, aabb, orphans) {
                        found = Some(i);
                        break;
                    }
                }
                let Some(i) = found else {
                    return false;
                };
                if children[i].child_count() < MIN_ENTRIES {
                    children.remove(i).collect_into(orphans);
                }
            }
        }
        self.refresh_bbox();
        true
    }
}

fn cmp_acc<A: PartialOrd>(a: A, b: A) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn bounds<T: Scalar, I>(items: &[I], bbox_of: impl Fn(&I) -> Aabb2D<T>) -> Option<Aabb2D<T>> {
    let mut it = items.iter();
    let first = bbox_of(it.next()?);
    Some(it.fold(first, |acc, item| acc.union(&bbox_of(item))))
}

fn choose_subtree<T: Scalar>(children: &[Node<T>], aabb: &Aabb2D<T>) -> usize {
    let mut best = 0;
    let mut best_cost = None;
    for (i, child) in children.iter().enumerate() {
        let area = child.bbox().area();
        let enlargement = child.bbox().union(aabb).area() - area;
        let better = match best_cost {
            None => true,
            Some((e, a)) => match cmp_acc(enlargement, e) {
                Ordering::Less => true,
                Ordering::Equal => cmp_acc(area, a) == Ordering::Less,
                Ordering::Greater => false,
            },
        };
        if better {
            best = i;
            best_cost = Some((enlargement, area));
        }
    }
    best
}

/// Prefix and suffix bounds of `items` in their current order.
fn sweep_bounds<T: Scalar, I>(
    items: &[I],
    bbox_of: &impl Fn(&I) -> Aabb2D<T>,
) -> (Vec<Aabb2D<T>>, Vec<Aabb2D<T>>) {
    let n = items.len();
    let mut prefix = Vec::with_capacity(n);
    let mut acc = bbox_of(&items[0]);
    for item in items {
        acc = acc.union(&bbox_of(item));
        prefix.push(acc);
    }
    let mut suffix = vec![acc; n];
    let mut acc = bbox_of(&items[n - 1]);
    for (i, item) in items.iter().enumerate().rev() {
        acc = acc.union(&bbox_of(item));
        suffix[i] = acc;
    }
    (prefix, suffix)
}

/// Splits an overflowing list, keeping the first group in `items` and returning the second.
fn split_items<T: Scalar, I>(items: &mut Vec<I>, bbox_of: impl Fn(&I) -> Aabb2D<T>) -> Vec<I> {
    let n = items.len();
    let by_x = |a: &I, b: &I| cmp_acc(bbox_of(a).min_x.widen(), bbox_of(b).min_x.widen());
    let by_y = |a: &I, b: &I| cmp_acc(bbox_of(a).min_y.widen(), bbox_of(b).min_y.widen());

    let margin_sum = |list: &[I]| {
        let (prefix, suffix) = sweep_bounds(list, &bbox_of);
        let mut sum = T::ACC_ZERO;
        for k in MIN_ENTRIES..=n - MIN_ENTRIES {
            sum = sum + prefix[k - 1].margin() + suffix[k].margin();
        }
        sum
    };

    items.sort_by(&by_x);
    let x_margin = margin_sum(items.as_slice());
    items.sort_by(&by_y);
    let y_margin = margin_sum(items.as_slice());
    if cmp_acc(x_margin, y_margin) == Ordering::Less {
        items.sort_by(&by_x);
    }

    let (prefix, suffix) = sweep_bounds(items, &bbox_of);
    let mut best_k = MIN_ENTRIES;
    let mut best: Option<(T::Acc, T::Acc)> = None;
    for k in MIN_ENTRIES..=n - MIN_ENTRIES {
        let left = prefix[k - 1];
        let right = suffix[k];
        let overlap = left.intersect(&right).area();
        let area = left.area() + right.area();
        let better = match best {
            None => true,
            Some((o, a)) => match cmp_acc(overlap, o) {
                Ordering::Less => true,
                Ordering::Equal => cmp_acc(area, a) == Ordering::Less,
                Ordering::Greater => false,
            },
        };
        if better {
            best_k = k;
            best = Some((overlap, area));
        }
    }
    items.split_off(best_k)
}

/// One STR packing pass: groups `items` into nodes of at most [`MAX_ENTRIES`].
fn pack<T: Scalar, I>(
    mut items: Vec<I>,
    bbox_of: impl Fn(&I) -> Aabb2D<T>,
    make: impl Fn(Vec<I>) -> Node<T>,
) -> Vec<Node<T>> {
    let node_count = items.len().div_ceil(MAX_ENTRIES);
    let mut slices = 1;
    while slices * slices < node_count {
        slices += 1;
    }
    let per_slice = MAX_ENTRIES * slices;

    items.sort_by(|a, b| cmp_acc(bbox_of(a).center_x2(), bbox_of(b).center_x2()));
    let mut out = Vec::with_capacity(node_count);
    while !items.is_empty() {
        let take = per_slice.min(items.len());
        let mut slice: Vec<I> = items.drain(..take).collect();
        slice.sort_by(|a, b| cmp_acc(bbox_of(a).center_y2(), bbox_of(b).center_y2()));
        while !slice.is_empty() {
            let take = MAX_ENTRIES.min(slice.len());
            out.push(make(slice.drain(..take).collect()));
        }
    }
    out
}

fn build<T: Scalar>(entries: Vec<Entry<T>>) -> Node<T> {
    if entries.len() <= MAX_ENTRIES {
        return Node::leaf(entries);
    }
    let mut level = pack(entries, |e| e.1, Node::leaf);
    while level.len() > MAX_ENTRIES {
        level = pack(level, |n| *n.bbox(), Node::branch);
    }
    Node::branch(level)
}

/// R-tree backend.
///
/// Results are reported in tree traversal order: children are visited in the order
/// they are stored, depth first.
pub struct RTree<T: Scalar> {
    root: Node<T>,
    boxes: Vec<Option<Aabb2D<T>>>,
    len: usize,
}

/// R-tree over `f32` coordinates.
pub type RTreeF32 = RTree<f32>;
/// R-tree over `f64` coordinates.
pub type RTreeF64 = RTree<f64>;
/// R-tree over `i64` coordinates.
pub type RTreeI64 = RTree<i64>;

impl<T: Scalar> Default for RTree<T> {
    fn default() -> Self {
        Self {
            root: Node::empty(),
            boxes: Vec::new(),
            len: 0,
        }
    }
}

impl<T: Scalar> Debug for RTree<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RTree")
            .field("len", &self.len)
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}

impl<T: Scalar> RTree<T> {
    /// Number of slots in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree holds no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of node levels, counting the leaf level. An empty tree has height 1.
    #[must_use]
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut node = &self.root;
        while let Node::Branch { children, .. } = node {
            let Some(first) = children.first() else {
                break;
            };
            height += 1;
            node = first;
        }
        height
    }

    fn record(&mut self, slot: usize, aabb: Aabb2D<T>) {
        if self.boxes.len() <= slot {
            self.boxes.resize_with(slot + 1, || None);
        }
        if self.boxes[slot].replace(aabb).is_none() {
            self.len += 1;
        }
    }

    fn insert_entry(&mut self, entry: Entry<T>) {
        if let Some(sibling) = self.root.insert(entry) {
            let old = core::mem::replace(&mut self.root, Node::empty());
            self.root = Node::branch(vec![old, sibling]);
        }
    }

    fn all_entries(&mut self) -> Vec<Entry<T>> {
        let mut out = Vec::with_capacity(self.len);
        core::mem::replace(&mut self.root, Node::empty()).collect_into(&mut out);
        out
    }
}

impl<T: Scalar> Backend<T> for RTree<T> {
    fn insert(&mut self, slot: usize, aabb: Aabb2D<T>) {
        if self.boxes.get(slot).is_some_and(Option::is_some) {
            self.remove(slot);
        }
        self.record(slot, aabb);
        self.insert_entry((slot, aabb));
    }

    fn insert_bulk(&mut self, items: &[(usize, Aabb2D<T>)]) {
        for &(slot, _) in items {
            if self.boxes.get(slot).is_some_and(Option::is_some) {
                self.remove(slot);
            }
        }
        let existing = self.len;
        for &(slot, aabb) in items {
            self.record(slot, aabb);
        }
        if items.len() >= MIN_ENTRIES && items.len() >= existing {
            // Large relative to the tree: repacking everything beats one-by-one insertion.
            let mut entries = self.all_entries();
            entries.extend_from_slice(items);
            self.root = build(entries);
        } else {
            for &entry in items {
                self.insert_entry(entry);
            }
        }
    }

    fn remove(&mut self, slot: usize) {
        let Some(aabb) = self.boxes.get_mut(slot).and_then(Option::take) else {
            return;
        };
        self.len -= 1;

        let mut orphans = Vec::new();
        self.root.remove(slot, &aabb, &mut orphans);
        loop {
            match &mut self.root {
                Node::Branch { children, .. } if children.len() <= 1 => {
                    self.root = children.pop().unwrap_or_else(Node::empty);
                }
                _ => break,
            }
        }
        for entry in orphans {
            self.insert_entry(entry);
        }
    }

    fn clear(&mut self) {
        self.root = Node::empty();
        self.boxes.clear();
        self.len = 0;
    }

    fn visit_point<F: FnMut(usize)>(&self, x: T, y: T, mut f: F) {
        if self.len == 0 {
            return;
        }
        let mut stack: SmallVec<[&Node<T>; 16]> = SmallVec::new();
        stack.push(&self.root);
        while let Some(node) = stack.pop() {
            match node {
                Node::Leaf { entries, .. } => {
                    for (slot, aabb) in entries {
                        if aabb.contains_point(x, y) {
                            f(*slot);
                        }
                    }
                }
                Node::Branch { children, .. } => {
                    for child in children.iter().rev() {
                        if child.bbox().contains_point(x, y) {
                            stack.push(child);
                        }
                    }
                }
            }
        }
    }

    fn visit_rect<F: FnMut(usize)>(&self, rect: Aabb2D<T>, mut f: F) {
        if self.len == 0 {
            return;
        }
        let mut stack: SmallVec<[&Node<T>; 16]> = SmallVec::new();
        stack.push(&self.root);
        while let Some(node) = stack.pop() {
            match node {
                Node::Leaf { entries, .. } => {
                    for (slot, aabb) in entries {
                        if aabb.intersects(&rect) {
                            f(*slot);
                        }
                    }
                }
                Node::Branch { children, .. } => {
                    for child in children.iter().rev() {
                        if child.bbox().intersects(&rect) {
                            stack.push(child);
                        }
                    }
                }
            }
        }
    }
}
