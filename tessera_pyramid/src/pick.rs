// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit testing against shapes attached to tiles.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Rect};
use tessera_index::{Aabb2D, Index, Key, RTreeF64};
use tessera_precise_hit::PreciseHitTest;

use crate::coord::Coord;

/// Shapes of one zoom level, narrowed by an R-tree and confirmed by exact tests.
pub struct PickIndex<S> {
    index: Index<f64, S, RTreeF64>,
}

impl<S> fmt::Debug for PickIndex<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PickIndex")
            .field("len", &self.index.len())
            .finish_non_exhaustive()
    }
}

impl<S> Default for PickIndex<S> {
    fn default() -> Self {
        Self {
            index: Index::new(),
        }
    }
}

impl<S: PreciseHitTest> PickIndex<S> {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the index holds no shapes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Bulk-loads shapes, returning one key per shape in input order.
    pub fn insert<I>(&mut self, shapes: I) -> Vec<Key>
    where
        I: IntoIterator<Item = S>,
    {
        self.index.extend(shapes.into_iter().map(|s| (aabb(s.bounds()), s)))
    }

    /// Removes the shapes behind `keys`, returning them in the same order.
    ///
    /// # Panics
    ///
    /// If a key is not live in this index.
    #[track_caller]
    pub fn remove(&mut self, keys: &[Key]) -> Vec<S> {
        keys.iter()
            .map(|&key| match self.index.remove(key) {
                Some(shape) => shape,
                None => panic!("pick key {key:?} is not in this index"),
            })
            .collect()
    }

    /// Removes every shape.
    pub fn clear(&mut self) {
        self.index.clear();
    }

    /// The first shape, in R-tree order, that contains `pt`.
    #[must_use]
    pub fn search_point(&self, pt: Point) -> Option<&S> {
        self.index
            .query_point(pt.x, pt.y)
            .map(|(_, shape)| shape)
            .find(|shape| shape.test_point(pt))
    }

    /// The first shape, in R-tree order, that overlaps `rect`.
    #[must_use]
    pub fn search_rect(&self, rect: Rect) -> Option<&S> {
        self.index
            .query_rect(aabb(rect))
            .map(|(_, shape)| shape)
            .find(|shape| shape.test_rect(rect))
    }
}

fn aabb(rect: Rect) -> Aabb2D<f64> {
    let r = rect.abs();
    Aabb2D::new(r.x0, r.y0, r.x1, r.y1)
}

/// One [`PickIndex`] per zoom level, with shapes grouped by tile.
///
/// Shapes are stored in the pixel space of their own level: at zoom `z` with tiles of
/// `tile_size` pixels, the plane spans `tile_size · 2^z` pixels. Queries come in unit
/// plane coordinates together with the current, possibly fractional, zoom.
///
/// ```
/// use kurbo::Point;
/// use tessera_precise_hit::{Circle, Shape};
/// use tessera_pyramid::{Coord, PickPyramid};
///
/// let mut pyramid = PickPyramid::new();
/// // A 10px dot in the middle of tile 1/0/0, with 256px tiles.
/// pyramid.insert(
///     Coord::new(1, 0, 0),
///     [Shape::from(Circle::new(Point::new(128.0, 128.0), 10.0))],
/// );
///
/// // At zoom 1.2 the query snaps to level 1.
/// assert!(pyramid.search_point(Point::new(0.25, 0.25), 1.2, 256.0).is_some());
/// assert!(pyramid.search_point(Point::new(0.30, 0.25), 1.2, 256.0).is_none());
/// // Level 2 holds nothing.
/// assert!(pyramid.search_point(Point::new(0.25, 0.25), 2.0, 256.0).is_none());
/// ```
pub struct PickPyramid<S> {
    trees: BTreeMap<u32, PickIndex<S>>,
    keys: HashMap<Coord, Vec<Key>>,
}

impl<S> fmt::Debug for PickPyramid<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PickPyramid")
            .field("levels", &self.trees.len())
            .field("tiles", &self.keys.len())
            .finish_non_exhaustive()
    }
}

impl<S> Default for PickPyramid<S> {
    fn default() -> Self {
        Self {
            trees: BTreeMap::new(),
            keys: HashMap::new(),
        }
    }
}

impl<S: PreciseHitTest> PickPyramid<S> {
    /// Creates an empty pyramid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of inserted tiles, including tiles with an empty shape list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if no tile is inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Zoom levels holding shapes, ascending.
    pub fn levels(&self) -> impl Iterator<Item = u32> + '_ {
        self.trees.keys().copied()
    }

    /// Returns `true` if `coord` is inserted.
    #[must_use]
    pub fn contains(&self, coord: Coord) -> bool {
        self.keys.contains_key(&coord.normalize())
    }

    /// Adds the shapes of one tile, in the pixel space of its level.
    ///
    /// A tile with no shapes is remembered so it can be removed later, but does not
    /// make its level searchable.
    ///
    /// # Panics
    ///
    /// If the tile is already inserted.
    #[track_caller]
    pub fn insert<I>(&mut self, coord: Coord, shapes: I)
    where
        I: IntoIterator<Item = S>,
    {
        let coord = coord.normalize();
        assert!(
            !self.keys.contains_key(&coord),
            "shapes for tile {coord} are already indexed"
        );
        let mut shapes = shapes.into_iter().peekable();
        let keys = if shapes.peek().is_some() {
            self.trees.entry(coord.z()).or_default().insert(shapes)
        } else {
            Vec::new()
        };
        self.keys.insert(coord, keys);
    }

    /// Removes and returns the shapes of one tile.
    ///
    /// # Panics
    ///
    /// If the tile is not inserted.
    #[track_caller]
    pub fn remove(&mut self, coord: Coord) -> Vec<S> {
        let coord = coord.normalize();
        let Some(keys) = self.keys.remove(&coord) else {
            panic!("no shapes are indexed for tile {coord}");
        };
        if keys.is_empty() {
            return Vec::new();
        }
        let Some(tree) = self.trees.get_mut(&coord.z()) else {
            panic!("missing pick index for level {}", coord.z());
        };
        let shapes = tree.remove(&keys);
        if tree.is_empty() {
            self.trees.remove(&coord.z());
        }
        shapes
    }

    /// Removes every shape.
    pub fn clear(&mut self) {
        self.trees.clear();
        self.keys.clear();
    }

    /// The first shape containing `pt` at the level nearest to `zoom`.
    ///
    /// `pt` is in unit plane coordinates. It is first scaled to view pixels at `zoom`,
    /// then by `2^(level − zoom)` into the level's pixel space.
    #[must_use]
    pub fn search_point(&self, pt: Point, zoom: f64, tile_size: f64) -> Option<&S> {
        let (tree, scale) = self.level_for(zoom, tile_size)?;
        tree.search_point(Point::new(pt.x * scale, pt.y * scale))
    }

    /// The first shape overlapping `rect` at the level nearest to `zoom`.
    ///
    /// `rect` is in unit plane coordinates; see [`search_point`](Self::search_point).
    #[must_use]
    pub fn search_rect(&self, rect: Rect, zoom: f64, tile_size: f64) -> Option<&S> {
        let (tree, scale) = self.level_for(zoom, tile_size)?;
        tree.search_rect(rect.scale_from_origin(scale))
    }

    /// Index for the level nearest `zoom`, and the unit-plane to level-pixel factor.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "the rounded zoom is range-checked before casting"
    )]
    fn level_for(&self, zoom: f64, tile_size: f64) -> Option<(&PickIndex<S>, f64)> {
        let rounded = zoom.round();
        if !(0.0..=f64::from(Coord::MAX_ZOOM)).contains(&rounded) {
            return None;
        }
        let level = rounded as u32;
        let tree = self.trees.get(&level)?;
        // tile_size · 2^zoom · 2^(level − zoom)
        let scale = tile_size * (1_u64 << level) as f64;
        Some((tree, scale))
    }
}
