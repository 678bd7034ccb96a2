// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quadtree tile addresses.

use core::fmt;
use core::iter::FusedIterator;

use kurbo::{Point, Rect};

/// A quadtree tile address: zoom level `z` and column/row `x`, `y`.
///
/// At zoom `z` the plane is split into `2^z × 2^z` tiles. `x` and `y` may lie outside
/// `[0, 2^z)` to address wrapped copies of the plane; [`normalize`](Self::normalize)
/// folds them back.
///
/// Coordinates compare and hash structurally, so a `Coord` is its own cache key.
/// The zoom level never exceeds [`MAX_ZOOM`](Self::MAX_ZOOM).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    z: u32,
    x: i64,
    y: i64,
}

impl Coord {
    /// Deepest supported zoom level.
    pub const MAX_ZOOM: u32 = 62;

    /// Creates a coordinate.
    ///
    /// # Panics
    ///
    /// If `z` exceeds [`MAX_ZOOM`](Self::MAX_ZOOM).
    #[must_use]
    #[track_caller]
    pub const fn new(z: u32, x: i64, y: i64) -> Self {
        assert!(z <= Self::MAX_ZOOM, "zoom level exceeds Coord::MAX_ZOOM");
        Self { z, x, y }
    }

    /// Zoom level.
    #[must_use]
    pub const fn z(self) -> u32 {
        self.z
    }

    /// Column.
    #[must_use]
    pub const fn x(self) -> i64 {
        self.x
    }

    /// Row.
    #[must_use]
    pub const fn y(self) -> i64 {
        self.y
    }

    /// Number of tiles along one axis at this zoom level.
    #[must_use]
    pub const fn side(self) -> i64 {
        1 << self.z
    }

    /// Folds `x` and `y` into `[0, 2^z)` using floor modulo.
    #[must_use]
    pub const fn normalize(self) -> Self {
        let n = self.side();
        Self {
            z: self.z,
            x: self.x.rem_euclid(n),
            y: self.y.rem_euclid(n),
        }
    }

    /// Returns `true` if `x` and `y` already lie in `[0, 2^z)`.
    #[must_use]
    pub const fn is_normalized(self) -> bool {
        let n = self.side();
        self.x >= 0 && self.x < n && self.y >= 0 && self.y < n
    }

    /// The tile `offset` levels up that contains this one.
    ///
    /// # Panics
    ///
    /// If `offset` exceeds `z`.
    #[must_use]
    #[track_caller]
    pub const fn ancestor(self, offset: u32) -> Self {
        assert!(offset <= self.z, "ancestor offset exceeds zoom level");
        Self {
            z: self.z - offset,
            x: self.x >> offset,
            y: self.y >> offset,
        }
    }

    /// The parent tile. `None` at zoom 0.
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        if self.z == 0 {
            None
        } else {
            Some(self.ancestor(1))
        }
    }

    /// All `4^offset` tiles `offset` levels down, row by row.
    ///
    /// `descendants(0)` yields only `self`.
    ///
    /// # Panics
    ///
    /// If `z + offset` exceeds [`MAX_ZOOM`](Self::MAX_ZOOM), or `4^offset` does not fit
    /// in a `usize`.
    #[track_caller]
    pub fn descendants(self, offset: u32) -> Descendants {
        assert!(
            offset <= Self::MAX_ZOOM - self.z,
            "descendant zoom exceeds Coord::MAX_ZOOM"
        );
        assert!(2 * offset < usize::BITS, "too many descendants to count");
        let side = 1_i64 << offset;
        Descendants {
            z: self.z + offset,
            x0: self.x << offset,
            y0: self.y << offset,
            side,
            dx: 0,
            dy: 0,
            remaining: 1_usize << (2 * offset),
        }
    }

    /// Returns `true` if `other` is strictly deeper and lies inside this tile.
    #[must_use]
    pub const fn is_ancestor_of(self, other: Self) -> bool {
        if other.z <= self.z {
            return false;
        }
        let up = other.ancestor(other.z - self.z);
        up.x == self.x && up.y == self.y
    }

    /// Returns `true` if this tile is strictly deeper and lies inside `other`.
    #[must_use]
    pub const fn is_descendant_of(self, other: Self) -> bool {
        other.is_ancestor_of(self)
    }

    /// Extent of this tile in the unit plane, where zoom 0 covers `[0, 1]²`.
    #[must_use]
    pub fn bounds(self) -> Rect {
        let n = side_f64(self.z);
        Rect::new(
            self.x as f64 / n,
            self.y as f64 / n,
            (self.x + 1) as f64 / n,
            (self.y + 1) as f64 / n,
        )
    }

    /// Center of this tile in the unit plane.
    #[must_use]
    pub fn center(self) -> Point {
        let n = side_f64(self.z);
        Point::new((self.x as f64 + 0.5) / n, (self.y as f64 + 0.5) / n)
    }

    /// Extent of `inner` within this tile, where this tile covers `[0, 1]²`.
    ///
    /// `inner` must be this tile or one of its descendants.
    #[must_use]
    pub fn sub_rect(self, inner: Self) -> Rect {
        debug_assert!(
            inner == self || self.is_ancestor_of(inner),
            "sub_rect of a tile outside this one"
        );
        let dz = inner.z - self.z;
        let n = side_f64(dz);
        let ox = (inner.x - (self.x << dz)) as f64;
        let oy = (inner.y - (self.y << dz)) as f64;
        Rect::new(ox / n, oy / n, (ox + 1.0) / n, (oy + 1.0) / n)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

impl From<(u32, i64, i64)> for Coord {
    fn from((z, x, y): (u32, i64, i64)) -> Self {
        Self::new(z, x, y)
    }
}

fn side_f64(z: u32) -> f64 {
    (1_u64 << z) as f64
}

/// Iterator over the descendants of a [`Coord`], returned by [`Coord::descendants`].
#[derive(Clone, Debug)]
pub struct Descendants {
    z: u32,
    x0: i64,
    y0: i64,
    side: i64,
    dx: i64,
    dy: i64,
    remaining: usize,
}

impl Iterator for Descendants {
    type Item = Coord;

    fn next(&mut self) -> Option<Coord> {
        if self.remaining == 0 {
            return None;
        }
        let out = Coord {
            z: self.z,
            x: self.x0 + self.dx,
            y: self.y0 + self.dy,
        };
        self.remaining -= 1;
        self.dx += 1;
        if self.dx == self.side {
            self.dx = 0;
            self.dy += 1;
        }
        Some(out)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Descendants {}
impl FusedIterator for Descendants {}
