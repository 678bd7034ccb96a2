// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Level-of-detail fallback: finding resident tiles that can stand in for a missing one.

use alloc::collections::VecDeque;
use alloc::vec;
use alloc::vec::Vec;

use kurbo::Rect;

use crate::cache::TileCache;
use crate::coord::Coord;
use crate::tile::Tile;

/// How a [`LodPartial`] relates to its target.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LodKind {
    /// The target tile itself.
    Exact,
    /// A coarser tile containing the region.
    Ancestor,
    /// A finer tile inside the target.
    Descendant,
}

/// One resident tile that covers part of a target coordinate.
#[derive(Debug)]
pub struct LodPartial<'a, D, E> {
    /// How `tile` relates to `target`.
    pub kind: LodKind,
    /// The coordinate being approximated.
    pub target: Coord,
    /// The part of `target` this partial covers: `target` itself, one of its
    /// descendants, or, for descendant partials, the tile's own coordinate.
    pub region: Coord,
    /// The substitute tile.
    pub tile: &'a Tile<D, E>,
}

/// Where to sample a substitute tile and where to draw it, both in unit tile space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Placement {
    /// Sub-rectangle of the substitute tile to sample.
    pub source: Rect,
    /// Sub-rectangle of the target tile it covers.
    pub dest: Rect,
}

impl<D, E> LodPartial<'_, D, E> {
    /// Positioning of this partial.
    ///
    /// For a parent standing in for its top-right child, the source is the parent's
    /// top-right quarter and the destination is the whole target.
    #[must_use]
    pub fn placement(&self) -> Placement {
        Placement {
            source: self.tile.coord().sub_rect(self.region),
            dest: self.target.sub_rect(self.region),
        }
    }
}

/// One slot of a [`TileCache::descendants`] result.
#[derive(Debug)]
pub enum DescendantSlot<'a, D, E> {
    /// The descendant is resident.
    Resident(&'a Tile<D, E>),
    /// The descendant is not resident.
    Missing(Coord),
}

impl<D, E> DescendantSlot<'_, D, E> {
    /// Coordinate of the slot.
    #[must_use]
    pub fn coord(&self) -> Coord {
        match self {
            Self::Resident(tile) => tile.coord(),
            Self::Missing(coord) => *coord,
        }
    }

    /// The resident tile, if any.
    #[must_use]
    pub fn tile(&self) -> Option<&Tile<D, E>> {
        match self {
            Self::Resident(tile) => Some(tile),
            Self::Missing(_) => None,
        }
    }
}

/// Search order cost in half levels. Descendants win ties against ancestors.
fn lod_cost(target_z: u32, level: u32) -> u64 {
    if level < target_z {
        2 * u64::from(target_z - level)
    } else {
        2 * u64::from(level - target_z) - 1
    }
}

impl<D, E> TileCache<D, E> {
    /// The resident tile `distance` levels above `coord`. Does not touch LRU order.
    #[must_use]
    pub fn ancestor(&self, coord: Coord, distance: u32) -> Option<&Tile<D, E>> {
        let coord = coord.normalize();
        if distance > coord.z() {
            return None;
        }
        self.peek_normalized(coord.ancestor(distance))
    }

    /// The `4^distance` tiles `distance` levels below `coord`, row by row.
    ///
    /// Returns `None` unless at least one of them is resident. Does not touch LRU order.
    ///
    /// # Panics
    ///
    /// If a descendant is resident and `4^distance` does not fit in a `usize`.
    #[must_use]
    pub fn descendants(
        &self,
        coord: Coord,
        distance: u32,
    ) -> Option<Vec<DescendantSlot<'_, D, E>>> {
        let coord = coord.normalize();
        let level = coord
            .z()
            .checked_add(distance)
            .filter(|&z| z <= Coord::MAX_ZOOM)?;
        if !self
            .tiles_at_level(level)
            .any(|c| c.ancestor(distance) == coord)
        {
            return None;
        }
        let slots = coord
            .descendants(distance)
            .map(|c| match self.peek_normalized(c) {
                Some(tile) => DescendantSlot::Resident(tile),
                None => DescendantSlot::Missing(c),
            })
            .collect();
        Some(slots)
    }

    /// Resident tiles that together approximate `coord`.
    ///
    /// A resident exact tile is returned alone. Otherwise every other level holding
    /// tiles is tried once, nearest first, descendants winning ties. Each try is made
    /// against the head of a queue of regions still to cover, seeded with `coord`:
    ///
    /// - A coarser level covers the head region if it holds the region's ancestor.
    /// - A finer level, at most
    ///   [`max_descendant_depth`](crate::TileCacheConfig::max_descendant_depth) below
    ///   `coord`, covers the head region if it holds any of its descendants. Missing
    ///   descendants are queued as regions of their own.
    ///
    /// Returns `None` if nothing was found. Does not touch LRU order.
    ///
    /// ```
    /// # use kurbo::Point;
    /// # use tessera_pyramid::{Coord, LoadTicket, LodKind, TileCache, TileLayer};
    /// # struct Layer(Vec<LoadTicket>);
    /// # impl TileLayer for Layer {
    /// #     fn request_tile(&mut self, t: LoadTicket) { self.0.push(t); }
    /// #     fn is_tile_visible(&self, _: Coord) -> bool { true }
    /// #     fn view_center(&self) -> Point { Point::ORIGIN }
    /// # }
    /// let mut cache: TileCache<(), ()> = TileCache::default();
    /// let mut layer = Layer(Vec::new());
    /// cache.request_tiles([Coord::new(1, 0, 0)], &mut layer);
    /// for t in std::mem::take(&mut layer.0) {
    ///     cache.settle(t, Ok(()), &layer, 0);
    /// }
    ///
    /// let found = cache.available_lod(Coord::new(3, 1, 2)).unwrap();
    /// assert_eq!(found.len(), 1);
    /// assert_eq!(found[0].kind, LodKind::Ancestor);
    /// assert_eq!(found[0].tile.coord(), Coord::new(1, 0, 0));
    /// ```
    #[must_use]
    pub fn available_lod(&self, coord: Coord) -> Option<Vec<LodPartial<'_, D, E>>> {
        let target = coord.normalize();
        if let Some(tile) = self.peek_normalized(target) {
            return Some(vec![LodPartial {
                kind: LodKind::Exact,
                target,
                region: target,
                tile,
            }]);
        }

        let mut levels: Vec<u32> = self.levels().filter(|&z| z != target.z()).collect();
        levels.sort_by_key(|&z| lod_cost(target.z(), z));

        let max_depth = self.config().max_descendant_depth;
        let mut queue = VecDeque::from([target]);
        let mut partials = Vec::new();
        for level in levels {
            let Some(&current) = queue.front() else {
                break;
            };
            if level < current.z() {
                if let Some(tile) = self.peek_normalized(current.ancestor(current.z() - level)) {
                    partials.push(LodPartial {
                        kind: LodKind::Ancestor,
                        target,
                        region: current,
                        tile,
                    });
                    queue.pop_front();
                }
            } else if level > current.z() && level - target.z() <= max_depth {
                let Some(slots) = self.descendants(current, level - current.z()) else {
                    continue;
                };
                queue.pop_front();
                for slot in slots {
                    match slot {
                        DescendantSlot::Resident(tile) => partials.push(LodPartial {
                            kind: LodKind::Descendant,
                            target,
                            region: tile.coord(),
                            tile,
                        }),
                        DescendantSlot::Missing(c) => queue.push_back(c),
                    }
                }
            }
        }

        if partials.is_empty() {
            None
        } else {
            Some(partials)
        }
    }
}
