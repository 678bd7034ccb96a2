// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tessera Pyramid: the cache core of a tiled 2D renderer.
//!
//! A pannable, zoomable plane is cut into quadtree tiles addressed by [`Coord`]. This
//! crate decides which tiles to load, keeps loaded ones in bounded memory, and answers
//! "what can I draw here" when the exact tile is missing.
//!
//! ## Tile cache
//!
//! [`TileCache`] owns the load lifecycle. The host implements [`TileLayer`] to start
//! loads and to report what is on screen, and feeds results back through
//! [`TileCache::settle`]:
//!
//! - Duplicate requests and requests for resident or in-flight tiles are dropped.
//! - Loads issue nearest to the view center first.
//! - [`TileCache::clear`] invalidates in-flight loads; their late results are discarded.
//! - Results for tiles that scrolled out of view are discarded.
//! - Tiles on the first few levels are kept until cleared; deeper ones are evicted in
//!   least recently used order (see `tessera_lru`).
//!
//! Everything that happens is recorded as a [`TileEvent`], drained by the host, so
//! renderers and pick indices can follow tiles in and out of the cache. A burst of
//! settlements ends with a single [`TileEvent::AllLoaded`], driven by
//! [`TileCache::tick`].
//!
//! ## Level-of-detail fallback
//!
//! [`TileCache::available_lod`] finds resident ancestors and descendants that together
//! stand in for a missing tile. Each [`LodPartial`] knows its [`Placement`]: which part
//! of the substitute to sample and where it lands in the target.
//!
//! ## Picking
//!
//! [`PickPyramid`] keeps one R-tree ([`PickIndex`]) per zoom level, with shapes
//! grouped by tile so they can be dropped when the tile leaves the cache. Queries are
//! narrowed by bounding box and confirmed with exact shape tests from
//! `tessera_precise_hit`.
//!
//! ```rust
//! use kurbo::Point;
//! use tessera_precise_hit::{Circle, Shape};
//! use tessera_pyramid::{Coord, LoadTicket, PickPyramid, TileCache, TileEvent, TileLayer};
//!
//! struct Layer(Vec<LoadTicket>);
//!
//! impl TileLayer for Layer {
//!     fn request_tile(&mut self, ticket: LoadTicket) {
//!         self.0.push(ticket);
//!     }
//!     fn is_tile_visible(&self, _coord: Coord) -> bool {
//!         true
//!     }
//!     fn view_center(&self) -> Point {
//!         Point::new(0.5, 0.5)
//!     }
//! }
//!
//! // Tiles carry the dots drawn on them, in level pixels.
//! let mut cache: TileCache<Vec<Shape>, ()> = TileCache::default();
//! let mut picks = PickPyramid::new();
//! let mut layer = Layer(Vec::new());
//!
//! cache.request_tiles([Coord::new(0, 0, 0)], &mut layer);
//! for ticket in std::mem::take(&mut layer.0) {
//!     let dots = vec![Shape::from(Circle::new(Point::new(64.0, 64.0), 4.0))];
//!     cache.settle(ticket, Ok(dots), &layer, 0);
//! }
//!
//! let events: Vec<_> = cache.drain_events().collect();
//! for event in events {
//!     if let TileEvent::Added(id) = event {
//!         let shapes = cache.peek(id.coord).and_then(|t| t.data()).cloned();
//!         picks.insert(id.coord, shapes.unwrap_or_default());
//!     }
//! }
//!
//! assert!(picks.search_point(Point::new(0.25, 0.25), 0.0, 256.0).is_some());
//! ```
//!
//! All types are single-threaded and do no I/O. Time is supplied by the host.
//!
//! This crate is `no_std` and uses `alloc`. Logging goes through `tracing`; install a
//! subscriber to see it.

#![no_std]

extern crate alloc;

mod cache;
mod config;
mod coord;
mod events;
mod lod;
mod pick;
mod throttle;
mod tile;

pub use cache::{MAX_TILE_UID, TileCache, TileCacheStats};
pub use config::{ConfigError, TileCacheConfig};
pub use coord::{Coord, Descendants};
pub use events::{DiscardReason, SettleOutcome, TileEvent, TileEventMask};
pub use lod::{DescendantSlot, LodKind, LodPartial, Placement};
pub use pick::{PickIndex, PickPyramid};
pub use throttle::AllLoadedThrottle;
pub use tile::{LoadTicket, Tile, TileId, TileLayer};
