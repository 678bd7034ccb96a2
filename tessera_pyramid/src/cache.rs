// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tile cache: request tracking, settlement, and resident storage.

use alloc::collections::{BTreeMap, VecDeque};
use alloc::vec::Vec;
use core::fmt;

use hashbrown::{HashMap, HashSet};
use tessera_lru::{EvictionCache, EvictionListener};

use crate::config::{ConfigError, TileCacheConfig};
use crate::coord::Coord;
use crate::events::{DiscardReason, SettleOutcome, TileEvent};
use crate::throttle::AllLoadedThrottle;
use crate::tile::{LoadTicket, Tile, TileId, TileLayer};

/// Tile uids wrap back to zero after this value.
pub const MAX_TILE_UID: u64 = (1 << 53) - 1;

/// Collects tiles leaving the evictable store until the cache turns them into events.
struct RemovedTiles<D, E>(Vec<Tile<D, E>>);

impl<D, E> EvictionListener<Coord, Tile<D, E>> for RemovedTiles<D, E> {
    fn on_remove(&mut self, _coord: Coord, tile: Tile<D, E>) {
        self.0.push(tile);
    }
}

/// Snapshot of a cache's bookkeeping, for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileCacheStats {
    /// Resident tiles on persistent levels.
    pub persistent: usize,
    /// Resident tiles on evictable levels.
    pub evictable: usize,
    /// Loads in flight.
    pub pending: usize,
    /// In-flight loads issued before the last clear.
    pub stale: usize,
    /// Zoom levels holding at least one resident tile.
    pub levels: usize,
}

/// A quadtree tile cache with bounded memory.
///
/// Tiles on the first [`persistent_levels`](TileCacheConfig::persistent_levels) zoom
/// levels are kept until cleared. Deeper tiles live in an LRU store of
/// [`capacity`](TileCacheConfig::capacity) entries.
///
/// Loads are driven by the host through a [`TileLayer`]:
///
/// 1. [`request_tiles`](Self::request_tiles) issues a [`LoadTicket`] for each coordinate
///    that is neither resident nor in flight, nearest to the view center first.
/// 2. The host loads the tile and hands the ticket back to [`settle`](Self::settle),
///    together with the current time.
/// 3. The cache commits or drops the result and records [`TileEvent`]s, which the host
///    drains with [`drain_events`](Self::drain_events).
/// 4. The host calls [`tick`](Self::tick) with the current time; once the configured
///    window has passed since the first settlement of a burst and nothing is pending,
///    the cache emits [`TileEvent::AllLoaded`].
///
/// All coordinates passed in are normalized first.
///
/// # Example
///
/// ```
/// use kurbo::Point;
/// use tessera_pyramid::{Coord, LoadTicket, TileCache, TileCacheConfig, TileEvent, TileLayer};
///
/// #[derive(Default)]
/// struct Layer {
///     tickets: Vec<LoadTicket>,
/// }
///
/// impl TileLayer for Layer {
///     fn request_tile(&mut self, ticket: LoadTicket) {
///         self.tickets.push(ticket);
///     }
///     fn is_tile_visible(&self, _coord: Coord) -> bool {
///         true
///     }
///     fn view_center(&self) -> Point {
///         Point::new(0.5, 0.5)
///     }
/// }
///
/// let mut cache: TileCache<&str, ()> = TileCache::new(TileCacheConfig::default());
/// let mut layer = Layer::default();
///
/// cache.request_tiles([Coord::new(0, 0, 0)], &mut layer);
/// for ticket in std::mem::take(&mut layer.tickets) {
///     cache.settle(ticket, Ok("world"), &layer, 0);
/// }
/// cache.tick(200);
///
/// let tile = cache.get(Coord::new(0, 0, 0)).unwrap();
/// assert_eq!(tile.data(), Some(&"world"));
/// assert!(matches!(
///     cache.drain_events().collect::<Vec<_>>()[..],
///     [TileEvent::Requested(_), TileEvent::Added(_), TileEvent::AllLoaded]
/// ));
/// ```
pub struct TileCache<D, E> {
    config: TileCacheConfig,
    persistent: HashMap<Coord, Tile<D, E>>,
    evictable: EvictionCache<Coord, Tile<D, E>, RemovedTiles<D, E>>,
    pending: HashMap<Coord, Tile<D, E>>,
    stale: HashSet<TileId>,
    /// Resident coordinates by zoom level.
    levels: BTreeMap<u32, HashSet<Coord>>,
    next_uid: u64,
    now: u64,
    throttle: AllLoadedThrottle,
    events: VecDeque<TileEvent<D, E>>,
}

impl<D, E> fmt::Debug for TileCache<D, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileCache")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .field("now", &self.now)
            .field("throttle", &self.throttle)
            .field("queued_events", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl<D, E> Default for TileCache<D, E> {
    fn default() -> Self {
        Self::new(TileCacheConfig::default())
    }
}

impl<D, E> TileCache<D, E> {
    /// Creates an empty cache.
    ///
    /// # Panics
    ///
    /// If `config` fails [`TileCacheConfig::validate`].
    #[must_use]
    #[track_caller]
    pub fn new(config: TileCacheConfig) -> Self {
        match Self::try_new(config) {
            Ok(cache) => cache,
            Err(err) => panic!("invalid tile cache config: {err}"),
        }
    }

    /// Creates an empty cache, rejecting unusable settings.
    pub fn try_new(config: TileCacheConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            persistent: HashMap::new(),
            evictable: EvictionCache::with_listener(config.capacity, RemovedTiles(Vec::new())),
            pending: HashMap::new(),
            stale: HashSet::new(),
            levels: BTreeMap::new(),
            next_uid: 0,
            now: 0,
            throttle: AllLoadedThrottle::new(config.all_loaded_window_ms),
            events: VecDeque::new(),
        })
    }

    /// The settings this cache was built with.
    #[must_use]
    pub fn config(&self) -> &TileCacheConfig {
        &self.config
    }

    /// Upper bound on resident tiles: the evictable capacity plus everything the
    /// persistent levels can hold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        // Checked by `TileCacheConfig::validate`.
        self.config.total_capacity().unwrap_or(usize::MAX)
    }

    /// Number of resident tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.persistent.len() + self.evictable.len()
    }

    /// Returns `true` if no tile is resident.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of loads in flight.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Bookkeeping snapshot.
    #[must_use]
    pub fn stats(&self) -> TileCacheStats {
        TileCacheStats {
            persistent: self.persistent.len(),
            evictable: self.evictable.len(),
            pending: self.pending.len(),
            stale: self.stale.len(),
            levels: self.levels.len(),
        }
    }

    /// Issues loads for every coordinate that is neither resident nor pending.
    ///
    /// Coordinates are normalized and deduplicated, first occurrence winning. Resident
    /// tiles are refreshed in the LRU order as a side effect. Loads are issued in order
    /// of distance from [`TileLayer::view_center`], ties keeping input order.
    ///
    /// Returns the number of loads issued.
    pub fn request_tiles<I, L>(&mut self, coords: I, layer: &mut L) -> usize
    where
        I: IntoIterator<Item = Coord>,
        L: TileLayer + ?Sized,
    {
        let center = layer.view_center();
        let mut seen = HashSet::new();
        let mut batch = Vec::new();
        for coord in coords {
            let key = coord.normalize();
            if !seen.insert(key) || self.touch(key) || self.pending.contains_key(&key) {
                continue;
            }
            // Distance uses the unnormalized center so wrapped copies near the view win.
            batch.push(((coord.center() - center).hypot2(), key));
        }
        batch.sort_by(|a, b| a.0.total_cmp(&b.0));

        let issued = batch.len();
        for (_, coord) in batch {
            let id = TileId {
                coord,
                uid: self.next_uid(),
            };
            self.pending.insert(coord, Tile::pending(id));
            tracing::trace!(%coord, uid = id.uid, "requesting tile");
            self.emit(TileEvent::Requested(id));
            layer.request_tile(LoadTicket { id });
        }
        issued
    }

    /// Settles an outstanding load.
    ///
    /// Stale tickets (issued before the last [`clear`](Self::clear)) are discarded
    /// whatever the result. Errors are recorded and reported as
    /// [`TileEvent::Failed`]. Successful loads are discarded if the layer no longer
    /// shows the tile, and committed otherwise, possibly evicting the least recently
    /// used tile.
    ///
    /// `now_ms` is the host time of the settlement. The first added or discarded tile
    /// of a burst starts the [`TileEvent::AllLoaded`] window from this time.
    ///
    /// # Panics
    ///
    /// If the ticket is neither pending nor stale, or its tile is already resident.
    #[track_caller]
    pub fn settle<L>(
        &mut self,
        ticket: LoadTicket,
        result: Result<D, E>,
        layer: &L,
        now_ms: u64,
    ) -> SettleOutcome
    where
        L: TileLayer + ?Sized,
    {
        self.now = self.now.max(now_ms);
        let id = ticket.id;
        if self.stale.remove(&id) {
            let mut tile = Tile::pending(id);
            tile.settle(result);
            tracing::debug!(coord = %id.coord, uid = id.uid, "discarding stale tile");
            return self.discard(tile, DiscardReason::Stale);
        }

        let Some(mut tile) = self.pending.remove(&id.coord).filter(|t| t.id() == id) else {
            panic!(
                "settled tile {} (uid {}) is neither pending nor stale",
                id.coord, id.uid
            );
        };
        match result {
            Err(error) => {
                tile.settle(Err(error));
                tracing::debug!(coord = %id.coord, uid = id.uid, "tile load failed");
                self.emit(TileEvent::Failed(tile));
                SettleOutcome::Failed
            }
            Ok(data) => {
                tile.settle(Ok(data));
                if !layer.is_tile_visible(id.coord) {
                    tracing::debug!(
                        coord = %id.coord,
                        uid = id.uid,
                        "discarding invisible tile"
                    );
                    return self.discard(tile, DiscardReason::NotVisible);
                }
                self.commit(tile);
                self.throttle.arm(self.now);
                SettleOutcome::Added
            }
        }
    }

    /// Advances the host clock and emits [`TileEvent::AllLoaded`] if it is due.
    ///
    /// Returns `true` if the event fired. The event is skipped when loads are still
    /// pending at the deadline; the settlement that empties the queue re-arms it.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        self.now = self.now.max(now_ms);
        if self.throttle.poll(now_ms) && self.pending.is_empty() {
            tracing::trace!(now_ms, "all tiles loaded");
            self.emit(TileEvent::AllLoaded);
            return true;
        }
        false
    }

    /// Drops every resident tile and invalidates every pending load.
    ///
    /// Pending loads are remembered as stale; when they settle they are discarded.
    pub fn clear(&mut self) {
        let flagged = self.pending.len();
        for (_, tile) in self.pending.drain() {
            self.stale.insert(tile.id());
        }

        let removed = self.len();
        let persistent: Vec<_> = self.persistent.drain().map(|(_, tile)| tile).collect();
        for tile in persistent {
            self.emit(TileEvent::Removed(tile));
        }
        self.evictable.clear();
        self.flush_removed();
        self.levels.clear();
        tracing::debug!(flagged, removed, "cleared tile cache");
    }

    /// Removes one resident tile, emitting [`TileEvent::Removed`].
    ///
    /// Returns `false` if the tile was not resident.
    pub fn remove(&mut self, coord: Coord) -> bool {
        let coord = coord.normalize();
        if let Some(tile) = self.persistent.remove(&coord) {
            self.unindex(coord);
            self.emit(TileEvent::Removed(tile));
            return true;
        }
        let removed = self.evictable.remove(&coord);
        self.flush_removed();
        removed
    }

    /// Returns `true` if the tile is resident. Does not touch LRU order.
    #[must_use]
    pub fn has(&self, coord: Coord) -> bool {
        self.peek_normalized(coord.normalize()).is_some()
    }

    /// Returns `true` if a load for the tile is in flight.
    #[must_use]
    pub fn is_pending(&self, coord: Coord) -> bool {
        self.pending.contains_key(&coord.normalize())
    }

    /// Returns a resident tile and marks it most recently used.
    pub fn get(&mut self, coord: Coord) -> Option<&Tile<D, E>> {
        let coord = coord.normalize();
        if self.is_persistent_level(coord.z()) {
            self.persistent.get(&coord)
        } else {
            self.evictable.get(&coord)
        }
    }

    /// Returns a resident tile without touching LRU order.
    #[must_use]
    pub fn peek(&self, coord: Coord) -> Option<&Tile<D, E>> {
        self.peek_normalized(coord.normalize())
    }

    /// Zoom levels holding resident tiles, ascending.
    pub fn levels(&self) -> impl Iterator<Item = u32> + '_ {
        self.levels.keys().copied()
    }

    /// Resident coordinates at zoom `z`, in no particular order.
    pub fn tiles_at_level(&self, z: u32) -> impl Iterator<Item = Coord> + '_ {
        self.levels.get(&z).into_iter().flatten().copied()
    }

    /// Takes the buffered events, oldest first.
    pub fn drain_events(&mut self) -> impl Iterator<Item = TileEvent<D, E>> + '_ {
        self.events.drain(..)
    }

    pub(crate) fn peek_normalized(&self, coord: Coord) -> Option<&Tile<D, E>> {
        if self.is_persistent_level(coord.z()) {
            self.persistent.get(&coord)
        } else {
            self.evictable.peek(&coord)
        }
    }

    /// Resident lookup that refreshes LRU order.
    fn touch(&mut self, coord: Coord) -> bool {
        if self.is_persistent_level(coord.z()) {
            self.persistent.contains_key(&coord)
        } else {
            self.evictable.get(&coord).is_some()
        }
    }

    fn is_persistent_level(&self, z: u32) -> bool {
        z < self.config.persistent_levels
    }

    #[track_caller]
    fn commit(&mut self, tile: Tile<D, E>) {
        let id = tile.id();
        let coord = id.coord;
        if self.is_persistent_level(coord.z()) {
            assert!(
                !self.persistent.contains_key(&coord),
                "tile {coord} is already resident"
            );
            self.persistent.insert(coord, tile);
        } else {
            assert!(
                !self.evictable.contains(&coord),
                "tile {coord} is already resident"
            );
            self.evictable.insert(coord, tile);
            self.flush_removed();
        }
        self.levels.entry(coord.z()).or_default().insert(coord);
        tracing::trace!(%coord, uid = id.uid, "committed tile");
        self.emit(TileEvent::Added(id));
    }

    fn discard(&mut self, tile: Tile<D, E>, reason: DiscardReason) -> SettleOutcome {
        self.emit(TileEvent::Discarded { tile, reason });
        self.throttle.arm(self.now);
        SettleOutcome::Discarded(reason)
    }

    /// Turns tiles the evictable store let go of into `Removed` events.
    fn flush_removed(&mut self) {
        let removed = core::mem::take(&mut self.evictable.listener_mut().0);
        for tile in removed {
            let coord = tile.coord();
            tracing::debug!(%coord, uid = tile.uid(), "tile left the evictable store");
            self.unindex(coord);
            self.emit(TileEvent::Removed(tile));
        }
    }

    fn unindex(&mut self, coord: Coord) {
        if let Some(set) = self.levels.get_mut(&coord.z()) {
            set.remove(&coord);
            if set.is_empty() {
                self.levels.remove(&coord.z());
            }
        }
    }

    fn next_uid(&mut self) -> u64 {
        let uid = self.next_uid;
        self.next_uid = if uid >= MAX_TILE_UID { 0 } else { uid + 1 };
        uid
    }

    fn emit(&mut self, event: TileEvent<D, E>) {
        if self.config.event_mask.contains(event.kind()) {
            self.events.push_back(event);
        }
    }
}
