// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle notifications emitted by a [`TileCache`](crate::TileCache).

use crate::tile::{Tile, TileId};

/// Why a successfully settled load was not committed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DiscardReason {
    /// The cache was cleared while the load was in flight.
    Stale,
    /// The layer no longer shows the tile.
    NotVisible,
}

/// What [`TileCache::settle`](crate::TileCache::settle) did with a result.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SettleOutcome {
    /// The tile was committed to the cache.
    Added,
    /// The load reported an error; nothing was committed.
    Failed,
    /// The result was dropped.
    Discarded(DiscardReason),
}

/// A tile lifecycle notification.
///
/// Tiles that leave the cache are moved into the event, so a consumer can release
/// resources derived from them (GPU textures, pick shapes) when it sees the event.
#[derive(Debug)]
pub enum TileEvent<D, E> {
    /// A load was issued.
    Requested(TileId),
    /// A load succeeded and the tile is now resident.
    Added(TileId),
    /// A load failed. The tile carries the error.
    Failed(Tile<D, E>),
    /// A load settled but its result was dropped. Stale tiles may carry an error.
    Discarded {
        /// The settled tile.
        tile: Tile<D, E>,
        /// Why it was dropped.
        reason: DiscardReason,
    },
    /// A resident tile was evicted, removed, or cleared.
    Removed(Tile<D, E>),
    /// Loads settled and nothing is pending any more. Coalesced over a time window.
    AllLoaded,
}

impl<D, E> TileEvent<D, E> {
    /// The mask bit for this kind of event.
    #[must_use]
    pub fn kind(&self) -> TileEventMask {
        match self {
            Self::Requested(_) => TileEventMask::REQUESTED,
            Self::Added(_) => TileEventMask::ADDED,
            Self::Failed(_) => TileEventMask::FAILED,
            Self::Discarded { .. } => TileEventMask::DISCARDED,
            Self::Removed(_) => TileEventMask::REMOVED,
            Self::AllLoaded => TileEventMask::ALL_LOADED,
        }
    }

    /// Identity of the affected tile. `None` for [`AllLoaded`](Self::AllLoaded).
    #[must_use]
    pub fn tile_id(&self) -> Option<TileId> {
        match self {
            Self::Requested(id) | Self::Added(id) => Some(*id),
            Self::Failed(tile) | Self::Discarded { tile, .. } | Self::Removed(tile) => {
                Some(tile.id())
            }
            Self::AllLoaded => None,
        }
    }
}

bitflags::bitflags! {
    /// Selects which [`TileEvent`] kinds a cache buffers.
    ///
    /// Events outside the mask are dropped when emitted, and tiles they would carry are
    /// dropped with them.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TileEventMask: u8 {
        /// [`TileEvent::Requested`].
        const REQUESTED  = 1 << 0;
        /// [`TileEvent::Added`].
        const ADDED      = 1 << 1;
        /// [`TileEvent::Failed`].
        const FAILED     = 1 << 2;
        /// [`TileEvent::Discarded`].
        const DISCARDED  = 1 << 3;
        /// [`TileEvent::Removed`].
        const REMOVED    = 1 << 4;
        /// [`TileEvent::AllLoaded`].
        const ALL_LOADED = 1 << 5;
    }
}

impl Default for TileEventMask {
    fn default() -> Self {
        Self::all()
    }
}
