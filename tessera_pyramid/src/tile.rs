// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tiles, load tickets, and the layer that loads them.

use kurbo::Point;

use crate::coord::Coord;

/// Identity of one load attempt: the coordinate plus a per-cache unique id.
///
/// Requesting the same coordinate again after a [`clear`](crate::TileCache::clear)
/// yields a new `uid`, so late results of the old attempt can be told apart.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TileId {
    /// Normalized coordinate.
    pub coord: Coord,
    /// Load attempt id.
    pub uid: u64,
}

/// A unit of cached content.
///
/// A tile is created when its load is issued, settled exactly once with either
/// `data` or `error`, and never changed afterwards.
#[derive(Debug)]
pub struct Tile<D, E> {
    id: TileId,
    data: Option<D>,
    error: Option<E>,
}

impl<D, E> Tile<D, E> {
    pub(crate) fn pending(id: TileId) -> Self {
        Self {
            id,
            data: None,
            error: None,
        }
    }

    pub(crate) fn settle(&mut self, result: Result<D, E>) {
        debug_assert!(
            self.data.is_none() && self.error.is_none(),
            "tile settled twice"
        );
        match result {
            Ok(data) => self.data = Some(data),
            Err(error) => self.error = Some(error),
        }
    }

    /// Identity of this load attempt.
    #[must_use]
    pub fn id(&self) -> TileId {
        self.id
    }

    /// Normalized coordinate.
    #[must_use]
    pub fn coord(&self) -> Coord {
        self.id.coord
    }

    /// Load attempt id.
    #[must_use]
    pub fn uid(&self) -> u64 {
        self.id.uid
    }

    /// Loaded payload, if the load succeeded.
    #[must_use]
    pub fn data(&self) -> Option<&D> {
        self.data.as_ref()
    }

    /// Load error, if the load failed.
    #[must_use]
    pub fn error(&self) -> Option<&E> {
        self.error.as_ref()
    }

    /// Consumes the tile, returning its payload.
    pub fn into_data(self) -> Option<D> {
        self.data
    }
}

/// Proof of an outstanding load, handed to [`TileLayer::request_tile`].
///
/// The ticket is not `Clone`; passing it back to [`TileCache::settle`] consumes it,
/// so every load settles at most once.
///
/// [`TileCache::settle`]: crate::TileCache::settle
#[derive(Debug, PartialEq, Eq, Hash)]
#[must_use = "a ticket must be settled through `TileCache::settle`"]
pub struct LoadTicket {
    pub(crate) id: TileId,
}

impl LoadTicket {
    /// Identity of the load attempt.
    pub fn id(&self) -> TileId {
        self.id
    }

    /// Coordinate to load. Always normalized.
    pub fn coord(&self) -> Coord {
        self.id.coord
    }
}

/// The host side of a tile cache: loads tiles and describes the current view.
pub trait TileLayer {
    /// Starts loading the ticket's tile.
    ///
    /// The host must eventually pass the ticket back to
    /// [`TileCache::settle`](crate::TileCache::settle) exactly once, with either the
    /// payload or an error. There is no timeout.
    fn request_tile(&mut self, ticket: LoadTicket);

    /// Returns `true` if `coord` still belongs to the view being loaded.
    ///
    /// Consulted when a load succeeds; invisible tiles are discarded.
    fn is_tile_visible(&self, coord: Coord) -> bool;

    /// Center of the current view in the unit plane (see [`Coord::center`]).
    ///
    /// Requests are issued nearest to this point first.
    fn view_center(&self) -> Point;
}
