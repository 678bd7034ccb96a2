// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tile cache configuration.

use core::fmt;

use crate::coord::Coord;
use crate::events::TileEventMask;

/// Settings for a [`TileCache`](crate::TileCache).
///
/// ```
/// use tessera_pyramid::{TileCacheConfig, TileEventMask};
///
/// let config = TileCacheConfig::default()
///     .with_capacity(64)
///     .with_persistent_levels(1)
///     .with_event_mask(TileEventMask::ADDED | TileEventMask::REMOVED);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.total_capacity(), Some(65));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileCacheConfig {
    /// Maximum number of resident tiles at levels `>= persistent_levels`.
    pub capacity: usize,
    /// Levels `0..persistent_levels` are never evicted.
    pub persistent_levels: u32,
    /// How many levels below the target the LOD search may look for descendants.
    ///
    /// At most [`MAX_DESCENDANT_DEPTH`](Self::MAX_DESCENDANT_DEPTH); a search at depth
    /// `d` may visit `4^d` tiles.
    pub max_descendant_depth: u32,
    /// Coalescing window for [`TileEvent::AllLoaded`](crate::TileEvent::AllLoaded).
    pub all_loaded_window_ms: u64,
    /// Event kinds to buffer.
    pub event_mask: TileEventMask,
}

impl Default for TileCacheConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            persistent_levels: 2,
            max_descendant_depth: 3,
            all_loaded_window_ms: 200,
            event_mask: TileEventMask::all(),
        }
    }
}

impl TileCacheConfig {
    /// Deepest allowed [`max_descendant_depth`](Self::max_descendant_depth).
    pub const MAX_DESCENDANT_DEPTH: u32 = 8;

    /// Sets [`capacity`](Self::capacity).
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets [`persistent_levels`](Self::persistent_levels).
    #[must_use]
    pub fn with_persistent_levels(mut self, levels: u32) -> Self {
        self.persistent_levels = levels;
        self
    }

    /// Sets [`max_descendant_depth`](Self::max_descendant_depth).
    #[must_use]
    pub fn with_max_descendant_depth(mut self, depth: u32) -> Self {
        self.max_descendant_depth = depth;
        self
    }

    /// Sets [`all_loaded_window_ms`](Self::all_loaded_window_ms).
    #[must_use]
    pub fn with_all_loaded_window_ms(mut self, window: u64) -> Self {
        self.all_loaded_window_ms = window;
        self
    }

    /// Sets [`event_mask`](Self::event_mask).
    #[must_use]
    pub fn with_event_mask(mut self, mask: TileEventMask) -> Self {
        self.event_mask = mask;
        self
    }

    /// Number of tiles the persistent levels can hold: `Σ 4^i` for `i < persistent_levels`.
    ///
    /// `None` on overflow.
    #[must_use]
    pub fn persistent_capacity(&self) -> Option<usize> {
        // (4^P - 1) / 3
        4_usize
            .checked_pow(self.persistent_levels)
            .map(|n| (n - 1) / 3)
    }

    /// Upper bound on resident tiles. `None` on overflow.
    #[must_use]
    pub fn total_capacity(&self) -> Option<usize> {
        self.persistent_capacity()?.checked_add(self.capacity)
    }

    /// Checks the settings for values a cache cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.all_loaded_window_ms == 0 {
            return Err(ConfigError::ZeroThrottleWindow);
        }
        if self.persistent_levels > Coord::MAX_ZOOM + 1 || self.total_capacity().is_none() {
            return Err(ConfigError::PersistentLevelsTooDeep {
                levels: self.persistent_levels,
            });
        }
        if self.max_descendant_depth > Self::MAX_DESCENDANT_DEPTH {
            return Err(ConfigError::DescendantDepthTooDeep {
                depth: self.max_descendant_depth,
            });
        }
        Ok(())
    }
}

/// A [`TileCacheConfig`] that cannot be used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `capacity` is zero.
    ZeroCapacity,
    /// `all_loaded_window_ms` is zero.
    ZeroThrottleWindow,
    /// The persistent levels hold more tiles than can be counted.
    PersistentLevelsTooDeep {
        /// The configured level count.
        levels: u32,
    },
    /// `max_descendant_depth` exceeds [`TileCacheConfig::MAX_DESCENDANT_DEPTH`].
    DescendantDepthTooDeep {
        /// The configured depth.
        depth: u32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCapacity => f.write_str("tile cache capacity must be at least 1"),
            Self::ZeroThrottleWindow => f.write_str("all-loaded window must be at least 1ms"),
            Self::PersistentLevelsTooDeep { levels } => {
                write!(f, "{levels} persistent levels overflow the tile count")
            }
            Self::DescendantDepthTooDeep { depth } => write!(
                f,
                "descendant search depth {depth} exceeds {}",
                TileCacheConfig::MAX_DESCENDANT_DEPTH
            ),
        }
    }
}

impl core::error::Error for ConfigError {}
