// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Box-shaped hit targets.

use kurbo::{Point, Rect};

use crate::{PreciseHitTest, rect_contains, rects_touch};

/// An axis-aligned rectangle hit target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectHit {
    /// The rectangle, in any orientation.
    pub rect: Rect,
}

impl RectHit {
    /// Creates a rectangle target.
    #[must_use]
    pub const fn new(rect: Rect) -> Self {
        Self { rect }
    }
}

impl PreciseHitTest for RectHit {
    fn bounds(&self) -> Rect {
        self.rect.abs()
    }

    fn test_point(&self, pt: Point) -> bool {
        rect_contains(self.rect, pt)
    }

    fn test_rect(&self, rect: Rect) -> bool {
        rects_touch(self.rect, rect)
    }
}

/// Fallback target that accepts every query reaching it.
///
/// The spatial index has already narrowed candidates by bounding box, so reaching the
/// exact test at all counts as a hit. Use it for entries whose exact geometry is unknown.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundsHit {
    /// Bounds the entry is indexed under.
    pub bounds: Rect,
}

impl BoundsHit {
    /// Creates a fallback target with the given bounds.
    #[must_use]
    pub const fn new(bounds: Rect) -> Self {
        Self { bounds }
    }
}

impl PreciseHitTest for BoundsHit {
    fn bounds(&self) -> Rect {
        self.bounds.abs()
    }

    fn test_point(&self, pt: Point) -> bool {
        rect_contains(self.bounds, pt)
    }

    fn test_rect(&self, rect: Rect) -> bool {
        rects_touch(self.bounds, rect)
    }
}
