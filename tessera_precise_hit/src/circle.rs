// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Round shapes: filled discs and annuli.

use kurbo::{Point, Rect, Vec2};

use crate::{PreciseHitTest, rects_touch};

/// A filled disc.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    /// Center of the disc.
    pub center: Point,
    /// Radius; assumed non-negative.
    pub radius: f64,
}

impl Circle {
    /// Creates a disc from its center and radius.
    #[must_use]
    pub const fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }
}

impl PreciseHitTest for Circle {
    fn bounds(&self) -> Rect {
        disc_bounds(self.center, self.radius)
    }

    fn test_point(&self, pt: Point) -> bool {
        (pt - self.center).hypot2() <= self.radius * self.radius
    }

    fn test_rect(&self, rect: Rect) -> bool {
        nearest_offset(rect, self.center).hypot2() <= self.radius * self.radius
    }
}

/// An annulus: the points between two concentric circles, both edges included.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ring {
    /// Shared center.
    pub center: Point,
    /// Radius of the hole.
    pub inner: f64,
    /// Outer radius.
    pub outer: f64,
}

impl Ring {
    /// Creates an annulus. The radii may be given in either order.
    #[must_use]
    pub fn new(center: Point, inner: f64, outer: f64) -> Self {
        let (inner, outer) = if inner <= outer {
            (inner, outer)
        } else {
            (outer, inner)
        };
        Self {
            center,
            inner,
            outer,
        }
    }
}

impl PreciseHitTest for Ring {
    fn bounds(&self) -> Rect {
        disc_bounds(self.center, self.outer)
    }

    fn test_point(&self, pt: Point) -> bool {
        let d2 = (pt - self.center).hypot2();
        d2 >= self.inner * self.inner && d2 <= self.outer * self.outer
    }

    fn test_rect(&self, rect: Rect) -> bool {
        if !rects_touch(rect, self.bounds()) {
            return false;
        }
        // The rect is connected, so it meets the band iff its nearest point is inside
        // the outer circle and its farthest point is outside the hole.
        let near = nearest_offset(rect, self.center).hypot2();
        let far = farthest_offset(rect, self.center).hypot2();
        near <= self.outer * self.outer && far >= self.inner * self.inner
    }
}

fn disc_bounds(center: Point, radius: f64) -> Rect {
    Rect::new(
        center.x - radius,
        center.y - radius,
        center.x + radius,
        center.y + radius,
    )
}

/// Offset from `pt` to the closest point of `rect`.
fn nearest_offset(rect: Rect, pt: Point) -> Vec2 {
    let r = rect.abs();
    let x = pt.x.clamp(r.x0, r.x1);
    let y = pt.y.clamp(r.y0, r.y1);
    Point::new(x, y) - pt
}

/// Offset from `pt` to the farthest corner of `rect`.
fn farthest_offset(rect: Rect, pt: Point) -> Vec2 {
    let r = rect.abs();
    let dx = (pt.x - r.x0).max(r.x1 - pt.x);
    let dy = (pt.y - r.y0).max(r.y1 - pt.y);
    Vec2::new(dx, dy)
}
