// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tessera Precise Hit: exact shape tests used after bounding-box narrowing.
//!
//! A spatial index only knows about boxes. When a candidate comes back from a box query,
//! the caller asks the shape itself whether the query really touches it, through
//! [`PreciseHitTest`]:
//!
//! - [`bounds`](PreciseHitTest::bounds): the box to index the shape under.
//! - [`test_point`](PreciseHitTest::test_point): exact point containment.
//! - [`test_rect`](PreciseHitTest::test_rect): exact rectangle overlap.
//!
//! The built-in shapes are [`Circle`], [`Ring`] (an annulus), [`RectHit`], and
//! [`BoundsHit`], a fallback that accepts anything its bounds accept. [`Shape`] is the
//! closed enum over all of them for callers that store mixed sets.
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use tessera_precise_hit::{Circle, PreciseHitTest, Shape};
//!
//! let dot = Shape::from(Circle::new(Point::new(10.0, 10.0), 5.0));
//! assert_eq!(dot.bounds(), Rect::new(5.0, 5.0, 15.0, 15.0));
//!
//! // Inside the bounding box, but outside the circle.
//! assert!(!dot.test_point(Point::new(5.5, 5.5)));
//! assert!(dot.test_point(Point::new(10.0, 13.0)));
//! ```
//!
//! All boundaries are inclusive. Inputs are assumed finite.
//!
//! This crate is `no_std`.

#![no_std]

use kurbo::{Point, Rect};

mod circle;
mod rect;

pub use circle::{Circle, Ring};
pub use rect::{BoundsHit, RectHit};

/// Exact hit testing for a shape in its own coordinate space.
pub trait PreciseHitTest {
    /// Axis-aligned box enclosing the shape.
    fn bounds(&self) -> Rect;

    /// Returns `true` if `pt` lies on or inside the shape.
    fn test_point(&self, pt: Point) -> bool;

    /// Returns `true` if `rect` overlaps the shape.
    fn test_rect(&self, rect: Rect) -> bool;
}

/// Any of the built-in shapes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    /// A filled disc.
    Circle(Circle),
    /// An annulus.
    Ring(Ring),
    /// An axis-aligned rectangle.
    Rect(RectHit),
    /// Anything inside its bounds.
    Bounds(BoundsHit),
}

impl PreciseHitTest for Shape {
    fn bounds(&self) -> Rect {
        match self {
            Self::Circle(s) => s.bounds(),
            Self::Ring(s) => s.bounds(),
            Self::Rect(s) => s.bounds(),
            Self::Bounds(s) => s.bounds(),
        }
    }

    fn test_point(&self, pt: Point) -> bool {
        match self {
            Self::Circle(s) => s.test_point(pt),
            Self::Ring(s) => s.test_point(pt),
            Self::Rect(s) => s.test_point(pt),
            Self::Bounds(s) => s.test_point(pt),
        }
    }

    fn test_rect(&self, rect: Rect) -> bool {
        match self {
            Self::Circle(s) => s.test_rect(rect),
            Self::Ring(s) => s.test_rect(rect),
            Self::Rect(s) => s.test_rect(rect),
            Self::Bounds(s) => s.test_rect(rect),
        }
    }
}

impl From<Circle> for Shape {
    fn from(s: Circle) -> Self {
        Self::Circle(s)
    }
}

impl From<Ring> for Shape {
    fn from(s: Ring) -> Self {
        Self::Ring(s)
    }
}

impl From<RectHit> for Shape {
    fn from(s: RectHit) -> Self {
        Self::Rect(s)
    }
}

impl From<BoundsHit> for Shape {
    fn from(s: BoundsHit) -> Self {
        Self::Bounds(s)
    }
}

/// Inclusive point-in-rect test. `Rect::contains` is half-open.
pub(crate) fn rect_contains(rect: Rect, pt: Point) -> bool {
    let r = rect.abs();
    pt.x >= r.x0 && pt.x <= r.x1 && pt.y >= r.y0 && pt.y <= r.y1
}

/// Inclusive rect overlap; rectangles that share an edge overlap.
pub(crate) fn rects_touch(a: Rect, b: Rect) -> bool {
    let (a, b) = (a.abs(), b.abs());
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}
