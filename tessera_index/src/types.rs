// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scalar abstraction and the axis-aligned bounding box type.

use core::fmt::Debug;
use core::ops::{Add, Mul, Sub};

/// Coordinate type stored in the index.
///
/// Implemented for `f32`, `f64` and `i64`. Area and margin computations are carried
/// out in a widened accumulator (`f32`→`f64`, `i64`→`i128`) so that split heuristics
/// compare robustly.
pub trait Scalar: Copy + PartialOrd + Debug + Add<Output = Self> + Sub<Output = Self> {
    /// Widened type used for areas and sums.
    type Acc: Copy
        + PartialOrd
        + Debug
        + Add<Output = Self::Acc>
        + Sub<Output = Self::Acc>
        + Mul<Output = Self::Acc>;

    /// Additive identity.
    const ZERO: Self;

    /// Additive identity of the accumulator.
    const ACC_ZERO: Self::Acc;

    /// Converts into the accumulator type.
    fn widen(self) -> Self::Acc;
}

impl Scalar for f32 {
    type Acc = f64;
    const ZERO: Self = 0.0;
    const ACC_ZERO: f64 = 0.0;

    #[inline]
    fn widen(self) -> f64 {
        f64::from(self)
    }
}

impl Scalar for f64 {
    type Acc = Self;
    const ZERO: Self = 0.0;
    const ACC_ZERO: Self = 0.0;

    #[inline]
    fn widen(self) -> Self {
        self
    }
}

impl Scalar for i64 {
    type Acc = i128;
    const ZERO: Self = 0;
    const ACC_ZERO: i128 = 0;

    #[inline]
    fn widen(self) -> i128 {
        i128::from(self)
    }
}

#[inline]
fn min<T: PartialOrd>(a: T, b: T) -> T {
    if b < a { b } else { a }
}

#[inline]
fn max<T: PartialOrd>(a: T, b: T) -> T {
    if b > a { b } else { a }
}

/// Axis-aligned bounding box with inclusive edges.
///
/// Float inputs are assumed to be finite. A box with `min > max` on either axis is
/// empty; [`Aabb2D::intersect`] produces such boxes for disjoint inputs.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2D<T> {
    /// Minimum x.
    pub min_x: T,
    /// Minimum y.
    pub min_y: T,
    /// Maximum x.
    pub max_x: T,
    /// Maximum y.
    pub max_y: T,
}

impl<T: Scalar> Aabb2D<T> {
    /// Creates a box from its corners.
    #[inline]
    pub const fn new(min_x: T, min_y: T, max_x: T, max_y: T) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Creates a box from an origin and a size.
    #[inline]
    pub fn from_xywh(x: T, y: T, width: T, height: T) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Degenerate box covering a single point.
    #[inline]
    pub const fn point(x: T, y: T) -> Self {
        Self::new(x, y, x, y)
    }

    /// Returns `true` if the box has `min > max` on either axis.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Returns `true` if `(x, y)` lies inside or on the edge of the box.
    #[inline]
    pub fn contains_point(&self, x: T, y: T) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Returns `true` if `other` lies entirely inside this box.
    #[inline]
    pub fn contains(&self, other: &Self) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    /// Returns `true` if the boxes share at least one point.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        other.min_x <= self.max_x
            && other.max_x >= self.min_x
            && other.min_y <= self.max_y
            && other.max_y >= self.min_y
    }

    /// Intersection of the two boxes; empty if they are disjoint.
    #[inline]
    pub fn intersect(&self, other: &Self) -> Self {
        Self::new(
            max(self.min_x, other.min_x),
            max(self.min_y, other.min_y),
            min(self.max_x, other.max_x),
            min(self.max_y, other.max_y),
        )
    }

    /// Smallest box containing both boxes.
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(
            min(self.min_x, other.min_x),
            min(self.min_y, other.min_y),
            max(self.max_x, other.max_x),
            max(self.max_y, other.max_y),
        )
    }

    /// Area in the widened accumulator; zero for empty boxes.
    #[inline]
    pub fn area(&self) -> T::Acc {
        if self.is_empty() {
            return T::ACC_ZERO;
        }
        (self.max_x.widen() - self.min_x.widen()) * (self.max_y.widen() - self.min_y.widen())
    }

    /// Half perimeter in the widened accumulator.
    #[inline]
    pub fn margin(&self) -> T::Acc {
        (self.max_x.widen() - self.min_x.widen()) + (self.max_y.widen() - self.min_y.widen())
    }

    /// Doubled center on the x axis, used as a sort key without division.
    #[inline]
    pub(crate) fn center_x2(&self) -> T::Acc {
        self.min_x.widen() + self.max_x.widen()
    }

    /// Doubled center on the y axis, used as a sort key without division.
    #[inline]
    pub(crate) fn center_y2(&self) -> T::Acc {
        self.min_y.widen() + self.max_y.widen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment_is_edge_inclusive() {
        let a = Aabb2D::<f64>::from_xywh(0.0, 0.0, 10.0, 10.0);
        assert!(a.contains_point(0.0, 0.0));
        assert!(a.contains_point(10.0, 10.0));
        assert!(!a.contains_point(10.5, 5.0));
        assert!(a.contains(&Aabb2D::new(2.0, 2.0, 3.0, 3.0)));
    }

    #[test]
    fn disjoint_intersection_is_empty() {
        let a = Aabb2D::<i64>::new(0, 0, 5, 5);
        let b = Aabb2D::<i64>::new(6, 6, 8, 8);
        assert!(!a.intersects(&b));
        assert!(a.intersect(&b).is_empty());
        assert_eq!(a.intersect(&b).area(), 0);
        assert_eq!(a.union(&b), Aabb2D::new(0, 0, 8, 8));
    }

    #[test]
    fn area_and_margin_widen() {
        let a = Aabb2D::<f32>::from_xywh(1.0, 1.0, 2.0, 3.0);
        assert_eq!(a.area(), 6.0_f64);
        assert_eq!(a.margin(), 5.0_f64);
        let big = Aabb2D::<i64>::new(0, 0, i64::MAX / 2, i64::MAX / 2);
        assert!(big.area() > i128::from(i64::MAX));
    }
}
