//! Geometric primitives: points, sizes and rectangles.
//!
//! Every integer rectangle in Mobicomp is half-open: a [`RectInt`] with origin
//! `(x, y)` and size `(w, h)` covers the pixels `[x, x + w) × [y, y + h)`.
//! [`RectInt::right`] and [`RectInt::bottom`] therefore return exclusive bounds.
//! Conversions to other conventions happen only at crate boundaries (see
//! `mobicomp_buffer_manager::NativeRect`).

use num_traits::{Num, Zero};
use serde::{Deserialize, Serialize};
use std::ops::Mul;

// --- Generic Size<T> ---

/// Represents a 2D size (width and height) with generic dimensions.
///
/// Used for physical measurements such as a display's size in millimetres,
/// where the integer types below do not fit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize + Num + Copy",
    deserialize = "T: Deserialize<'de> + Num + Copy"
))]
pub struct Size<T: Num + Copy> {
    /// The width component of the size.
    pub width: T,
    /// The height component of the size.
    pub height: T,
}

impl<T: Num + Copy> Size<T> {
    /// Creates a new size with the given width and height.
    pub const fn new(width: T, height: T) -> Self {
        Size { width, height }
    }

    /// Calculates the area of the size (width * height).
    pub fn area(&self) -> T
    where
        T: Mul<Output = T>,
    {
        self.width * self.height
    }

    /// Checks if the area is zero (width or height is zero).
    pub fn is_empty(&self) -> bool
    where
        T: Zero + PartialEq,
    {
        self.width.is_zero() || self.height.is_zero()
    }
}

// --- Integer-specific PointInt, SizeInt, RectInt ---

/// An integer point with `i32` coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PointInt {
    pub x: i32,
    pub y: i32,
}

impl PointInt {
    /// Creates a new `PointInt`.
    pub const fn new(x: i32, y: i32) -> Self {
        PointInt { x, y }
    }
}

/// An integer size with `u32` dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SizeInt {
    pub width: u32,
    pub height: u32,
}

impl SizeInt {
    /// Creates a new `SizeInt`.
    pub const fn new(width: u32, height: u32) -> Self {
        SizeInt { width, height }
    }

    /// Checks if the area is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// An integer rectangle with `i32` origin and `u32` size, half-open on the
/// right and bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RectInt {
    /// The origin point (top-left corner) of the rectangle.
    pub origin: PointInt,
    /// The size (width and height) of the rectangle.
    pub size: SizeInt,
}

impl RectInt {
    /// The empty rectangle at the origin.
    pub const EMPTY: RectInt = RectInt::from_coords(0, 0, 0, 0);

    /// Creates a new `RectInt` from an origin point and a size.
    pub const fn new(origin: PointInt, size: SizeInt) -> Self {
        RectInt { origin, size }
    }

    /// Creates a new `RectInt` from individual coordinate and dimension values.
    pub const fn from_coords(x: i32, y: i32, width: u32, height: u32) -> Self {
        RectInt {
            origin: PointInt::new(x, y),
            size: SizeInt::new(width, height),
        }
    }

    /// Creates a rectangle at `(0, 0)` covering `size`.
    pub const fn from_size(size: SizeInt) -> Self {
        RectInt { origin: PointInt::new(0, 0), size }
    }

    /// Creates a `RectInt` from its left/top (inclusive) and right/bottom
    /// (exclusive) edges. Inverted edges yield an empty rectangle.
    pub fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        let width = right.saturating_sub(left).max(0) as u32;
        let height = bottom.saturating_sub(top).max(0) as u32;
        RectInt::from_coords(left, top, width, height)
    }

    /// Returns the x-coordinate of the rectangle's origin.
    pub fn x(&self) -> i32 { self.origin.x }
    /// Returns the y-coordinate of the rectangle's origin.
    pub fn y(&self) -> i32 { self.origin.y }
    /// Returns the width of the rectangle.
    pub fn width(&self) -> u32 { self.size.width }
    /// Returns the height of the rectangle.
    pub fn height(&self) -> u32 { self.size.height }

    /// Returns the y-coordinate of the top edge.
    pub fn top(&self) -> i32 { self.origin.y }
    /// Returns the x-coordinate of the left edge.
    pub fn left(&self) -> i32 { self.origin.x }

    /// Exclusive x-coordinate of the right edge.
    pub fn right(&self) -> i32 {
        self.origin.x.saturating_add(self.size.width as i32)
    }

    /// Exclusive y-coordinate of the bottom edge.
    pub fn bottom(&self) -> i32 {
        self.origin.y.saturating_add(self.size.height as i32)
    }

    /// Returns the top-left corner.
    pub fn top_left(&self) -> PointInt {
        self.origin
    }

    /// Checks if a point is contained within the rectangle.
    /// Edges are inclusive for left/top, exclusive for right/bottom.
    pub fn contains_point(&self, point: PointInt) -> bool {
        point.x >= self.left() && point.x < self.right() &&
        point.y >= self.top() && point.y < self.bottom()
    }

    /// Checks if `other` lies entirely inside this rectangle. An empty `other`
    /// is contained in every rectangle.
    pub fn contains_rect(&self, other: &RectInt) -> bool {
        if other.is_empty() {
            return true;
        }
        other.left() >= self.left() && other.right() <= self.right() &&
        other.top() >= self.top() && other.bottom() <= self.bottom()
    }

    /// Checks if this rectangle intersects with another `RectInt`.
    pub fn intersects(&self, other: &RectInt) -> bool {
        self.left() < other.right() && self.right() > other.left() &&
        self.top() < other.bottom() && self.bottom() > other.top()
    }

    /// Calculates the intersection of this rectangle with another `RectInt`.
    /// Returns `None` if they do not intersect.
    pub fn intersection(&self, other: &RectInt) -> Option<RectInt> {
        let x1 = self.left().max(other.left());
        let y1 = self.top().max(other.top());
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        if x1 < x2 && y1 < y2 {
            Some(RectInt::from_coords(x1, y1, (x2 - x1) as u32, (y2 - y1) as u32))
        } else {
            None
        }
    }

    /// Intersection that collapses to [`RectInt::EMPTY`] when the rectangles
    /// are disjoint.
    pub fn intersected(&self, other: &RectInt) -> RectInt {
        self.intersection(other).unwrap_or(RectInt::EMPTY)
    }

    /// Calculates the smallest rectangle that contains both rectangles.
    ///
    /// Empty rectangles do not contribute: the union of an empty rectangle and
    /// `r` is `r`, wherever the empty one is located.
    pub fn union(&self, other: &RectInt) -> RectInt {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        let x1 = self.left().min(other.left());
        let y1 = self.top().min(other.top());
        let x2 = self.right().max(other.right());
        let y2 = self.bottom().max(other.bottom());

        RectInt::from_coords(x1, y1, (x2 - x1) as u32, (y2 - y1) as u32)
    }

    /// Checks if the rectangle has zero width or height.
    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Translates the rectangle by a given delta (dx, dy).
    /// Uses saturating arithmetic to prevent overflow.
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        RectInt::from_coords(
            self.origin.x.saturating_add(dx),
            self.origin.y.saturating_add(dy),
            self.size.width,
            self.size.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use static_assertions::assert_impl_all;

    assert_impl_all!(PointInt: std::fmt::Debug, Clone, Copy, PartialEq, Eq, std::hash::Hash, Default, Serialize, Send, Sync);
    assert_impl_all!(SizeInt: std::fmt::Debug, Clone, Copy, PartialEq, Eq, std::hash::Hash, Default, Serialize, Send, Sync);
    assert_impl_all!(RectInt: std::fmt::Debug, Clone, Copy, PartialEq, Eq, std::hash::Hash, Default, Serialize, Send, Sync);
    assert_impl_all!(Size<f64>: std::fmt::Debug, Clone, Copy, PartialEq, Default, Send, Sync);

    #[test]
    fn size_area_and_empty() {
        let s = Size::new(50.0_f64, 71.0);
        assert_eq!(s.area(), 3550.0);
        assert!(!s.is_empty());
        assert!(Size::new(0.0_f64, 3.0).is_empty());
    }

    #[test]
    fn rect_int_edges_are_exclusive() {
        let r = RectInt::from_coords(10, 20, 30, 40);
        assert_eq!(r.right(), 40);
        assert_eq!(r.bottom(), 60);
        assert!(r.contains_point(PointInt::new(39, 59)));
        assert!(!r.contains_point(PointInt::new(40, 59)));
        assert!(!r.contains_point(PointInt::new(39, 60)));
    }

    #[test]
    fn rect_int_from_edges() {
        assert_eq!(RectInt::from_edges(1, 2, 11, 7), RectInt::from_coords(1, 2, 10, 5));
        assert!(RectInt::from_edges(5, 5, 1, 9).is_empty());
    }

    #[test]
    fn rect_int_intersection() {
        let a = RectInt::from_coords(0, 0, 50, 50);
        let b = RectInt::from_coords(25, 25, 50, 50);
        assert_eq!(a.intersection(&b), Some(RectInt::from_coords(25, 25, 25, 25)));

        // Touching edges do not intersect under the half-open convention.
        let c = RectInt::from_coords(50, 0, 10, 10);
        assert!(!a.intersects(&c));
        assert_eq!(a.intersection(&c), None);
        assert_eq!(a.intersected(&c), RectInt::EMPTY);
    }

    #[test]
    fn rect_int_union_ignores_empty() {
        let a = RectInt::from_coords(10, 10, 5, 5);
        let far_empty = RectInt::from_coords(-100, -100, 0, 0);
        assert_eq!(a.union(&far_empty), a);
        assert_eq!(far_empty.union(&a), a);

        let b = RectInt::from_coords(20, 0, 5, 5);
        assert_eq!(a.union(&b), RectInt::from_coords(10, 0, 15, 15));
    }

    #[test]
    fn rect_int_union_is_idempotent() {
        let a = RectInt::from_coords(3, 4, 10, 10);
        assert_eq!(a.union(&a), a);
        let inner = RectInt::from_coords(5, 5, 2, 2);
        assert_eq!(a.union(&inner), a);
    }

    #[test]
    fn rect_int_contains_rect() {
        let outer = RectInt::from_coords(0, 0, 100, 100);
        assert!(outer.contains_rect(&RectInt::from_coords(0, 0, 100, 100)));
        assert!(outer.contains_rect(&RectInt::from_coords(90, 90, 10, 10)));
        assert!(!outer.contains_rect(&RectInt::from_coords(95, 95, 10, 10)));
        assert!(outer.contains_rect(&RectInt::EMPTY));
    }

    #[test]
    fn rect_int_translate() {
        let r = RectInt::from_coords(10, 20, 30, 40);
        let translated = r.translate(5, -5);
        assert_eq!(translated, RectInt::from_coords(15, 15, 30, 40));

        let r_max = RectInt::from_coords(i32::MAX - 5, i32::MAX - 5, 10, 10);
        let translated_max = r_max.translate(10, 10);
        assert_eq!(translated_max.x(), i32::MAX);
        assert_eq!(translated_max.y(), i32::MAX);
    }

    #[test]
    fn rect_int_serde_round_trip() {
        let r = RectInt::from_coords(0, 0, 320, 455);
        let json = serde_json::to_string(&r).unwrap();
        let back: RectInt = serde_json::from_str(&json).unwrap();
        assert_eq!(r, back);
    }
}
