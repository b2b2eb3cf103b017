#![forbid(unsafe_code)]

//! Geometric primitives and the curve-space ↔ display-space transform.
//!
//! Two coordinate systems are involved:
//!
//! - **curve space**: `(position, value)`, y grows upwards.
//! - **display space**: a `width × height` surface, origin top-left, y grows
//!   downwards.
//!
//! ```text
//! display_x = (x - min_x) / (max_x - min_x) * width
//! display_y = height - (y - min_y) / (max_y - min_y) * height
//! ```
//!
//! The *normalized* variants drop the origin term and are meant for deltas
//! (drag offsets), where only the scale matters.

use std::ops::{Add, Mul, Neg, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Smallest extent a view range is allowed to have.
const MIN_EXTENT: f32 = 1e-6;

/// A 2D point or vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component.
    pub y: f32,
}

impl Point {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a point.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length when used as a vector.
    #[inline]
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Unit vector in the same direction, or zero for a zero vector.
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len <= f32::EPSILON {
            Self::ZERO
        } else {
            Self::new(self.x / len, self.y / len)
        }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<f32> for Point {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// Size of the display surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Size {
    /// Width in display units (pixels).
    pub width: f32,
    /// Height in display units (pixels).
    pub height: f32,
}

impl Size {
    /// Create a size.
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle for selection boxes and hit extents.
///
/// Edges are inclusive so that a zero-size box still hits what it touches.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge (smallest y).
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// Create a rectangle.
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanned by two opposite corners in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    /// Square of half-size `extent` centered on `center`.
    pub fn centered(center: Point, extent: f32) -> Self {
        Self::new(
            center.x - extent,
            center.y - extent,
            extent * 2.0,
            extent * 2.0,
        )
    }

    /// Left edge.
    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Top edge.
    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Check if a point is inside the rectangle (edges included).
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Check if two rectangles overlap or touch.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() <= other.right()
            && other.left() <= self.right()
            && self.top() <= other.bottom()
            && other.top() <= self.bottom()
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.left().min(other.left());
        let y = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }
}

/// Linear map between a curve-space window and a display surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    min: Point,
    max: Point,
    size: Size,
}

impl ViewTransform {
    /// Map the curve-space window `[min, max]` onto a surface of `size`.
    ///
    /// Degenerate or inverted ranges are widened to a tiny positive extent.
    pub fn new(min: Point, max: Point, size: Size) -> Self {
        let lo = Point::new(min.x.min(max.x), min.y.min(max.y));
        let mut hi = Point::new(min.x.max(max.x), min.y.max(max.y));
        if hi.x - lo.x < MIN_EXTENT {
            hi.x = lo.x + MIN_EXTENT;
        }
        if hi.y - lo.y < MIN_EXTENT {
            hi.y = lo.y + MIN_EXTENT;
        }
        Self { min: lo, max: hi, size }
    }

    /// Frame the curve-space box `[min, max]` with a fractional margin on
    /// every side (e.g. `0.1` adds 10% of the range).
    pub fn fit(min: Point, max: Point, size: Size, margin: f32) -> Self {
        let dx = (max.x - min.x).abs().max(1.0) * margin;
        let dy = (max.y - min.y).abs().max(1.0) * margin;
        Self::new(
            Point::new(min.x - dx, min.y - dy),
            Point::new(max.x + dx, max.y + dy),
            size,
        )
    }

    /// Lower-left corner of the visible window (curve space).
    #[inline]
    pub fn min(&self) -> Point {
        self.min
    }

    /// Upper-right corner of the visible window (curve space).
    #[inline]
    pub fn max(&self) -> Point {
        self.max
    }

    /// Display surface size.
    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    #[inline]
    fn range(&self) -> Point {
        self.max - self.min
    }

    /// Curve space → display space.
    pub fn to_display(&self, p: Point) -> Point {
        let r = self.range();
        Point::new(
            (p.x - self.min.x) / r.x * self.size.width,
            self.size.height - (p.y - self.min.y) / r.y * self.size.height,
        )
    }

    /// Display space → curve space.
    pub fn to_curve(&self, p: Point) -> Point {
        let r = self.range();
        Point::new(
            p.x / self.size.width * r.x + self.min.x,
            (self.size.height - p.y) / self.size.height * r.y + self.min.y,
        )
    }

    /// Curve-space delta → display-space delta.
    pub fn to_display_normalized(&self, d: Point) -> Point {
        let r = self.range();
        Point::new(d.x / r.x * self.size.width, -d.y / r.y * self.size.height)
    }

    /// Display-space delta → curve-space delta.
    pub fn to_curve_normalized(&self, d: Point) -> Point {
        let r = self.range();
        Point::new(d.x / self.size.width * r.x, -d.y / self.size.height * r.y)
    }

    /// Curve-space `(min, max)` corners of a display rectangle.
    pub fn curve_box(&self, rect: &Rect) -> (Point, Point) {
        let a = self.to_curve(Point::new(rect.left(), rect.bottom()));
        let b = self.to_curve(Point::new(rect.right(), rect.top()));
        (a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
    }

    fn view() -> ViewTransform {
        ViewTransform::new(
            Point::new(0.0, -1.0),
            Point::new(10.0, 1.0),
            Size::new(200.0, 100.0),
        )
    }

    #[test]
    fn to_display_inverts_y() {
        let v = view();
        assert_eq!(v.to_display(Point::new(0.0, -1.0)), Point::new(0.0, 100.0));
        assert_eq!(v.to_display(Point::new(10.0, 1.0)), Point::new(200.0, 0.0));
        assert_eq!(v.to_display(Point::new(5.0, 0.0)), Point::new(100.0, 50.0));
    }

    #[test]
    fn to_curve_is_inverse() {
        let v = view();
        for p in [Point::new(1.5, 0.25), Point::new(9.0, -0.75), Point::new(-3.0, 4.0)] {
            assert!(approx(v.to_curve(v.to_display(p)), p));
        }
    }

    #[test]
    fn normalized_ignores_origin() {
        let v = view();
        let d = v.to_display_normalized(Point::new(1.0, 0.5));
        assert!(approx(d, Point::new(20.0, -25.0)));
        assert!(approx(v.to_curve_normalized(d), Point::new(1.0, 0.5)));
    }

    #[test]
    fn degenerate_range_is_widened() {
        let v = ViewTransform::new(
            Point::new(1.0, 1.0),
            Point::new(1.0, 1.0),
            Size::new(10.0, 10.0),
        );
        let p = v.to_display(Point::new(1.0, 1.0));
        assert!(p.x.is_finite() && p.y.is_finite());
    }

    #[test]
    fn curve_box_orders_corners() {
        let v = view();
        let (lo, hi) = v.curve_box(&Rect::new(0.0, 0.0, 100.0, 50.0));
        assert!(approx(lo, Point::new(0.0, 0.0)));
        assert!(approx(hi, Point::new(5.0, 1.0)));
    }

    #[test]
    fn rect_intersection_includes_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(10.0, 10.0, 5.0, 5.0)));
        assert!(!a.intersects(&Rect::new(10.5, 0.0, 5.0, 5.0)));
        assert!(a.contains(Point::new(10.0, 0.0)));
    }

    #[test]
    fn from_corners_normalizes() {
        let r = Rect::from_corners(Point::new(5.0, 8.0), Point::new(1.0, 2.0));
        assert_eq!(r, Rect::new(1.0, 2.0, 4.0, 6.0));
    }

    #[test]
    fn fit_adds_margin() {
        let v = ViewTransform::fit(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Size::new(1.0, 1.0),
            0.1,
        );
        assert!(approx(v.min(), Point::new(-1.0, -1.0)));
        assert!(approx(v.max(), Point::new(11.0, 11.0)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn value_types_serialize_as_fields() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        let json = serde_json::to_value(r).unwrap();
        assert_eq!(json["width"], 3.0);
        assert_eq!(serde_json::from_value::<Rect>(json).unwrap(), r);

        let p: Point = serde_json::from_str(r#"{"x":0.5,"y":-2.0}"#).unwrap();
        assert_eq!(p, Point::new(0.5, -2.0));
    }
}
