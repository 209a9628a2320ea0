#![forbid(unsafe_code)]

//! Geometric primitives for pointer kinematics and hit testing.
//!
//! Coordinates are plane coordinates in host units (CSS pixels, physical
//! pixels, cells): the engine never assumes a particular unit, it only
//! requires that every event fed to one arbiter uses the same one.

/// A point in the input plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// The origin `(0, 0)`.
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Create a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Angle of the vector `self -> other`, in radians, in `(-PI, PI]`.
    #[inline]
    #[must_use]
    pub fn angle_to(self, other: Self) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Arithmetic mean of a set of points.
    ///
    /// Returns `None` for an empty set.
    #[must_use]
    pub fn centroid<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        let mut count = 0_u32;
        let mut sum = Self::ORIGIN;
        for p in points {
            sum.x += p.x;
            sum.y += p.y;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        let n = f64::from(count);
        Some(Self::new(sum.x / n, sum.y / n))
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle used as an attachment surface.
///
/// Containment is half-open: the left and top edges are inside, the right
/// and bottom edges are not.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    /// Left edge (inclusive).
    pub x: f64,
    /// Top edge (inclusive).
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Bounds {
    /// Create a new rectangle.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle anchored at the origin.
    #[inline]
    #[must_use]
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Check if the rectangle has zero (or negative) area.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }
}

/// An opaque attachment surface a gesture listens on.
///
/// The surface is owned by the caller; the arbiter only keeps a weak
/// reference and stops admitting a gesture once its surface is dropped.
/// Nested surfaces are expressed by containment: a parent surface contains
/// every point its children contain, so gestures on both compete for a
/// session that starts inside the child.
pub trait Surface {
    /// Whether a session starting at `point` originates inside this surface.
    fn contains(&self, point: Point) -> bool;
}

impl Surface for Bounds {
    fn contains(&self, point: Point) -> bool {
        self.contains_point(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(b.distance(a), 5.0);
    }

    #[test]
    fn angle_quadrants() {
        let o = Point::ORIGIN;
        assert_eq!(o.angle_to(Point::new(1.0, 0.0)), 0.0);
        assert!((o.angle_to(Point::new(0.0, 1.0)) - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((o.angle_to(Point::new(-1.0, 0.0)) - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn centroid_of_points() {
        let c = Point::centroid([Point::new(0.0, 0.0), Point::new(10.0, 20.0)]);
        assert_eq!(c, Some(Point::new(5.0, 10.0)));
        assert_eq!(Point::centroid(std::iter::empty()), None);
    }

    #[test]
    fn bounds_containment_is_half_open() {
        let b = Bounds::new(10.0, 10.0, 20.0, 20.0);
        assert!(b.contains_point(Point::new(10.0, 10.0)));
        assert!(b.contains_point(Point::new(29.9, 29.9)));
        assert!(!b.contains_point(Point::new(30.0, 15.0)));
        assert!(!b.contains_point(Point::new(15.0, 30.0)));
        assert!(!b.contains_point(Point::new(9.9, 15.0)));
    }

    #[test]
    fn empty_bounds_contain_nothing() {
        let b = Bounds::from_size(0.0, 100.0);
        assert!(b.is_empty());
        assert!(!b.contains(Point::ORIGIN));
    }
}
