//! World and screen coordinates.
//!
//! - [`Location`]: an immutable point in world space (the game map)
//! - [`ScreenPoint`]: a point on the viewport, in pixels
//!
//! Both wrap a `glam::DVec2`. Every operation returns a new value; nothing is
//! mutated in place.
//!
//! # Example
//!
//! ```
//! use mday_core::location::Location;
//!
//! let a = Location::new(3.0, 0.0);
//! let b = Location::new(0.0, 4.0);
//!
//! assert_eq!(a.distance_to(b), 5.0);
//! assert_eq!(a + b, Location::new(3.0, 4.0));
//! assert_eq!(Location::ORIGIN.normalized(), Location::ORIGIN);
//! ```

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use glam::DVec2;
use serde::{Deserialize, Serialize};

// =============================================================================
// Location
// =============================================================================

/// An immutable 2D point in world space.
///
/// Equality is exact (bitwise float comparison through `PartialEq`). The mover
/// relies on this: a unit has arrived only when its location *is* the
/// destination, which the overshoot clamp guarantees.
#[derive(Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(DVec2);

impl Location {
    /// The world origin.
    pub const ORIGIN: Self = Self(DVec2::ZERO);

    /// Creates a location from world coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }

    /// Wraps a `DVec2`.
    #[must_use]
    pub const fn from_vec(v: DVec2) -> Self {
        Self(v)
    }

    /// Returns the underlying vector.
    #[must_use]
    pub const fn as_vec(self) -> DVec2 {
        self.0
    }

    /// X coordinate.
    #[must_use]
    pub const fn x(self) -> f64 {
        self.0.x
    }

    /// Y coordinate.
    #[must_use]
    pub const fn y(self) -> f64 {
        self.0.y
    }

    /// Length of the vector from the origin to this location.
    #[must_use]
    pub fn length(self) -> f64 {
        self.0.length()
    }

    /// Euclidean distance to another location.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        self.0.distance(other.0)
    }

    /// Unit-length vector in the same direction.
    ///
    /// A zero-length (or non-finite) vector has no direction; the zero vector
    /// is returned instead of propagating NaN.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self(self.0.normalize_or_zero())
    }

    /// Unit-length vector in the same direction, or `None` for a zero vector.
    #[must_use]
    pub fn try_normalized(self) -> Option<Self> {
        self.0.try_normalize().map(Self)
    }

    /// Offsets this location by raw deltas.
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self(self.0 + DVec2::new(dx, dy))
    }

    /// Multiplies both coordinates by `factor`.
    #[must_use]
    pub fn scale(self, factor: f64) -> Self {
        Self(self.0 * factor)
    }

    /// Whether both coordinates are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Whether this location lies inside the axis-aligned rectangle spanned by
    /// `top_left` and `bottom_right`, after growing the rectangle by `radius`
    /// on every side. Edges are inclusive.
    ///
    /// ```
    /// use mday_core::location::Location;
    ///
    /// let tl = Location::new(0.0, 0.0);
    /// let br = Location::new(10.0, 10.0);
    ///
    /// assert!(Location::new(10.0, 0.0).is_inside(tl, br, 0.0));
    /// assert!(!Location::new(12.0, 5.0).is_inside(tl, br, 0.0));
    /// assert!(Location::new(12.0, 5.0).is_inside(tl, br, 2.0));
    /// ```
    #[must_use]
    pub fn is_inside(self, top_left: Self, bottom_right: Self, radius: f64) -> bool {
        let min = top_left.0 - DVec2::splat(radius);
        let max = bottom_right.0 + DVec2::splat(radius);
        self.0.x >= min.x && self.0.x <= max.x && self.0.y >= min.y && self.0.y <= max.y
    }
}

impl Add for Location {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Location {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul<f64> for Location {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self(self.0 * rhs)
    }
}

impl Neg for Location {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl From<DVec2> for Location {
    fn from(v: DVec2) -> Self {
        Self(v)
    }
}

impl From<Location> for DVec2 {
    fn from(location: Location) -> Self {
        location.0
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location({:.5}, {:.5})", self.0.x, self.0.y)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.0.x, self.0.y)
    }
}

// =============================================================================
// Screen Point
// =============================================================================

/// A point on the viewport surface, in pixels.
///
/// The origin is the top-left corner of the viewport and Y grows downward.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    /// Horizontal pixel offset from the left edge.
    pub x: f64,
    /// Vertical pixel offset from the top edge.
    pub y: f64,
}

impl ScreenPoint {
    /// Creates a screen point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<ScreenPoint> for DVec2 {
    fn from(point: ScreenPoint) -> Self {
        DVec2::new(point.x, point.y)
    }
}

impl fmt::Display for ScreenPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.1}px, {:.1}px]", self.x, self.y)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod arithmetic_tests {
        use super::*;

        #[test]
        fn add_and_subtract_return_new_values() {
            let a = Location::new(1.0, 2.0);
            let b = Location::new(10.0, 20.0);

            assert_eq!(a + b, Location::new(11.0, 22.0));
            assert_eq!(b - a, Location::new(9.0, 18.0));
            // Operands are untouched
            assert_eq!(a, Location::new(1.0, 2.0));
        }

        #[test]
        fn scale_and_mul_agree() {
            let a = Location::new(1.5, -2.0);
            assert_eq!(a.scale(2.0), a * 2.0);
            assert_eq!(a * 2.0, Location::new(3.0, -4.0));
        }

        #[test]
        fn length_and_distance() {
            assert_eq!(Location::new(3.0, 4.0).length(), 5.0);
            assert_eq!(
                Location::new(1.0, 1.0).distance_to(Location::new(4.0, 5.0)),
                5.0
            );
        }

        #[test]
        fn offset_moves_by_raw_deltas() {
            assert_eq!(
                Location::new(1.0, 1.0).offset(-1.0, 2.0),
                Location::new(0.0, 3.0)
            );
        }
    }

    mod normalize_tests {
        use super::*;

        #[test]
        fn normalized_has_unit_length() {
            let n = Location::new(10.0, 0.0).normalized();
            assert_eq!(n, Location::new(1.0, 0.0));
        }

        #[test]
        fn zero_vector_normalizes_to_zero() {
            let n = Location::ORIGIN.normalized();
            assert_eq!(n, Location::ORIGIN);
            assert!(n.is_finite());
        }

        #[test]
        fn try_normalized_rejects_zero() {
            assert!(Location::ORIGIN.try_normalized().is_none());
            assert!(Location::new(0.0, 2.0).try_normalized().is_some());
        }
    }

    mod containment_tests {
        use super::*;

        #[test]
        fn edges_are_inclusive() {
            let tl = Location::new(-5.0, -5.0);
            let br = Location::new(5.0, 5.0);
            assert!(Location::new(-5.0, 5.0).is_inside(tl, br, 0.0));
            assert!(Location::new(5.0, -5.0).is_inside(tl, br, 0.0));
        }

        #[test]
        fn radius_grows_rectangle() {
            let tl = Location::new(0.0, 0.0);
            let br = Location::new(1.0, 1.0);
            let outside = Location::new(-3.0, 0.5);
            assert!(!outside.is_inside(tl, br, 2.9));
            assert!(outside.is_inside(tl, br, 3.0));
        }
    }

    #[test]
    fn serialization_is_transparent_vector() {
        let loc = Location::new(100.0, 200.0);
        let json = serde_json::to_string(&loc).unwrap();
        let back: Location = serde_json::from_str(&json).unwrap();
        assert_eq!(back, loc);
    }
}
