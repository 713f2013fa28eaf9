//! Planar coordinates and bearings.
//!
//! Network coordinates are projected, so plain Euclidean geometry is used.
//! Bearings are measured counter-clockwise from the positive x axis and
//! normalised to `[0, 2π)`.

use std::f64::consts::TAU;

/// A projected 2-D coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Bearing from `self` towards `other` in radians, in `[0, 2π)`.
    ///
    /// Coincident points have bearing `0`.
    pub fn bearing_to(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        if dx == 0.0 && dy == 0.0 {
            return 0.0;
        }
        let arc = dy.atan2(dx);
        let arc = if arc < 0.0 { arc + TAU } else { arc };
        // atan2 of a tiny negative angle can round up to exactly TAU.
        if arc >= TAU { 0.0 } else { arc }
    }

    /// Coordinates as an `[x, y]` array for spatial-index queries.
    #[inline]
    pub fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}
