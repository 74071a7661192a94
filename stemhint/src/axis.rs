//! Axis-relative coordinate access.
//!
//! Every stem computation runs once per axis. Rather than flipping a global
//! orientation flag, each geometry helper takes an [`Axis`] and asks it for
//! the two coordinates it cares about:
//!
//! * the *location* of an edge, which is the coordinate the stem snaps, and
//! * the position *along* the edge, which is the other coordinate.
//!
//! For [`Axis::Horizontal`] the flat edges run along x and stems are located
//! on y (PostScript `hstem`); for [`Axis::Vertical`] it is the reverse.

use kurbo::{Point, Rect, Vec2};

/// One of the two hinting axes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// Horizontal stems: edges run along x, locations are y coordinates.
    Horizontal,
    /// Vertical stems: edges run along y, locations are x coordinates.
    Vertical,
}

impl Axis {
    /// Both axes, in the order they are processed.
    pub const ALL: [Axis; 2] = [Axis::Horizontal, Axis::Vertical];

    /// Index used for per-axis arrays.
    pub fn index(self) -> usize {
        match self {
            Axis::Horizontal => 0,
            Axis::Vertical => 1,
        }
    }

    /// The coordinate a stem on this axis is located on.
    pub fn location(self, point: Point) -> f64 {
        match self {
            Axis::Horizontal => point.y,
            Axis::Vertical => point.x,
        }
    }

    /// The coordinate running along a flat edge on this axis.
    pub fn along(self, point: Point) -> f64 {
        match self {
            Axis::Horizontal => point.x,
            Axis::Vertical => point.y,
        }
    }

    /// Location component of a vector.
    pub fn location_delta(self, vec: Vec2) -> f64 {
        match self {
            Axis::Horizontal => vec.y,
            Axis::Vertical => vec.x,
        }
    }

    /// Along component of a vector.
    pub fn along_delta(self, vec: Vec2) -> f64 {
        match self {
            Axis::Horizontal => vec.x,
            Axis::Vertical => vec.y,
        }
    }

    /// Builds a point from axis-relative coordinates.
    pub fn point(self, along: f64, location: f64) -> Point {
        match self {
            Axis::Horizontal => Point::new(along, location),
            Axis::Vertical => Point::new(location, along),
        }
    }

    /// The `(min, max)` location range covered by a rectangle.
    pub fn location_range(self, rect: Rect) -> (f64, f64) {
        match self {
            Axis::Horizontal => (rect.y0, rect.y1),
            Axis::Vertical => (rect.x0, rect.x1),
        }
    }

    /// The `(min, max)` along range covered by a rectangle.
    pub fn along_range(self, rect: Rect) -> (f64, f64) {
        match self {
            Axis::Horizontal => (rect.x0, rect.x1),
            Axis::Vertical => (rect.y0, rect.y1),
        }
    }

    /// Returns true if travelling in `direction` along an edge leaves the
    /// filled interior at a greater location, for a counter-clockwise
    /// (PostScript) outline.
    ///
    /// The interior of a counter-clockwise contour lies to the left of the
    /// direction of travel.
    pub fn interior_above(self, direction: Vec2) -> bool {
        // left normal is (-dy, dx)
        match self {
            Axis::Horizontal => direction.x > 0.0,
            Axis::Vertical => direction.y < 0.0,
        }
    }

    /// Short name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Axis::Horizontal => "horizontal",
            Axis::Vertical => "vertical",
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_swap_per_axis() {
        let p = Point::new(10.0, 20.0);
        assert_eq!(Axis::Horizontal.location(p), 20.0);
        assert_eq!(Axis::Horizontal.along(p), 10.0);
        assert_eq!(Axis::Vertical.location(p), 10.0);
        assert_eq!(Axis::Vertical.along(p), 20.0);
        for axis in Axis::ALL {
            let q = axis.point(axis.along(p), axis.location(p));
            assert_eq!(p, q);
        }
    }

    #[test]
    fn interior_side_matches_counter_clockwise_square() {
        // bottom edge of a ccw square runs +x, left edge runs -y
        assert!(Axis::Horizontal.interior_above(Vec2::new(1.0, 0.0)));
        assert!(!Axis::Horizontal.interior_above(Vec2::new(-1.0, 0.0)));
        assert!(Axis::Vertical.interior_above(Vec2::new(0.0, -1.0)));
        assert!(!Axis::Vertical.interior_above(Vec2::new(0.0, 1.0)));
    }
}
