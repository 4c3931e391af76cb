//! Minimal planar geometry for ink

use serde::{Deserialize, Serialize};

/// A point of ink, in canvas coordinates
#[derive(Debug, PartialEq, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

/// Axis-aligned bounding box
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct BoundingBox {
    /// Corner with the smallest coordinates
    pub min: Point,
    /// Corner with the largest coordinates
    pub max: Point,
}

impl Point {
    /// Create a point
    pub fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Distance to the segment [a, b]
    pub fn distance_to_segment(&self, a: Point, b: Point) -> f64 {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let len2 = dx * dx + dy * dy;
        if len2 == 0.0 {
            return self.distance(a);
        }
        let t = (((self.x - a.x) * dx + (self.y - a.y) * dy) / len2).clamp(0.0, 1.0);
        self.distance(Point::new(a.x + t * dx, a.y + t * dy))
    }

    /// Distance to a polyline; a single point is a degenerate polyline
    pub fn distance_to_polyline(&self, points: &[Point]) -> f64 {
        match points {
            [] => f64::INFINITY,
            [p] => self.distance(*p),
            _ => points
                .windows(2)
                .map(|w| self.distance_to_segment(w[0], w[1]))
                .fold(f64::INFINITY, f64::min),
        }
    }
}

impl BoundingBox {
    /// Bounding box of a set of points, or None if there are no points
    pub fn from_points<'a, I: IntoIterator<Item = &'a Point>>(points: I) -> Option<BoundingBox> {
        let mut it = points.into_iter();
        let first = *it.next()?;
        let mut ret = BoundingBox {
            min: first,
            max: first,
        };
        for p in it {
            ret.min.x = ret.min.x.min(p.x);
            ret.min.y = ret.min.y.min(p.y);
            ret.max.x = ret.max.x.max(p.x);
            ret.max.y = ret.max.y.max(p.y);
        }
        Some(ret)
    }

    /// Center of the box
    pub fn center(&self) -> Point {
        Point::new(
            0.5 * (self.min.x + self.max.x),
            0.5 * (self.min.y + self.max.y),
        )
    }

    /// Width of the box
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Height of the box
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}
