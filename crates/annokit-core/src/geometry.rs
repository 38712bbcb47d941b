//! Geometry primitives used by drawing tools and the annotation scene.

use serde::{Deserialize, Serialize};

/// A point in image space, measured in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Squared distance, for comparisons that don't need the root
    pub fn distance_squared(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// A shape that can be committed to the annotation scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// Closed polygon; the closing edge is implicit.
    Polygon {
        /// Vertices in drawing order.
        points: Vec<Point>,
    },
}

impl Shape {
    /// Build a polygon shape from its vertices
    pub fn polygon(points: Vec<Point>) -> Self {
        Shape::Polygon { points }
    }

    /// Vertices of this shape
    pub fn points(&self) -> &[Point] {
        match self {
            Shape::Polygon { points } => points,
        }
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for an empty shape
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let points = self.points();
        let first = points.first()?;
        let init = (*first, *first);
        Some(points.iter().fold(init, |(min, max), p| {
            (
                Point::new(min.x.min(p.x), min.y.min(p.y)),
                Point::new(max.x.max(p.x), max.y.max(p.y)),
            )
        }))
    }
}
