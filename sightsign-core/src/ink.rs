//! Stroke geometry
//!
//! Strokes arrive from the ink source as ordered screen-space samples.
//! The core only reads them.

use serde::{Deserialize, Serialize};

/// A screen-space sample in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const ORIGIN: Point2D = Point2D { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// True when both axes differ by less than `threshold` pixels
    pub fn within(&self, other: &Point2D, threshold: f64) -> bool {
        (self.x - other.x).abs() < threshold && (self.y - other.y).abs() < threshold
    }
}

/// A point given with other than two coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("expected [x, y], got {0} coordinates")]
pub struct PointArityError(pub usize);

impl TryFrom<Vec<f64>> for Point2D {
    type Error = PointArityError;

    fn try_from(coords: Vec<f64>) -> Result<Self, Self::Error> {
        match coords.as_slice() {
            &[x, y] => Ok(Self { x, y }),
            other => Err(PointArityError(other.len())),
        }
    }
}

impl From<Point2D> for [f64; 2] {
    fn from(p: Point2D) -> Self {
        [p.x, p.y]
    }
}

/// An ordered sequence of points drawn in one pen-down motion
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Stroke {
    pub points: Vec<Point2D>,
}

impl Stroke {
    pub fn new(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<Point2D> {
        self.points.first().copied()
    }

    pub fn point(&self, index: usize) -> Option<Point2D> {
        self.points.get(index).copied()
    }
}

impl FromIterator<Point2D> for Stroke {
    fn from_iter<I: IntoIterator<Item = Point2D>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// Axis-aligned bounding box in screen pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Bounds {
    /// Union of the bounds of every point in `strokes`
    ///
    /// Returns `None` when there are no points at all.
    pub fn of(strokes: &[Stroke]) -> Option<Bounds> {
        let mut points = strokes.iter().flat_map(|s| s.points.iter());
        let first = points.next()?;
        let init = Bounds {
            left: first.x,
            top: first.y,
            right: first.x,
            bottom: first.y,
        };
        Some(points.fold(init, |b, p| Bounds {
            left: b.left.min(p.x),
            top: b.top.min(p.y),
            right: b.right.max(p.x),
            bottom: b.bottom.max(p.y),
        }))
    }

    /// Corners clockwise from top-left
    pub fn corners(&self) -> [Point2D; 4] {
        [
            Point2D::new(self.left, self.top),
            Point2D::new(self.right, self.top),
            Point2D::new(self.right, self.bottom),
            Point2D::new(self.left, self.bottom),
        ]
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}
