use crate::error::{GeometryError, Result};
use crate::math::{Interval, Point3, Vector3, TOLERANCE};

/// A bounded straight interval on a run's centerline.
///
/// Segments are values: every operation returns a new segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    start: Point3,
    end: Point3,
}

impl Segment {
    /// Creates a segment between two points.
    #[must_use]
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    /// Start point.
    #[must_use]
    pub fn start(&self) -> &Point3 {
        &self.start
    }

    /// End point.
    #[must_use]
    pub fn end(&self) -> &Point3 {
        &self.end
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Unit direction from start to end.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] for a zero-length segment.
    pub fn direction(&self) -> Result<Vector3> {
        let d = self.end - self.start;
        let len = d.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(d / len)
    }

    /// Point at arc-length `t` from the start (not clamped).
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3 {
        let len = self.length();
        if len < TOLERANCE {
            return self.start;
        }
        self.start + (self.end - self.start) * (t / len)
    }

    /// Arc-length parameter of the orthogonal projection of `point`.
    #[must_use]
    pub fn parameter_of(&self, point: &Point3) -> f64 {
        match self.direction() {
            Ok(dir) => (point - self.start).dot(&dir),
            Err(_) => 0.0,
        }
    }

    /// Closest point of the segment to `point`.
    #[must_use]
    pub fn closest_point(&self, point: &Point3) -> Point3 {
        let t = self.parameter_of(point).clamp(0.0, self.length());
        self.point_at(t)
    }

    /// Distance from `point` to the segment.
    #[must_use]
    pub fn distance_to(&self, point: &Point3) -> f64 {
        (point - self.closest_point(point)).norm()
    }

    /// Returns `true` if `point` is within `tolerance` of the segment.
    #[must_use]
    pub fn contains(&self, point: &Point3, tolerance: f64) -> bool {
        self.distance_to(point) <= tolerance
    }

    /// Sub-segment covering the arc-length interval `range`.
    #[must_use]
    pub fn sub_segment(&self, range: Interval) -> Segment {
        Segment::new(self.point_at(range.start), self.point_at(range.end))
    }

    /// The same segment traversed the other way.
    #[must_use]
    pub fn reversed(&self) -> Segment {
        Segment::new(self.end, self.start)
    }

    /// Midpoint.
    #[must_use]
    pub fn midpoint(&self) -> Point3 {
        nalgebra::center(&self.start, &self.end)
    }
}
