use crate::geometry::{ConvexCell, Segment, Solid};
use crate::math::{merge_intervals, Interval, Point3, TOLERANCE};

/// Tests whether a point lies inside a solid (boundary inclusive).
pub struct PointInSolid<'a> {
    solid: &'a Solid,
    point: Point3,
    tolerance: f64,
}

impl<'a> PointInSolid<'a> {
    /// Creates a new `PointInSolid` query.
    #[must_use]
    pub fn new(solid: &'a Solid, point: Point3) -> Self {
        Self {
            solid,
            point,
            tolerance: TOLERANCE,
        }
    }

    /// Overrides the boundary tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Executes the query.
    #[must_use]
    pub fn execute(&self) -> bool {
        self.solid
            .cells()
            .iter()
            .any(|cell| cell.contains(&self.point, self.tolerance))
    }
}

/// Finds the parts of a segment that run inside a solid.
///
/// Results are arc-length intervals measured from the segment start, merged
/// and sorted. Parts that only graze the boundary are not reported.
pub struct SegmentInside<'a> {
    solid: &'a Solid,
    segment: &'a Segment,
}

impl<'a> SegmentInside<'a> {
    /// Creates a new `SegmentInside` query.
    #[must_use]
    pub fn new(solid: &'a Solid, segment: &'a Segment) -> Self {
        Self { solid, segment }
    }

    /// Executes the query.
    #[must_use]
    pub fn execute(&self) -> Vec<Interval> {
        let length = self.segment.length();
        let inside: Vec<Interval> = self
            .solid
            .cells()
            .iter()
            .filter_map(|cell| clip_parameters(cell, self.segment))
            .map(|i| Interval::new(i.start * length, i.end * length))
            .collect();
        merge_intervals(&inside)
    }
}

/// Cyrus-Beck clipping of a segment against a convex cell.
///
/// Returns the normalised parameter range `[s0, s1] ⊆ [0, 1]` inside the
/// cell, or `None` if the segment misses it or only touches its boundary.
fn clip_parameters(cell: &ConvexCell, segment: &Segment) -> Option<Interval> {
    let mut s_min: f64 = 0.0;
    let mut s_max: f64 = 1.0;
    for plane in cell.planes() {
        let d0 = plane.signed_distance(segment.start());
        let d1 = plane.signed_distance(segment.end());
        let delta = d1 - d0;
        if delta.abs() < TOLERANCE {
            if d0 > -TOLERANCE {
                return None;
            }
            continue;
        }
        let s = -d0 / delta;
        if delta > 0.0 {
            s_max = s_max.min(s);
        } else {
            s_min = s_min.max(s);
        }
        if s_min >= s_max - TOLERANCE {
            return None;
        }
    }
    Some(Interval::new(s_min, s_max))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn block() -> Solid {
        Solid::from_box(p(10.0, -5.0, -5.0), p(20.0, 5.0, 5.0)).unwrap()
    }

    #[test]
    fn point_inside_and_on_boundary() {
        let solid = block();
        assert!(PointInSolid::new(&solid, p(15.0, 0.0, 0.0)).execute());
        assert!(PointInSolid::new(&solid, p(10.0, 0.0, 0.0)).execute());
        assert!(!PointInSolid::new(&solid, p(9.0, 0.0, 0.0)).execute());
        assert!(PointInSolid::new(&solid, p(9.0, 0.0, 0.0)).with_tolerance(1.5).execute());
    }

    #[test]
    fn segment_through_block() {
        let solid = block();
        let segment = Segment::new(p(0.0, 0.0, 0.0), p(30.0, 0.0, 0.0));
        let inside = SegmentInside::new(&solid, &segment).execute();
        assert_eq!(inside.len(), 1);
        assert_relative_eq!(inside[0].start, 10.0, epsilon = 1e-9);
        assert_relative_eq!(inside[0].end, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn segment_grazing_face_is_outside() {
        let solid = block();
        let segment = Segment::new(p(0.0, 5.0, 0.0), p(30.0, 5.0, 0.0));
        assert!(SegmentInside::new(&solid, &segment).execute().is_empty());
    }

    #[test]
    fn segment_ending_inside() {
        let solid = block();
        let segment = Segment::new(p(0.0, 0.0, 0.0), p(12.0, 0.0, 0.0));
        let inside = SegmentInside::new(&solid, &segment).execute();
        assert_eq!(inside.len(), 1);
        assert_relative_eq!(inside[0].start, 10.0, epsilon = 1e-9);
        assert_relative_eq!(inside[0].end, 12.0, epsilon = 1e-9);
    }
}
