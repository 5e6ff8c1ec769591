use crate::geometry::{Segment, Solid};
use crate::math::Interval;

/// Projects a solid onto the line carrying a segment.
///
/// The result is the arc-length interval (from the segment start) covered
/// by the solid's shadow on that line. It is not clamped to the segment.
pub struct ProjectOntoSegment<'a> {
    solid: &'a Solid,
    segment: &'a Segment,
}

impl<'a> ProjectOntoSegment<'a> {
    /// Creates a new `ProjectOntoSegment` query.
    #[must_use]
    pub fn new(solid: &'a Solid, segment: &'a Segment) -> Self {
        Self { solid, segment }
    }

    /// Executes the query; `None` for an empty solid.
    #[must_use]
    pub fn execute(&self) -> Option<Interval> {
        self.solid
            .vertices()
            .iter()
            .map(|v| self.segment.parameter_of(v))
            .fold(None, |acc: Option<Interval>, t| match acc {
                None => Some(Interval::new(t, t)),
                Some(i) => Some(Interval::new(i.start.min(t), i.end.max(t))),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use approx::assert_relative_eq;

    #[test]
    fn box_shadow_on_diagonal_run() {
        let solid = Solid::from_box(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0)).unwrap();
        let run = Segment::new(Point3::origin(), Point3::new(10.0, 0.0, 0.0));
        let shadow = ProjectOntoSegment::new(&solid, &run).execute().unwrap();
        assert_relative_eq!(shadow.start, 1.0, epsilon = 1e-12);
        assert_relative_eq!(shadow.end, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_solid_has_no_shadow() {
        let run = Segment::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0));
        assert!(ProjectOntoSegment::new(&Solid::default(), &run).execute().is_none());
    }
}
