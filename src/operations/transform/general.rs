use crate::geometry::{Frame, Solid};
use crate::math::Point3;

/// Maps a solid through a frame (link-local to host coordinates).
///
/// Pass [`Frame::inverse`] to map the other way.
pub struct TransformSolid<'a> {
    solid: &'a Solid,
    frame: Frame,
}

impl<'a> TransformSolid<'a> {
    /// Creates a new `TransformSolid` operation.
    #[must_use]
    pub fn new(solid: &'a Solid, frame: Frame) -> Self {
        Self { solid, frame }
    }

    /// Executes the transformation, returning a new solid.
    #[must_use]
    pub fn execute(&self) -> Solid {
        self.solid.transformed(self.frame.isometry())
    }
}

/// Maps a coordinate through a frame (link-local to host coordinates).
pub struct TransformPoint {
    point: Point3,
    frame: Frame,
}

impl TransformPoint {
    /// Creates a new `TransformPoint` operation.
    #[must_use]
    pub fn new(point: Point3, frame: Frame) -> Self {
        Self { point, frame }
    }

    /// Executes the transformation.
    #[must_use]
    pub fn execute(&self) -> Point3 {
        self.frame.to_host(&self.point)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Vector3;
    use crate::operations::query::{PointInSolid, Volume};
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn round_trip_through_inverse() {
        let frame = Frame::new(Vector3::new(5.0, 6.0, 7.0), Vector3::new(1.0, 1.0, 0.0).normalize() * 0.7);
        let p = Point3::new(1.0, -2.0, 3.0);
        let there = TransformPoint::new(p, frame).execute();
        let back = TransformPoint::new(there, frame.inverse()).execute();
        assert_relative_eq!(back, p, epsilon = 1e-9);
    }

    #[test]
    fn half_turn_moves_solid() {
        let solid = Solid::from_box(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0)).unwrap();
        let frame = Frame::new(Vector3::zeros(), Vector3::z() * PI);
        let turned = TransformSolid::new(&solid, frame).execute();
        assert_relative_eq!(Volume::new(&turned).execute().unwrap(), 1.0, epsilon = 1e-9);
        assert!(PointInSolid::new(&turned, Point3::new(-1.5, -0.5, 0.5)).execute());
        assert!(!PointInSolid::new(&turned, Point3::new(1.5, 0.5, 0.5)).execute());
    }
}
