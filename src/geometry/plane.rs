use crate::error::{GeometryError, Result};
use crate::math::polygon_3d::{centroid, newell_normal};
use crate::math::{Point3, Vector3, TOLERANCE};

/// An oriented infinite plane `normal · p = offset`.
///
/// The normal points to the "outside": a point is on the inner side when
/// its signed distance is negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    normal: Vector3,
    offset: f64,
}

impl Plane {
    /// Creates a plane through `origin` with the given normal.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length.
    pub fn from_normal(origin: Point3, normal: Vector3) -> Result<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / len;
        Ok(Self {
            normal,
            offset: normal.dot(&origin.coords),
        })
    }

    /// Creates the supporting plane of a planar polygon.
    ///
    /// The normal follows the polygon winding (Newell's method).
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if the polygon has no area.
    pub fn from_polygon(points: &[Point3]) -> Result<Self> {
        let normal = newell_normal(points)
            .ok_or_else(|| GeometryError::Degenerate("polygon has zero area".into()))?;
        let origin = centroid(points)
            .ok_or_else(|| GeometryError::Degenerate("polygon has no points".into()))?;
        Self::from_normal(origin, normal)
    }

    /// Returns the unit normal.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Signed distance from `point` to the plane.
    #[must_use]
    pub fn signed_distance(&self, point: &Point3) -> f64 {
        self.normal.dot(&point.coords) - self.offset
    }

    /// Returns the same plane with the opposite orientation.
    #[must_use]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            offset: -self.offset,
        }
    }
}
