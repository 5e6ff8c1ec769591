use crate::math::{Isometry3, Point3, Vector3};

/// Placement of an externally linked model inside the active model.
///
/// `to_host` maps link-local coordinates into the active model's frame;
/// `to_local` is its inverse. Links may be rotated and translated
/// arbitrarily but never scaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    isometry: Isometry3,
}

impl Frame {
    /// The frame of the active model itself.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            isometry: Isometry3::identity(),
        }
    }

    /// Creates a frame from a translation and an axis-angle rotation
    /// (axis direction, angle in radians as its length).
    #[must_use]
    pub fn new(translation: Vector3, axis_angle: Vector3) -> Self {
        Self {
            isometry: Isometry3::new(translation, axis_angle),
        }
    }

    /// Wraps an existing isometry.
    #[must_use]
    pub fn from_isometry(isometry: Isometry3) -> Self {
        Self { isometry }
    }

    /// Returns the link-to-host isometry.
    #[must_use]
    pub fn isometry(&self) -> &Isometry3 {
        &self.isometry
    }

    /// Maps a link-local point into the active model.
    #[must_use]
    pub fn to_host(&self, point: &Point3) -> Point3 {
        self.isometry.transform_point(point)
    }

    /// Maps an active-model point into the link's frame.
    #[must_use]
    pub fn to_local(&self, point: &Point3) -> Point3 {
        self.isometry.inverse_transform_point(point)
    }

    /// Returns the frame that undoes this one.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            isometry: self.isometry.inverse(),
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::identity()
    }
}
