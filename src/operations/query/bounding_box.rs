use crate::geometry::{Aabb, Solid};
use crate::math::Point3;

/// Computes the axis-aligned bounding box of a set of solids and points.
#[derive(Default)]
pub struct BoundingBox<'a> {
    solids: Vec<&'a Solid>,
    points: Vec<Point3>,
}

impl<'a> BoundingBox<'a> {
    /// Creates a new, empty `BoundingBox` query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a solid to the set.
    #[must_use]
    pub fn with_solid(mut self, solid: &'a Solid) -> Self {
        self.solids.push(solid);
        self
    }

    /// Adds several solids to the set.
    #[must_use]
    pub fn with_solids(mut self, solids: &[&'a Solid]) -> Self {
        self.solids.extend_from_slice(solids);
        self
    }

    /// Adds points to the set.
    #[must_use]
    pub fn with_points(mut self, points: &[Point3]) -> Self {
        self.points.extend_from_slice(points);
        self
    }

    /// Executes the query.
    ///
    /// Returns `None` when the set contains no geometry.
    #[must_use]
    pub fn execute(&self) -> Option<Aabb> {
        let solid_boxes = self.solids.iter().filter_map(|s| s.aabb());
        let point_box = Aabb::from_points(&self.points);
        solid_boxes
            .chain(point_box)
            .reduce(|acc, aabb| acc.union(&aabb))
    }
}
