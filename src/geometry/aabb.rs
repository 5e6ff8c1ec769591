use crate::math::{Point3, Vector3, TOLERANCE};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Creates a box from two opposite corners in any order.
    #[must_use]
    pub fn new(a: Point3, b: Point3) -> Self {
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    /// Creates a cube of half-size `half` centred on `center`.
    #[must_use]
    pub fn around(center: Point3, half: f64) -> Self {
        let h = Vector3::repeat(half.abs());
        Self {
            min: center - h,
            max: center + h,
        }
    }

    /// Smallest box enclosing all points, or `None` for an empty set.
    #[must_use]
    pub fn from_points(points: &[Point3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut aabb = Self {
            min: *first,
            max: *first,
        };
        for p in rest {
            aabb.include(p);
        }
        Some(aabb)
    }

    /// Grows the box to include `point`.
    pub fn include(&mut self, point: &Point3) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// Smallest box enclosing both boxes.
    #[must_use]
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Returns `true` if `point` lies inside or within `tolerance` of the box.
    #[must_use]
    pub fn contains_point(&self, point: &Point3, tolerance: f64) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] - tolerance && point[i] <= self.max[i] + tolerance)
    }

    /// Returns `true` if the interiors of the two boxes overlap.
    ///
    /// Boxes that only share a face, edge or corner do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        (0..3).all(|i| self.min[i] < other.max[i] - TOLERANCE && other.min[i] < self.max[i] - TOLERANCE)
    }

    /// Returns the box grown by `margin` on every side.
    #[must_use]
    pub fn expanded(&self, margin: f64) -> Aabb {
        let m = Vector3::repeat(margin);
        Aabb::new(self.min - m, self.max + m)
    }

    /// Centre point of the box.
    #[must_use]
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn from_points_encloses_all() {
        let aabb = Aabb::from_points(&[p(1.0, 5.0, -1.0), p(-2.0, 0.0, 3.0), p(0.0, 1.0, 0.0)]);
        assert_eq!(aabb, Some(Aabb::new(p(-2.0, 0.0, -1.0), p(1.0, 5.0, 3.0))));
        assert_eq!(Aabb::from_points(&[]), None);
    }

    #[test]
    fn touching_boxes_do_not_overlap() {
        let a = Aabb::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0));
        let b = Aabb::new(p(1.0, 0.0, 0.0), p(2.0, 1.0, 1.0));
        let c = Aabb::new(p(0.5, 0.5, 0.5), p(2.0, 2.0, 2.0));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }

    #[test]
    fn contains_point_with_tolerance() {
        let a = Aabb::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0));
        assert!(a.contains_point(&p(1.0, 1.0, 1.0), 0.0));
        assert!(!a.contains_point(&p(1.1, 0.5, 0.5), 0.05));
        assert!(a.contains_point(&p(1.1, 0.5, 0.5), 0.2));
    }

    #[test]
    fn around_and_expand() {
        let a = Aabb::around(p(1.0, 1.0, 1.0), 0.5);
        assert_eq!(a, Aabb::new(p(0.5, 0.5, 0.5), p(1.5, 1.5, 1.5)));
        assert_eq!(a.expanded(0.5).union(&a), Aabb::new(p(0.0, 0.0, 0.0), p(2.0, 2.0, 2.0)));
        assert_eq!(a.center(), p(1.0, 1.0, 1.0));
    }
}
