use crate::error::Result;
use crate::geometry::Solid;
use crate::math::VOLUME_TOLERANCE;

use super::clip::intersect_cells;
use super::ensure_finite;

/// Computes the boolean intersection of two solids.
pub struct Intersect<'a> {
    solid_a: &'a Solid,
    solid_b: &'a Solid,
}

impl<'a> Intersect<'a> {
    /// Creates a new `Intersect` operation.
    #[must_use]
    pub fn new(solid_a: &'a Solid, solid_b: &'a Solid) -> Self {
        Self { solid_a, solid_b }
    }

    /// Executes the intersection.
    ///
    /// Returns `Ok(None)` when the solids share no volume, including when
    /// they only touch along a face, edge or corner.
    ///
    /// # Errors
    ///
    /// Returns an error if either solid has non-finite coordinates.
    pub fn execute(&self) -> Result<Option<Solid>> {
        ensure_finite(self.solid_a)?;
        ensure_finite(self.solid_b)?;

        let (Some(box_a), Some(box_b)) = (self.solid_a.aabb(), self.solid_b.aabb()) else {
            return Ok(None);
        };
        if !box_a.overlaps(&box_b) {
            return Ok(None);
        }

        let mut cells = Vec::new();
        for a in self.solid_a.cells() {
            for b in self.solid_b.cells() {
                if let Some(piece) = intersect_cells(a, b) {
                    if piece.volume() > VOLUME_TOLERANCE {
                        cells.push(piece);
                    }
                }
            }
        }

        Ok((!cells.is_empty()).then(|| Solid::from_cells(cells)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::query::Volume;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn cube(min: Point3, size: f64) -> Solid {
        Solid::from_box(min, min + crate::math::Vector3::repeat(size)).unwrap()
    }

    #[test]
    fn overlapping_boxes() {
        let a = Solid::from_box(p(0.0, 0.0, 0.0), p(2.0, 2.0, 2.0)).unwrap();
        let b = Solid::from_box(p(1.0, 1.0, 1.0), p(3.0, 4.0, 5.0)).unwrap();
        let common = Intersect::new(&a, &b).execute().unwrap().unwrap();
        assert_relative_eq!(Volume::new(&common).execute().unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn contained_box_is_returned_whole() {
        let outer = cube(p(0.0, 0.0, 0.0), 10.0);
        let inner = cube(p(2.0, 2.0, 2.0), 1.0);
        let common = Intersect::new(&outer, &inner).execute().unwrap().unwrap();
        assert_relative_eq!(Volume::new(&common).execute().unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn disjoint_boxes_have_no_intersection() {
        let a = cube(p(0.0, 0.0, 0.0), 1.0);
        let b = cube(p(5.0, 0.0, 0.0), 1.0);
        assert!(Intersect::new(&a, &b).execute().unwrap().is_none());
    }

    #[test]
    fn face_touch_is_not_an_intersection() {
        let a = cube(p(0.0, 0.0, 0.0), 1.0);
        let b = cube(p(1.0, 0.25, 0.25), 0.5);
        assert!(Intersect::new(&a, &b).execute().unwrap().is_none());
        assert!(Intersect::new(&b, &a).execute().unwrap().is_none());
    }

    #[test]
    fn edge_touch_is_not_an_intersection() {
        let a = cube(p(0.0, 0.0, 0.0), 1.0);
        let b = cube(p(1.0, 1.0, 0.0), 1.0);
        assert!(Intersect::new(&a, &b).execute().unwrap().is_none());
    }

    #[test]
    fn non_finite_input_is_an_error() {
        let a = cube(p(0.0, 0.0, 0.0), 1.0);
        let b = cube(p(0.0, 0.0, 0.0), 1.0)
            .transformed(&crate::math::Isometry3::translation(f64::NAN, 0.0, 0.0));
        assert!(Intersect::new(&a, &b).execute().is_err());
    }

    proptest! {
        #[test]
        fn intersection_is_symmetric(
            ax in -5.0f64..5.0, ay in -5.0f64..5.0, az in -5.0f64..5.0,
            bx in -5.0f64..5.0, by in -5.0f64..5.0, bz in -5.0f64..5.0,
            sa in 0.5f64..6.0, sb in 0.5f64..6.0,
        ) {
            let a = cube(p(ax, ay, az), sa);
            let b = cube(p(bx, by, bz), sb);
            let ab = Intersect::new(&a, &b).execute().unwrap();
            let ba = Intersect::new(&b, &a).execute().unwrap();
            let vol = |s: Option<Solid>| s.map_or(0.0, |s| Volume::new(&s).execute().unwrap());
            let (v_ab, v_ba) = (vol(ab), vol(ba));

            let overlap = |a0: f64, a1: f64, b0: f64, b1: f64| (a1.min(b1) - a0.max(b0)).max(0.0);
            let expected = overlap(ax, ax + sa, bx, bx + sb)
                * overlap(ay, ay + sa, by, by + sb)
                * overlap(az, az + sa, bz, bz + sb);

            prop_assert!((v_ab - v_ba).abs() < 1e-6);
            prop_assert!((v_ab - expected).abs() < 1e-6);
        }
    }
}
