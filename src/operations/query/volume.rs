use crate::error::{GeometryError, Result};
use crate::geometry::Solid;

/// Computes the volume of a solid.
///
/// For each cell, every face is fan-triangulated and the signed tetrahedron
/// `(1/6) * v0 . (v1 x v2)` is summed. Faces are wound outward, so each
/// cell contributes a positive volume; cells are disjoint, so they add up.
pub struct Volume<'a> {
    solid: &'a Solid,
}

impl<'a> Volume<'a> {
    /// Creates a new `Volume` query.
    #[must_use]
    pub fn new(solid: &'a Solid) -> Self {
        Self { solid }
    }

    /// Executes the query, returning the volume (absolute value).
    ///
    /// # Errors
    ///
    /// Returns an error if the volume is not a finite number.
    pub fn execute(&self) -> Result<f64> {
        let volume: f64 = self.solid.cells().iter().map(|c| c.volume().abs()).sum();
        if !volume.is_finite() {
            return Err(GeometryError::Degenerate("volume is not finite".into()).into());
        }
        Ok(volume)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::ConvexCell;
    use crate::math::{Point3, Vector3};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn box_volume() {
        let solid = Solid::from_box(p(0.0, 0.0, 0.0), p(2.0, 3.0, 4.0)).unwrap();
        let volume = Volume::new(&solid).execute().unwrap();
        assert!((volume - 24.0).abs() < 1e-9, "expected 24.0, got {volume}");
    }

    #[test]
    fn offset_box_volume() {
        let solid = Solid::from_box(p(1.0, 2.0, 3.0), p(3.0, 5.0, 7.0)).unwrap();
        let volume = Volume::new(&solid).execute().unwrap();
        // 2 * 3 * 4 = 24
        assert!((volume - 24.0).abs() < 1e-9, "expected 24.0, got {volume}");
    }

    #[test]
    fn hexagonal_prism_volume() {
        let base: Vec<Point3> = (0..6)
            .map(|i| {
                let a = f64::from(i) * std::f64::consts::PI / 3.0;
                p(a.cos(), a.sin(), 0.0)
            })
            .collect();
        let cell = ConvexCell::prism(&base, Vector3::new(0.0, 0.0, 2.0)).unwrap();
        let solid = Solid::from_cells(vec![cell]);
        let expected = 3.0 * 3.0_f64.sqrt() / 2.0 * 2.0;
        let volume = Volume::new(&solid).execute().unwrap();
        assert!((volume - expected).abs() < 1e-9, "expected {expected}, got {volume}");
    }

    #[test]
    fn empty_solid_has_zero_volume() {
        assert!(Volume::new(&Solid::default()).execute().unwrap().abs() < f64::EPSILON);
    }
}
