use crate::error::{GeometryError, Result};
use crate::geometry::{ConvexCell, Segment, Solid};
use crate::math::hull_2d::convex_hull;
use crate::math::{Point2, Point3, Vector3, TOLERANCE};

/// Sweeps a run's cross-section along its centerline, grown or shrunk by a
/// signed offset.
///
/// Section samples are `(u, v)` coordinates in the plane perpendicular to the
/// centerline, measured from the centerline. `u` is horizontal (perpendicular
/// to both the run and the world Z axis); for vertical runs `u` follows the
/// world X axis instead. The envelope is the convex hull of the offset
/// samples, so round sections should be sampled densely enough for the
/// clearance check at hand.
pub struct OffsetExtrude<'a> {
    centerline: &'a Segment,
    section: &'a [Point2],
    offset: f64,
}

impl<'a> OffsetExtrude<'a> {
    /// Creates a new `OffsetExtrude` operation.
    #[must_use]
    pub fn new(centerline: &'a Segment, section: &'a [Point2], offset: f64) -> Self {
        Self {
            centerline,
            section,
            offset,
        }
    }

    /// Executes the sweep.
    ///
    /// # Errors
    ///
    /// Returns an error if the centerline has zero length, the section has
    /// no area, or a negative offset collapses the section.
    pub fn execute(&self) -> Result<Solid> {
        let w = self.centerline.direction()?;
        let (u, v) = section_axes(&w);

        let mut offset_samples = Vec::with_capacity(self.section.len());
        for sample in self.section {
            let radius = sample.coords.norm();
            if radius < TOLERANCE {
                offset_samples.push(*sample);
                continue;
            }
            if radius + self.offset <= TOLERANCE {
                return Err(GeometryError::Degenerate(format!(
                    "offset {} collapses a section sample at radius {radius}",
                    self.offset
                ))
                .into());
            }
            offset_samples.push(sample + sample.coords * (self.offset / radius));
        }

        let hull = convex_hull(&offset_samples);
        if hull.len() < 3 {
            return Err(GeometryError::Degenerate("run cross-section has no area".into()).into());
        }

        let start = *self.centerline.start();
        let base: Vec<Point3> = hull.iter().map(|s| start + u * s.x + v * s.y).collect();
        let extrusion = self.centerline.end() - start;
        Ok(Solid::from_cells(vec![ConvexCell::prism(&base, extrusion)?]))
    }
}

/// Section plane axes `(u, v)` for a run direction `w`.
fn section_axes(w: &Vector3) -> (Vector3, Vector3) {
    let reference = if w.z.abs() < 0.9 {
        Vector3::z()
    } else {
        Vector3::x()
    };
    let u = reference.cross(w).normalize();
    let v = w.cross(&u);
    (u, v)
}
