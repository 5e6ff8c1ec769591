use crate::error::{GeometryError, Result};
use crate::math::polygon_3d::newell_normal;
use crate::math::{Isometry3, Point3, Vector3, POINT_TOLERANCE, TOLERANCE};

use super::plane::Plane;

/// A closed convex polyhedron described by its boundary faces.
///
/// Every face is a planar polygon wound counter-clockwise when seen from
/// outside, so the supporting planes point outward and the interior is the
/// intersection of their negative half-spaces.
#[derive(Debug, Clone)]
pub struct ConvexCell {
    faces: Vec<Vec<Point3>>,
    planes: Vec<Plane>,
}

impl ConvexCell {
    /// Creates a cell from outward-wound faces.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if fewer than four faces are
    /// given or a face has no area.
    pub fn from_faces(faces: Vec<Vec<Point3>>) -> Result<Self> {
        if faces.len() < 4 {
            return Err(GeometryError::Degenerate(format!(
                "a closed cell needs at least 4 faces, got {}",
                faces.len()
            ))
            .into());
        }
        let planes = faces
            .iter()
            .map(|face| Plane::from_polygon(face))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { faces, planes })
    }

    /// Builds a cell from faces produced by clipping, dropping sliver faces.
    ///
    /// Returns `None` when too few faces remain to enclose a volume.
    pub(crate) fn from_clipped_faces(faces: Vec<Vec<Point3>>) -> Option<Self> {
        let mut kept_faces = Vec::with_capacity(faces.len());
        let mut planes = Vec::with_capacity(faces.len());
        for face in faces {
            if face.len() < 3 {
                continue;
            }
            if let Ok(plane) = Plane::from_polygon(&face) {
                kept_faces.push(face);
                planes.push(plane);
            }
        }
        (kept_faces.len() >= 4).then_some(Self {
            faces: kept_faces,
            planes,
        })
    }

    /// Creates an axis-aligned box cell from two opposite corners.
    ///
    /// # Errors
    ///
    /// Returns an error if the box is flat along any axis.
    pub fn from_box(a: Point3, b: Point3) -> Result<Self> {
        let min = a.inf(&b);
        let max = a.sup(&b);
        let base = vec![
            Point3::new(min.x, min.y, min.z),
            Point3::new(max.x, min.y, min.z),
            Point3::new(max.x, max.y, min.z),
            Point3::new(min.x, max.y, min.z),
        ];
        Self::prism(&base, Vector3::new(0.0, 0.0, max.z - min.z))
    }

    /// Sweeps a convex planar polygon along `extrusion`.
    ///
    /// The base may be wound either way; it is reoriented so that all faces
    /// point outward.
    ///
    /// # Errors
    ///
    /// Returns an error if the extrusion is zero, the base is degenerate or
    /// the extrusion lies in the base plane.
    pub fn prism(base: &[Point3], extrusion: Vector3) -> Result<Self> {
        if extrusion.norm() < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = newell_normal(base)
            .ok_or_else(|| GeometryError::Degenerate("prism base has zero area".into()))?;
        let along = normal.dot(&extrusion);
        if along.abs() < TOLERANCE {
            return Err(GeometryError::Degenerate("extrusion lies in the base plane".into()).into());
        }

        // Base wound so its normal follows the extrusion; the bottom face is
        // then the reversed base and side quads face outward.
        let base: Vec<Point3> = if along > 0.0 {
            base.to_vec()
        } else {
            base.iter().rev().copied().collect()
        };
        let top: Vec<Point3> = base.iter().map(|p| p + extrusion).collect();

        let n = base.len();
        let mut faces = Vec::with_capacity(n + 2);
        faces.push(base.iter().rev().copied().collect());
        faces.push(top.clone());
        for i in 0..n {
            let j = (i + 1) % n;
            faces.push(vec![base[i], base[j], top[j], top[i]]);
        }
        Self::from_faces(faces)
    }

    /// Returns the boundary faces.
    #[must_use]
    pub fn faces(&self) -> &[Vec<Point3>] {
        &self.faces
    }

    /// Returns the outward supporting planes, one per face.
    #[must_use]
    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    /// Returns the distinct corner points of the cell.
    #[must_use]
    pub fn vertices(&self) -> Vec<Point3> {
        let mut unique: Vec<Point3> = Vec::new();
        for p in self.faces.iter().flatten() {
            if !unique.iter().any(|q| (q - p).norm() <= POINT_TOLERANCE) {
                unique.push(*p);
            }
        }
        unique
    }

    /// Enclosed volume (signed tetrahedron method over fan-triangulated faces).
    #[must_use]
    pub fn volume(&self) -> f64 {
        let mut six_volume = 0.0;
        for face in &self.faces {
            let p0 = face[0].coords;
            for k in 1..face.len().saturating_sub(1) {
                let p1 = face[k].coords;
                let p2 = face[k + 1].coords;
                six_volume += p0.dot(&p1.cross(&p2));
            }
        }
        six_volume / 6.0
    }

    /// Returns `true` if `point` is inside or within `tolerance` of the boundary.
    #[must_use]
    pub fn contains(&self, point: &Point3, tolerance: f64) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.signed_distance(point) <= tolerance)
    }

    /// Applies a rigid transformation.
    #[must_use]
    pub fn transformed(&self, isometry: &Isometry3) -> Self {
        let faces = self
            .faces
            .iter()
            .map(|face| face.iter().map(|p| isometry.transform_point(p)).collect())
            .collect();
        let planes = self
            .planes
            .iter()
            .map(|plane| {
                let on_plane = Point3::from(plane.normal() * -plane.signed_distance(&Point3::origin()));
                let normal = isometry.transform_vector(plane.normal());
                Plane::from_normal(isometry.transform_point(&on_plane), normal)
                    .unwrap_or(*plane)
            })
            .collect();
        Self { faces, planes }
    }
}
