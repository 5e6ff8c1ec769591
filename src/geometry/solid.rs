use crate::error::Result;
use crate::math::{Isometry3, Point3};

use super::aabb::Aabb;
use super::cell::ConvexCell;

/// A solid made of pairwise-disjoint convex cells.
///
/// This is the neutral solid representation the engine exchanges with the
/// geometry kernel. Hosts convert their own breps into cells (a run is a
/// single prism, a fitting a handful of cells).
#[derive(Debug, Clone, Default)]
pub struct Solid {
    cells: Vec<ConvexCell>,
}

impl Solid {
    /// Creates a solid from cells that must not overlap each other.
    #[must_use]
    pub fn from_cells(cells: Vec<ConvexCell>) -> Self {
        Self { cells }
    }

    /// Creates a box solid from two opposite corners.
    ///
    /// # Errors
    ///
    /// Returns an error if the box is flat along any axis.
    pub fn from_box(a: Point3, b: Point3) -> Result<Self> {
        Ok(Self {
            cells: vec![ConvexCell::from_box(a, b)?],
        })
    }

    /// Creates a box solid filling an axis-aligned bounding box.
    ///
    /// # Errors
    ///
    /// Returns an error if the box is flat along any axis.
    pub fn from_aabb(aabb: &Aabb) -> Result<Self> {
        Self::from_box(aabb.min, aabb.max)
    }

    /// Returns the cells of the solid.
    #[must_use]
    pub fn cells(&self) -> &[ConvexCell] {
        &self.cells
    }

    /// Returns `true` if the solid has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns every corner point of every cell.
    #[must_use]
    pub fn vertices(&self) -> Vec<Point3> {
        self.cells.iter().flat_map(ConvexCell::vertices).collect()
    }

    /// Axis-aligned bounds of the solid, or `None` if it is empty.
    #[must_use]
    pub fn aabb(&self) -> Option<Aabb> {
        Aabb::from_points(&self.vertices())
    }

    /// Applies a rigid transformation to every cell.
    #[must_use]
    pub fn transformed(&self, isometry: &Isometry3) -> Self {
        Self {
            cells: self.cells.iter().map(|c| c.transformed(isometry)).collect(),
        }
    }
}
