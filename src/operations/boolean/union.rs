use crate::error::Result;
use crate::geometry::Solid;
use crate::math::VOLUME_TOLERANCE;

use super::clip::subtract_cell;
use super::ensure_finite;

/// Computes the boolean union of two solids.
///
/// The result keeps every cell of the first solid and adds the parts of the
/// second that lie outside it, so cells stay pairwise disjoint.
pub struct Union<'a> {
    solid_a: &'a Solid,
    solid_b: &'a Solid,
}

impl<'a> Union<'a> {
    /// Creates a new `Union` operation.
    #[must_use]
    pub fn new(solid_a: &'a Solid, solid_b: &'a Solid) -> Self {
        Self { solid_a, solid_b }
    }

    /// Executes the union.
    ///
    /// # Errors
    ///
    /// Returns an error if either solid has non-finite coordinates.
    pub fn execute(&self) -> Result<Solid> {
        ensure_finite(self.solid_a)?;
        ensure_finite(self.solid_b)?;

        let mut cells = self.solid_a.cells().to_vec();
        for b in self.solid_b.cells() {
            let mut remainder = vec![b.clone()];
            for a in self.solid_a.cells() {
                remainder = remainder
                    .iter()
                    .flat_map(|piece| subtract_cell(piece, a))
                    .collect();
                if remainder.is_empty() {
                    break;
                }
            }
            cells.extend(remainder.into_iter().filter(|c| c.volume() > VOLUME_TOLERANCE));
        }
        Ok(Solid::from_cells(cells))
    }
}
