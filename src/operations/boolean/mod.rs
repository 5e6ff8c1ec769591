mod clip;
mod intersect_op;
mod union;

pub use intersect_op::Intersect;
pub use union::Union;

use crate::error::{GeometryError, Result};
use crate::geometry::Solid;

/// Rejects solids with NaN or infinite coordinates before clipping.
fn ensure_finite(solid: &Solid) -> Result<()> {
    let finite = solid
        .cells()
        .iter()
        .flat_map(|cell| cell.faces().iter().flatten())
        .all(|p| p.iter().all(|c| c.is_finite()));
    if finite {
        Ok(())
    } else {
        Err(GeometryError::Degenerate("solid has non-finite coordinates".into()).into())
    }
}
