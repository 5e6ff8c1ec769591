use crate::geometry::{ConvexCell, Plane};
use crate::math::polygon_3d::{clip_polygon, order_around};
use crate::math::TOLERANCE;

/// Keeps the part of `cell` on the inner side of `plane` (signed distance <= 0).
///
/// Returns `None` when nothing of positive volume remains. A cell that only
/// touches the plane from outside is empty after clipping; a cell entirely
/// inside is returned unchanged.
pub(crate) fn clip_cell(cell: &ConvexCell, plane: &Plane) -> Option<ConvexCell> {
    let mut any_inside = false;
    let mut any_outside = false;
    for p in cell.faces().iter().flatten() {
        let d = plane.signed_distance(p);
        any_inside |= d < -TOLERANCE;
        any_outside |= d > TOLERANCE;
    }
    if !any_inside {
        return None;
    }
    if !any_outside {
        return Some(cell.clone());
    }

    let mut section = Vec::new();
    let mut faces: Vec<_> = cell
        .faces()
        .iter()
        .map(|face| clip_polygon(face, |p| plane.signed_distance(p), &mut section))
        .filter(|face| face.len() >= 3)
        .collect();

    // The cap closes the cut; its outward normal is the plane normal.
    let cap = order_around(&section, plane.normal());
    if cap.len() >= 3 {
        faces.push(cap);
    }
    ConvexCell::from_clipped_faces(faces)
}

/// Intersection of two convex cells, or `None` if they share no volume.
pub(crate) fn intersect_cells(a: &ConvexCell, b: &ConvexCell) -> Option<ConvexCell> {
    b.planes()
        .iter()
        .try_fold(a.clone(), |acc, plane| clip_cell(&acc, plane))
}

/// Decomposes `cell \ cutter` into disjoint convex pieces.
///
/// Each plane of the cutter peels off the part of the remaining cell lying
/// outside it; whatever survives every plane is inside the cutter and is
/// dropped.
pub(crate) fn subtract_cell(cell: &ConvexCell, cutter: &ConvexCell) -> Vec<ConvexCell> {
    let mut pieces = Vec::new();
    let mut remaining = cell.clone();
    for plane in cutter.planes() {
        if let Some(outside) = clip_cell(&remaining, &plane.flipped()) {
            pieces.push(outside);
        }
        match clip_cell(&remaining, plane) {
            Some(inside) => remaining = inside,
            None => return pieces,
        }
    }
    pieces
}
