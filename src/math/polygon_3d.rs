use super::{Point3, Vector3, POINT_TOLERANCE, TOLERANCE};

/// Computes the unit normal of a polygon using Newell's method.
///
/// Returns `None` for polygons with (near) zero area.
#[must_use]
pub fn newell_normal(points: &[Point3]) -> Option<Vector3> {
    let n = points.len();
    if n < 3 {
        return None;
    }
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let curr = &points[i];
        let next = &points[(i + 1) % n];
        normal.x += (curr.y - next.y) * (curr.z + next.z);
        normal.y += (curr.z - next.z) * (curr.x + next.x);
        normal.z += (curr.x - next.x) * (curr.y + next.y);
    }
    let len = normal.norm();
    (len > TOLERANCE).then(|| normal / len)
}

/// Average of a set of points.
#[must_use]
pub fn centroid(points: &[Point3]) -> Option<Point3> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    #[allow(clippy::cast_precision_loss)]
    let count = points.len() as f64;
    Some(Point3::from(sum / count))
}

/// Clips a planar polygon against the half-space `distance(p) <= 0`.
///
/// `distance` is the signed distance to the clipping plane. Points of the
/// result that lie on the plane are appended to `on_plane`; they later form
/// the cap face of a clipped cell. Winding of the input is preserved.
pub fn clip_polygon<F>(polygon: &[Point3], distance: F, on_plane: &mut Vec<Point3>) -> Vec<Point3>
where
    F: Fn(&Point3) -> f64,
{
    let n = polygon.len();
    let mut out = Vec::with_capacity(n + 2);
    for i in 0..n {
        let curr = polygon[i];
        let next = polygon[(i + 1) % n];
        let dc = distance(&curr);
        let dn = distance(&next);

        if dc <= TOLERANCE {
            out.push(curr);
            if dc.abs() <= TOLERANCE {
                on_plane.push(curr);
            }
        }

        let crosses = (dc < -TOLERANCE && dn > TOLERANCE) || (dc > TOLERANCE && dn < -TOLERANCE);
        if crosses {
            let t = dc / (dc - dn);
            let p = curr + (next - curr) * t;
            out.push(p);
            on_plane.push(p);
        }
    }
    dedup_loop(&mut out);
    out
}

/// Removes consecutive coincident points, including the wrap-around pair.
pub fn dedup_loop(points: &mut Vec<Point3>) {
    points.dedup_by(|a, b| (*a - *b).norm() <= POINT_TOLERANCE);
    while points.len() > 1 {
        let first = points[0];
        let last = points[points.len() - 1];
        if (first - last).norm() <= POINT_TOLERANCE {
            points.pop();
        } else {
            break;
        }
    }
}

/// Orders coplanar points counter-clockwise around `normal`.
///
/// Coincident points are merged first. The points are assumed to be the
/// vertices of a convex polygon.
#[must_use]
pub fn order_around(points: &[Point3], normal: &Vector3) -> Vec<Point3> {
    let mut unique: Vec<Point3> = Vec::with_capacity(points.len());
    for p in points {
        if !unique.iter().any(|q| (q - p).norm() <= POINT_TOLERANCE) {
            unique.push(*p);
        }
    }
    let Some(center) = centroid(&unique) else {
        return unique;
    };

    let (u, v) = plane_basis(normal);
    let mut keyed: Vec<(f64, Point3)> = unique
        .into_iter()
        .map(|p| {
            let d = p - center;
            (d.dot(&v).atan2(d.dot(&u)), p)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    keyed.into_iter().map(|(_, p)| p).collect()
}

/// Builds an orthonormal basis `(u, v)` such that `u x v = normal`.
#[must_use]
pub fn plane_basis(normal: &Vector3) -> (Vector3, Vector3) {
    let n = normal.normalize();
    let axis = if n.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u = n.cross(&axis).normalize();
    let v = n.cross(&u);
    (u, v)
}
