//! The geometry kernel contract.
//!
//! Everything the routing engine needs from solid modelling goes through
//! [`GeometryKernel`]. [`ConvexKernel`] is the built-in implementation over
//! [`Solid`]'s convex-cell representation; hosts with their own modeller
//! implement the trait themselves.

use crate::error::Result;
use crate::geometry::{Aabb, Frame, Segment, Solid};
use crate::math::{Interval, Point2, Point3};
use crate::operations::boolean::{Intersect, Union};
use crate::operations::query::{BoundingBox, PointInSolid, SegmentInside, Volume};
use crate::operations::shaping::OffsetExtrude;
use crate::operations::transform::{TransformPoint, TransformSolid};

/// Solid operations required by the routing engine.
pub trait GeometryKernel {
    /// Intersection of two solids; `None` when they are disjoint or only touch.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel cannot process the input.
    fn intersect(&self, a: &Solid, b: &Solid) -> Result<Option<Solid>>;

    /// Union of two solids.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel cannot process the input.
    fn union(&self, a: &Solid, b: &Solid) -> Result<Solid>;

    /// Enclosed volume.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid is malformed.
    fn volume(&self, solid: &Solid) -> Result<f64>;

    /// Axis-aligned box around a set of solids and points.
    fn bounding_volume(&self, solids: &[&Solid], points: &[Point3]) -> Option<Aabb>;

    /// Maps a link-local point into the active model.
    fn transform_point(&self, point: &Point3, frame: &Frame) -> Point3;

    /// Maps a link-local solid into the active model.
    fn transform_solid(&self, solid: &Solid, frame: &Frame) -> Solid;

    /// Sweeps a cross-section along a centerline, grown by `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error for a degenerate centerline or section.
    fn offset_extrude(&self, centerline: &Segment, section: &[Point2], offset: f64) -> Result<Solid>;

    /// Point containment, boundary inclusive.
    fn contains_point(&self, solid: &Solid, point: &Point3) -> bool;

    /// Arc-length intervals of `segment` that lie inside `solid`.
    fn segment_inside(&self, solid: &Solid, segment: &Segment) -> Vec<Interval>;
}

/// Kernel over convex-cell solids.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvexKernel;

impl GeometryKernel for ConvexKernel {
    fn intersect(&self, a: &Solid, b: &Solid) -> Result<Option<Solid>> {
        Intersect::new(a, b).execute()
    }

    fn union(&self, a: &Solid, b: &Solid) -> Result<Solid> {
        Union::new(a, b).execute()
    }

    fn volume(&self, solid: &Solid) -> Result<f64> {
        Volume::new(solid).execute()
    }

    fn bounding_volume(&self, solids: &[&Solid], points: &[Point3]) -> Option<Aabb> {
        BoundingBox::new()
            .with_solids(solids)
            .with_points(points)
            .execute()
    }

    fn transform_point(&self, point: &Point3, frame: &Frame) -> Point3 {
        TransformPoint::new(*point, *frame).execute()
    }

    fn transform_solid(&self, solid: &Solid, frame: &Frame) -> Solid {
        TransformSolid::new(solid, *frame).execute()
    }

    fn offset_extrude(&self, centerline: &Segment, section: &[Point2], offset: f64) -> Result<Solid> {
        OffsetExtrude::new(centerline, section, offset).execute()
    }

    fn contains_point(&self, solid: &Solid, point: &Point3) -> bool {
        PointInSolid::new(solid, *point).execute()
    }

    fn segment_inside(&self, solid: &Solid, segment: &Segment) -> Vec<Interval> {
        SegmentInside::new(solid, segment).execute()
    }
}
