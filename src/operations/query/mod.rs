mod bounding_box;
mod containment;
mod projection;
mod volume;

pub use bounding_box::BoundingBox;
pub use containment::{PointInSolid, SegmentInside};
pub use projection::ProjectOntoSegment;
pub use volume::Volume;
