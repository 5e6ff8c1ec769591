pub mod aabb;
pub mod cell;
pub mod frame;
pub mod plane;
pub mod segment;
pub mod solid;

pub use aabb::Aabb;
pub use cell::ConvexCell;
pub use frame::Frame;
pub use plane::Plane;
pub use segment::Segment;
pub use solid::Solid;
