pub mod hull_2d;
pub mod interval;
pub mod polygon_3d;

pub use interval::{complement_within, merge_intervals, Interval};

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Rigid transformation (rotation followed by translation).
pub type Isometry3 = nalgebra::Isometry3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-9;

/// Distance below which two points are considered coincident.
pub const POINT_TOLERANCE: f64 = 1e-6;

/// Volume below which a solid is considered empty.
pub const VOLUME_TOLERANCE: f64 = 1e-9;
