mod general;

pub use general::{TransformPoint, TransformSolid};
