//! Engine components that reason over a network and the world around it.

pub mod builder;
pub mod collision;
pub mod context;
pub mod resolver;
pub mod segments;
pub mod validators;

#[cfg(test)]
pub(crate) mod test_support;

pub use builder::{BuildState, GraphBuilder};
pub use collision::{Collision, CollisionDetector};
pub use context::RoutingContext;
pub use resolver::{Endpoint, PathResolution, PathResolver, Resolution};
pub use segments::SegmentExtractor;
pub use validators::{
    AngleValidator, BoundingRegionValidator, Candidate, CategoryExclusionValidator, CollisionValidator,
    ConnectionValidator, FloorClearanceValidator, FreeSegmentValidator, LimitsValidator, Outcome, Placement,
    ValidationReport, Validator, ValidatorChain, Verdict,
};
