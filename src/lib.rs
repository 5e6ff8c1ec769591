//! Spatial routing graph engine for connected building-service runs.
//!
//! The engine reasons about the topology of a duct, pipe or tray network and
//! the 3D occupancy of everything around it:
//!
//! - [`routing::GraphBuilder`] expands a [`topology::RouteGraph`] from a seed element.
//! - [`routing::CollisionDetector`] finds solid intersections against local and
//!   linked geometry.
//! - [`routing::SegmentExtractor`] reduces an edge to its unobstructed sub-intervals.
//! - [`routing::PathResolver`] inserts validated endpoints into a graph.
//!
//! The host application is reached only through the traits in [`model`] and
//! the [`kernel::GeometryKernel`] contract.

pub mod error;
pub mod geometry;
pub mod kernel;
pub mod math;
pub mod model;
pub mod operations;
pub mod routing;
pub mod settings;
pub mod topology;

pub use error::{Result, TraceError};
pub use kernel::{ConvexKernel, GeometryKernel};
pub use settings::TraceSettings;
