use thiserror::Error;

use crate::model::ElementId;

/// Top-level error type for the routing engine.
///
/// Only contract violations and malformed input travel through this type.
/// Absence (no collision, no free segment) is an empty result and validator
/// rejections are returned as data.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,

    #[error("geometry kernel failure: {0}")]
    Kernel(String),
}

/// Violations of the routing graph's invariants.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("vertex not found in graph")]
    VertexNotFound,

    #[error("edge not found in graph")]
    EdgeNotFound,

    #[error("element {0} is already anchored in the graph")]
    DuplicateAnchor(ElementId),

    #[error("edge endpoints must be distinct vertices")]
    SelfLoop,

    #[error("point does not lie strictly inside the edge")]
    PointNotOnEdge,
}

/// Errors raised while reading the host model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("element {0} not found")]
    ElementNotFound(ElementId),

    #[error("element {element} has no connector {port}")]
    PortOutOfRange { element: ElementId, port: usize },

    #[error("element {0} cannot seed a routing graph")]
    NotRoutable(ElementId),
}

/// Errors raised while loading or validating [`TraceSettings`](crate::settings::TraceSettings).
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Convenience type alias for results using [`TraceError`].
pub type Result<T> = std::result::Result<T, TraceError>;
