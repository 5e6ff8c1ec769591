use crate::model::ElementId;

use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for an edge in a route graph.
    pub struct EdgeId;
}

/// A directed connection between two distinct vertices.
///
/// A tagged edge lies on the run named by `tag`, oriented from the run's
/// first connector to its second. Untagged edges are purely topological
/// links (fitting to fitting, fitting to an open port).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Start vertex of the edge.
    pub source: VertexId,
    /// End vertex of the edge.
    pub target: VertexId,
    /// Backing run, if any.
    pub tag: Option<ElementId>,
}

impl Edge {
    /// The endpoint opposite `vertex`, or `None` if `vertex` is not on the edge.
    #[must_use]
    pub fn opposite(&self, vertex: VertexId) -> Option<VertexId> {
        if vertex == self.source {
            Some(self.target)
        } else if vertex == self.target {
            Some(self.source)
        } else {
            None
        }
    }

    /// Returns `true` if the edge joins `a` and `b` in either direction.
    #[must_use]
    pub fn joins(&self, a: VertexId, b: VertexId) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}
