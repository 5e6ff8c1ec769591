use crate::math::Point3;
use crate::model::ElementId;

slotmap::new_key_type! {
    /// Unique identifier for a vertex in a route graph.
    pub struct VertexId;
}

/// What a vertex stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexKind {
    /// A junction or fitting with a stable host identity.
    Anchored(ElementId),
    /// An open run end or a point inserted mid-run.
    Free,
}

/// A node of a route graph.
///
/// Equality ignores the graph index: anchored vertices are equal when they
/// share an element, free vertices when their locations are within the
/// larger of the two tolerances. Proximity equality is not transitive.
#[derive(Debug, Clone)]
pub struct Vertex {
    index: usize,
    kind: VertexKind,
    location: Point3,
    tolerance: f64,
}

impl Vertex {
    pub(crate) fn new(index: usize, kind: VertexKind, location: Point3, tolerance: f64) -> Self {
        Self {
            index,
            kind,
            location,
            tolerance,
        }
    }

    /// Graph-local insertion index, for bookkeeping and diagnostics only.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn kind(&self) -> VertexKind {
        self.kind
    }

    /// Location in the active model.
    #[must_use]
    pub fn location(&self) -> &Point3 {
        &self.location
    }

    /// The anchoring element, if any.
    #[must_use]
    pub fn anchor(&self) -> Option<ElementId> {
        match self.kind {
            VertexKind::Anchored(id) => Some(id),
            VertexKind::Free => None,
        }
    }

    #[must_use]
    pub fn is_free(&self) -> bool {
        self.kind == VertexKind::Free
    }

    /// Returns `true` if this free vertex sits at `point`.
    #[must_use]
    pub fn is_at(&self, point: &Point3) -> bool {
        (self.location - point).norm() <= self.tolerance
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        match (self.kind, other.kind) {
            (VertexKind::Anchored(a), VertexKind::Anchored(b)) => a == b,
            (VertexKind::Free, VertexKind::Free) => {
                (self.location - other.location).norm() <= self.tolerance.max(other.tolerance)
            }
            _ => false,
        }
    }
}
