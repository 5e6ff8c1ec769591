pub mod edge;
pub mod traversal;
pub mod vertex;

pub use edge::{Edge, EdgeId};
pub use traversal::{path_metrics, shortest_path, PathMetrics};
pub use vertex::{Vertex, VertexId, VertexKind};

use rustc_hash::FxHashMap;
use slotmap::{SecondaryMap, SlotMap};

use crate::error::{Result, TopologyError};
use crate::geometry::Segment;
use crate::math::{Point3, POINT_TOLERANCE};
use crate::model::ElementId;

/// Directed graph of a routing network.
///
/// Vertices and edges live in slotmap arenas. Anchored vertices are also
/// indexed by element, so duplicate detection is O(1).
///
/// Invariants upheld by every mutating method:
/// - at most one anchored vertex per element;
/// - no edge joins a vertex to itself;
/// - at most one edge per (unordered vertex pair, tag).
#[derive(Debug, Clone)]
pub struct RouteGraph {
    vertices: SlotMap<VertexId, Vertex>,
    edges: SlotMap<EdgeId, Edge>,
    anchors: FxHashMap<ElementId, VertexId>,
    adjacency: SecondaryMap<VertexId, Vec<EdgeId>>,
    next_index: usize,
    tolerance: f64,
}

impl Default for RouteGraph {
    fn default() -> Self {
        Self::with_tolerance(POINT_TOLERANCE)
    }
}

impl RouteGraph {
    /// Creates an empty graph with the default coincidence tolerance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph whose free vertices coincide within `tolerance`.
    #[must_use]
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            vertices: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            anchors: FxHashMap::default(),
            adjacency: SecondaryMap::new(),
            next_index: 0,
            tolerance,
        }
    }

    /// Free-vertex coincidence tolerance.
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    // ── Vertices ───────────────────────────────────────────────

    /// Adds the vertex anchored to `element`.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::DuplicateAnchor`] if `element` already has a
    /// vertex.
    pub fn add_anchored_vertex(&mut self, element: ElementId, location: Point3) -> Result<VertexId> {
        if self.anchors.contains_key(&element) {
            return Err(TopologyError::DuplicateAnchor(element).into());
        }
        let id = self.push_vertex(VertexKind::Anchored(element), location);
        self.anchors.insert(element, id);
        Ok(id)
    }

    /// Adds a free vertex at `location`, or returns the free vertex already
    /// there.
    pub fn add_free_vertex(&mut self, location: Point3) -> VertexId {
        if let Some(existing) = self.find_free_vertex(&location) {
            return existing;
        }
        self.push_vertex(VertexKind::Free, location)
    }

    fn push_vertex(&mut self, kind: VertexKind, location: Point3) -> VertexId {
        let vertex = Vertex::new(self.next_index, kind, location, self.tolerance);
        self.next_index += 1;
        let id = self.vertices.insert(vertex);
        self.adjacency.insert(id, Vec::new());
        id
    }

    /// The vertex anchored to `element`, if any.
    #[must_use]
    pub fn anchored_vertex(&self, element: ElementId) -> Option<VertexId> {
        self.anchors.get(&element).copied()
    }

    /// The free vertex coinciding with `location`, if any.
    #[must_use]
    pub fn find_free_vertex(&self, location: &Point3) -> Option<VertexId> {
        self.vertices
            .iter()
            .find(|(_, v)| v.is_free() && v.is_at(location))
            .map(|(id, _)| id)
    }

    /// Returns a vertex.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::VertexNotFound`] for a stale id.
    pub fn vertex(&self, id: VertexId) -> Result<&Vertex> {
        self.vertices
            .get(id)
            .ok_or_else(|| TopologyError::VertexNotFound.into())
    }

    #[must_use]
    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertices.contains_key(id)
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Iterates over all vertices in arena order.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.vertices.iter()
    }

    // ── Edges ──────────────────────────────────────────────────

    /// Adds a directed edge, or returns the existing edge with the same
    /// endpoints (either direction) and tag.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::SelfLoop`] if `source == target` and
    /// [`TopologyError::VertexNotFound`] if either endpoint is stale.
    pub fn add_edge(&mut self, source: VertexId, target: VertexId, tag: Option<ElementId>) -> Result<EdgeId> {
        if source == target {
            return Err(TopologyError::SelfLoop.into());
        }
        if !self.contains_vertex(source) || !self.contains_vertex(target) {
            return Err(TopologyError::VertexNotFound.into());
        }
        if let Some(existing) = self
            .edges_at(source)
            .iter()
            .copied()
            .find(|e| self.edges[*e].joins(source, target) && self.edges[*e].tag == tag)
        {
            return Ok(existing);
        }
        let id = self.edges.insert(Edge { source, target, tag });
        for v in [source, target] {
            if let Some(list) = self.adjacency.get_mut(v) {
                list.push(id);
            }
        }
        Ok(id)
    }

    /// Returns an edge.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::EdgeNotFound`] for a stale id.
    pub fn edge(&self, id: EdgeId) -> Result<&Edge> {
        self.edges
            .get(id)
            .ok_or_else(|| TopologyError::EdgeNotFound.into())
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterates over all edges in arena order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter()
    }

    /// Edges incident to `vertex` (empty for a stale id).
    #[must_use]
    pub fn edges_at(&self, vertex: VertexId) -> &[EdgeId] {
        self.adjacency.get(vertex).map_or(&[], Vec::as_slice)
    }

    /// Vertices one edge away from `vertex`.
    #[must_use]
    pub fn neighbors(&self, vertex: VertexId) -> Vec<VertexId> {
        self.edges_at(vertex)
            .iter()
            .filter_map(|e| self.edges.get(*e)?.opposite(vertex))
            .collect()
    }

    /// Edges lying on the run `tag`, in arena order.
    #[must_use]
    pub fn edges_with_tag(&self, tag: ElementId) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|(_, e)| e.tag == Some(tag))
            .map(|(id, _)| id)
            .collect()
    }

    /// An edge joining `a` and `b` in either direction.
    #[must_use]
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.edges_at(a)
            .iter()
            .copied()
            .find(|e| self.edges[*e].joins(a, b))
    }

    /// Removes an edge; its endpoints stay in the graph.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::EdgeNotFound`] for a stale id.
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<Edge> {
        let edge = self.edges.remove(id).ok_or(TopologyError::EdgeNotFound)?;
        for v in [edge.source, edge.target] {
            if let Some(list) = self.adjacency.get_mut(v) {
                list.retain(|e| *e != id);
            }
        }
        Ok(edge)
    }

    /// Straight centerline from the edge's source to its target.
    ///
    /// # Errors
    ///
    /// Returns an error for a stale edge id.
    pub fn segment(&self, id: EdgeId) -> Result<Segment> {
        let edge = self.edge(id)?;
        Ok(Segment::new(
            *self.vertex(edge.source)?.location(),
            *self.vertex(edge.target)?.location(),
        ))
    }

    // ── Insertion ──────────────────────────────────────────────

    /// Replaces `edge` by two edges through `vertex`, keeping its tag and
    /// direction.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::PointNotOnEdge`] if `vertex` does not lie
    /// strictly between the edge's endpoints, or a lookup error for stale ids.
    pub fn split_edge(&mut self, edge: EdgeId, vertex: VertexId) -> Result<(EdgeId, EdgeId)> {
        let location = *self.vertex(vertex)?.location();
        if !self.lies_inside(edge, &location)? {
            return Err(TopologyError::PointNotOnEdge.into());
        }
        let Edge { source, target, tag } = self.remove_edge(edge)?;
        let first = self.add_edge(source, vertex, tag)?;
        let second = self.add_edge(vertex, target, tag)?;
        Ok((first, second))
    }

    /// Inserts a free vertex at `point` on `edge`, splitting the edge.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::PointNotOnEdge`] if `point` is off the edge
    /// or coincides with one of its ends.
    pub fn insert_point(&mut self, edge: EdgeId, point: Point3) -> Result<VertexId> {
        if !self.lies_inside(edge, &point)? {
            return Err(TopologyError::PointNotOnEdge.into());
        }
        let vertex = self.add_free_vertex(point);
        self.split_edge(edge, vertex)?;
        Ok(vertex)
    }

    fn lies_inside(&self, edge: EdgeId, point: &Point3) -> Result<bool> {
        let segment = self.segment(edge)?;
        let t = segment.parameter_of(point);
        Ok(segment.contains(point, self.tolerance)
            && t > self.tolerance
            && t < segment.length() - self.tolerance)
    }

    // ── Merging ────────────────────────────────────────────────

    /// Copies `other` into this graph.
    ///
    /// Anchored vertices are matched by element and free vertices by
    /// proximity; edges already present are not duplicated. Returns the
    /// mapping from `other`'s vertex ids to ids in this graph.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::SelfLoop`] if two endpoints of an edge in
    /// `other` collapse onto the same vertex here.
    pub fn merge(&mut self, other: &RouteGraph) -> Result<FxHashMap<VertexId, VertexId>> {
        let mut mapping = FxHashMap::default();
        for (id, vertex) in other.vertices() {
            let mapped = match vertex.kind() {
                VertexKind::Anchored(element) => match self.anchored_vertex(element) {
                    Some(existing) => existing,
                    None => self.add_anchored_vertex(element, *vertex.location())?,
                },
                VertexKind::Free => self.add_free_vertex(*vertex.location()),
            };
            mapping.insert(id, mapped);
        }
        for (_, edge) in other.edges() {
            let source = *mapping.get(&edge.source).ok_or(TopologyError::VertexNotFound)?;
            let target = *mapping.get(&edge.target).ok_or(TopologyError::VertexNotFound)?;
            self.add_edge(source, target, edge.tag)?;
        }
        Ok(mapping)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::TraceError;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    // ── Invariants ─────────────────────────────────────────────

    #[test]
    fn duplicate_anchor_is_fatal() {
        let mut g = RouteGraph::new();
        g.add_anchored_vertex(ElementId(1), p(0.0, 0.0, 0.0)).unwrap();
        let err = g.add_anchored_vertex(ElementId(1), p(5.0, 0.0, 0.0)).unwrap_err();
        assert!(matches!(
            err,
            TraceError::Topology(TopologyError::DuplicateAnchor(ElementId(1)))
        ));
        assert_eq!(g.vertex_count(), 1);
    }

    #[test]
    fn self_loop_is_fatal() {
        let mut g = RouteGraph::new();
        let v = g.add_free_vertex(p(0.0, 0.0, 0.0));
        assert!(matches!(
            g.add_edge(v, v, None),
            Err(TraceError::Topology(TopologyError::SelfLoop))
        ));
    }

    #[test]
    fn free_vertices_are_reused_by_proximity() {
        let mut g = RouteGraph::with_tolerance(1e-3);
        let a = g.add_free_vertex(p(0.0, 0.0, 0.0));
        let b = g.add_free_vertex(p(0.0, 5e-4, 0.0));
        assert_eq!(a, b);
        assert_eq!(g.vertex_count(), 1);
    }

    #[test]
    fn parallel_edges_are_not_duplicated() {
        let mut g = RouteGraph::new();
        let a = g.add_free_vertex(p(0.0, 0.0, 0.0));
        let b = g.add_free_vertex(p(1.0, 0.0, 0.0));
        let e1 = g.add_edge(a, b, Some(ElementId(3))).unwrap();
        let e2 = g.add_edge(b, a, Some(ElementId(3))).unwrap();
        let e3 = g.add_edge(a, b, None).unwrap();
        assert_eq!(e1, e2);
        assert_ne!(e1, e3);
        assert_eq!(g.edge_count(), 2);
    }

    // ── Insertion ──────────────────────────────────────────────

    #[test]
    fn insert_point_splits_tagged_edge() {
        let mut g = RouteGraph::new();
        let a = g.add_anchored_vertex(ElementId(10), p(0.0, 0.0, 0.0)).unwrap();
        let b = g.add_free_vertex(p(3000.0, 0.0, 0.0));
        let e = g.add_edge(a, b, Some(ElementId(7))).unwrap();
        let original = g.segment(e).unwrap();

        let mid = p(1200.0, 0.0, 0.0);
        let v = g.insert_point(e, mid).unwrap();
        assert_relative_eq!(*g.vertex(v).unwrap().location(), mid);
        assert!(g.edge(e).is_err());

        let parts = g.edges_with_tag(ElementId(7));
        assert_eq!(parts.len(), 2);
        let first = g.find_edge(a, v).unwrap();
        let second = g.find_edge(v, b).unwrap();
        assert_eq!(g.edge(first).unwrap().source, a);
        assert_eq!(g.edge(second).unwrap().target, b);

        let s1 = g.segment(first).unwrap();
        let s2 = g.segment(second).unwrap();
        assert_relative_eq!(*s1.start(), *original.start());
        assert_relative_eq!(*s1.end(), *s2.start());
        assert_relative_eq!(*s2.end(), *original.end());
        assert_relative_eq!(s1.length() + s2.length(), original.length(), epsilon = 1e-9);
    }

    #[test]
    fn insert_point_rejects_ends_and_off_edge_points() {
        let mut g = RouteGraph::new();
        let a = g.add_free_vertex(p(0.0, 0.0, 0.0));
        let b = g.add_free_vertex(p(10.0, 0.0, 0.0));
        let e = g.add_edge(a, b, None).unwrap();
        assert!(g.insert_point(e, p(0.0, 0.0, 0.0)).is_err());
        assert!(g.insert_point(e, p(5.0, 1.0, 0.0)).is_err());
        assert!(g.insert_point(e, p(12.0, 0.0, 0.0)).is_err());
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.vertex_count(), 2);
    }

    #[test]
    fn remove_edge_updates_adjacency() {
        let mut g = RouteGraph::new();
        let a = g.add_free_vertex(p(0.0, 0.0, 0.0));
        let b = g.add_free_vertex(p(1.0, 0.0, 0.0));
        let e = g.add_edge(a, b, None).unwrap();
        assert_eq!(g.neighbors(a), vec![b]);
        g.remove_edge(e).unwrap();
        assert!(g.neighbors(a).is_empty());
        assert!(g.remove_edge(e).is_err());
    }

    // ── Merging ────────────────────────────────────────────────

    #[test]
    fn merge_reuses_anchors_and_free_points() {
        let mut held = RouteGraph::new();
        let j = held.add_anchored_vertex(ElementId(1), p(0.0, 0.0, 0.0)).unwrap();
        let end = held.add_free_vertex(p(10.0, 0.0, 0.0));
        held.add_edge(j, end, Some(ElementId(2))).unwrap();

        let mut session = RouteGraph::new();
        let j2 = session.add_anchored_vertex(ElementId(1), p(0.0, 0.0, 0.0)).unwrap();
        let end2 = session.add_free_vertex(p(10.0, 0.0, 0.0));
        let other = session.add_free_vertex(p(0.0, 10.0, 0.0));
        session.add_edge(j2, end2, Some(ElementId(2))).unwrap();
        session.add_edge(j2, other, Some(ElementId(3))).unwrap();

        let mapping = held.merge(&session).unwrap();
        assert_eq!(mapping[&j2], j);
        assert_eq!(mapping[&end2], end);
        assert_eq!(held.vertex_count(), 3);
        assert_eq!(held.edge_count(), 2);
    }
}
