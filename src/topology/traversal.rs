use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use super::{RouteGraph, VertexId};

/// Hop count and centerline length of a path through a route graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathMetrics {
    pub hops: usize,
    pub length: f64,
}

/// Fewest-hop path from `from` to `to`, both ends included.
///
/// Edges are walked in either direction. Returns `None` if `to` is not
/// reachable or either id is stale.
#[must_use]
pub fn shortest_path(graph: &RouteGraph, from: VertexId, to: VertexId) -> Option<Vec<VertexId>> {
    if !graph.contains_vertex(from) || !graph.contains_vertex(to) {
        return None;
    }
    let mut previous: FxHashMap<VertexId, VertexId> = FxHashMap::default();
    let mut queue = VecDeque::from([from]);
    previous.insert(from, from);

    while let Some(current) = queue.pop_front() {
        if current == to {
            let mut path = vec![to];
            let mut cursor = to;
            while cursor != from {
                cursor = previous[&cursor];
                path.push(cursor);
            }
            path.reverse();
            return Some(path);
        }
        for next in graph.neighbors(current) {
            if let std::collections::hash_map::Entry::Vacant(slot) = previous.entry(next) {
                slot.insert(current);
                queue.push_back(next);
            }
        }
    }
    None
}

/// Metrics of the fewest-hop path from `from` to `root`.
#[must_use]
pub fn path_metrics(graph: &RouteGraph, from: VertexId, root: VertexId) -> Option<PathMetrics> {
    let path = shortest_path(graph, from, root)?;
    let length = path
        .windows(2)
        .map(|pair| {
            let a = graph.vertex(pair[0]).ok()?.location();
            let b = graph.vertex(pair[1]).ok()?.location();
            Some((b - a).norm())
        })
        .sum::<Option<f64>>()?;
    Some(PathMetrics {
        hops: path.len() - 1,
        length,
    })
}
