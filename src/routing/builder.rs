use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, instrument, trace, warn};

use crate::error::{ModelError, Result};
use crate::model::{BranchRelation, Element, ElementId, ElementKind};
use crate::topology::{RouteGraph, VertexId};

use super::context::RoutingContext;

/// Progress of a [`GraphBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    /// No seed yet.
    Empty,
    /// The seed vertex exists; nothing has been expanded.
    Seeded,
    /// At least one frontier vertex has been expanded.
    Expanding,
    /// The frontier is empty.
    Done,
}

/// Neighbour identities and run tags already handled at one junction.
#[derive(Debug, Default)]
struct ClosedSet {
    neighbors: FxHashSet<ElementId>,
    tags: FxHashSet<ElementId>,
}

/// Expands a [`RouteGraph`] outward from a seed element.
///
/// Junctions become anchored vertices and are expanded breadth-first from a
/// frontier queue. Runs between them become tagged edges; runs joined
/// directly to runs become chains of tagged edges through free vertices.
/// Open ends, unconnected junction ports and non-routing elements end a
/// branch at a free vertex.
///
/// Every junction enters the frontier once (when its vertex is created) and
/// every run is followed once, so expansion terminates on networks with
/// loops.
pub struct GraphBuilder<'a> {
    ctx: RoutingContext<'a>,
    graph: RouteGraph,
    state: BuildState,
    frontier: VecDeque<VertexId>,
    closed: FxHashMap<ElementId, ClosedSet>,
    visited_runs: FxHashSet<ElementId>,
    exclude_child_branches: bool,
}

impl<'a> GraphBuilder<'a> {
    /// Creates a builder over the context's element provider.
    #[must_use]
    pub fn new(ctx: RoutingContext<'a>) -> Self {
        Self {
            ctx,
            graph: RouteGraph::with_tolerance(ctx.settings.vertex_tolerance()),
            state: BuildState::Empty,
            frontier: VecDeque::new(),
            closed: FxHashMap::default(),
            visited_runs: FxHashSet::default(),
            exclude_child_branches: false,
        }
    }

    /// Skips connectors marked [`BranchRelation::Child`] on junctions.
    #[must_use]
    pub fn excluding_child_branches(mut self) -> Self {
        self.exclude_child_branches = true;
        self
    }

    #[must_use]
    pub fn state(&self) -> BuildState {
        self.state
    }

    /// The graph built so far.
    #[must_use]
    pub fn graph(&self) -> &RouteGraph {
        &self.graph
    }

    #[must_use]
    pub fn into_graph(self) -> RouteGraph {
        self.graph
    }

    /// Builds the whole graph reachable from `seed`.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] if the seed is missing or is not a junction
    /// or run, and propagates graph invariant violations.
    #[instrument(skip_all, fields(seed = %seed))]
    pub fn build(mut self, seed: ElementId) -> Result<RouteGraph> {
        self.seed(seed)?;
        let mut steps = 0_usize;
        while self.step()? {
            steps += 1;
        }
        debug!(
            steps,
            vertices = self.graph.vertex_count(),
            edges = self.graph.edge_count(),
            "graph built"
        );
        Ok(self.graph)
    }

    // ── Seeding ────────────────────────────────────────────────

    /// Creates the first vertex from `seed`, discarding any previous state.
    ///
    /// A junction seed is anchored and queued. A run seed is resolved to the
    /// first junction found along its chain; if neither direction reaches a
    /// junction the free chain is built immediately and the builder is done.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ElementNotFound`] or [`ModelError::NotRoutable`].
    pub fn seed(&mut self, seed: ElementId) -> Result<()> {
        self.graph = RouteGraph::with_tolerance(self.ctx.settings.vertex_tolerance());
        self.frontier.clear();
        self.closed.clear();
        self.visited_runs.clear();

        let element = self.fetch(seed)?;
        match &element.kind {
            ElementKind::Junction { .. } => {
                self.anchor(&element)?;
                self.state = BuildState::Seeded;
            }
            ElementKind::Run { .. } => {
                let end = [0, 1]
                    .into_iter()
                    .find_map(|port| self.chain_end(&element, port));
                if let Some((junction, adjacent)) = end {
                    debug!(junction = %junction.id, "run seed resolved to junction");
                    // Expansion may filter the seed's connector out.
                    let vertex = self.anchor(&junction)?;
                    self.close(junction.id, adjacent.id);
                    if let Some(entry) = run_entry(&adjacent, junction.id) {
                        self.follow_run(vertex, adjacent, entry)?;
                    }
                    self.state = BuildState::Seeded;
                } else {
                    debug!("run seed has no junction, building free chain");
                    self.build_free_chain(&element)?;
                    self.state = BuildState::Done;
                }
            }
            ElementKind::Other => return Err(ModelError::NotRoutable(seed).into()),
        }
        Ok(())
    }

    /// Follows runs out of `run`'s connector `port` and returns the first
    /// junction reached, if any, with the run joined to it.
    fn chain_end(&self, run: &Element, port: usize) -> Option<(Element, Element)> {
        let mut seen = FxHashSet::default();
        let mut current = run.clone();
        let mut exit = port;
        loop {
            seen.insert(current.id);
            let next = self.ctx.elements.element(current.connectors.get(exit)?.connected_to?)?;
            match next.kind {
                ElementKind::Junction { .. } => return Some((next, current)),
                ElementKind::Run { .. } if !seen.contains(&next.id) => {
                    exit = 1 - run_entry(&next, current.id)?;
                    current = next;
                }
                _ => return None,
            }
        }
    }

    /// Builds a junction-free chain of runs through `seed`.
    fn build_free_chain(&mut self, seed: &Element) -> Result<()> {
        // Walk backwards to the head of the chain so edges come out in
        // connector order.
        let mut head = seed.clone();
        let mut entry = 0;
        let mut seen = FxHashSet::default();
        seen.insert(head.id);
        while let Some(prev) = head
            .connectors
            .get(entry)
            .and_then(|c| c.connected_to)
            .and_then(|id| self.ctx.elements.element(id))
        {
            if !matches!(prev.kind, ElementKind::Run { .. }) || seen.contains(&prev.id) {
                break;
            }
            let Some(prev_entry) = run_entry(&prev, head.id) else {
                break;
            };
            seen.insert(prev.id);
            entry = 1 - prev_entry;
            head = prev;
        }
        let Some(start) = head.connectors.get(entry) else {
            warn!(run = %head.id, "run has no connectors");
            return Ok(());
        };
        let start = self.graph.add_free_vertex(start.origin);
        self.follow_run(start, head, entry)
    }

    // ── Expansion ──────────────────────────────────────────────

    /// Expands the vertex at the front of the frontier.
    ///
    /// Returns `false` once the frontier is empty.
    ///
    /// # Errors
    ///
    /// Propagates graph invariant violations.
    pub fn step(&mut self) -> Result<bool> {
        let Some(vertex) = self.frontier.pop_front() else {
            self.state = match self.state {
                BuildState::Empty => BuildState::Empty,
                _ => BuildState::Done,
            };
            return Ok(false);
        };
        self.state = BuildState::Expanding;

        let Some(junction_id) = self.graph.vertex(vertex)?.anchor() else {
            return Ok(true);
        };
        let Some(junction) = self.ctx.elements.element(junction_id) else {
            warn!(junction = %junction_id, "frontier junction vanished from model");
            return Ok(true);
        };
        debug!(junction = %junction_id, ports = junction.connectors.len(), "expanding");

        for connector in &junction.connectors {
            if self.exclude_child_branches && connector.relation == BranchRelation::Child {
                trace!(junction = %junction_id, "child branch excluded");
                continue;
            }
            let Some(neighbor_id) = connector.connected_to else {
                let port = self.graph.add_free_vertex(connector.origin);
                self.graph.add_edge(vertex, port, None)?;
                continue;
            };
            if self.is_closed(junction_id, neighbor_id) {
                trace!(junction = %junction_id, neighbor = %neighbor_id, "already closed");
                continue;
            }
            self.close(junction_id, neighbor_id);

            let Some(neighbor) = self.ctx.elements.element(neighbor_id) else {
                warn!(junction = %junction_id, neighbor = %neighbor_id, "dangling connection");
                let port = self.graph.add_free_vertex(connector.origin);
                self.graph.add_edge(vertex, port, None)?;
                continue;
            };
            match neighbor.kind {
                ElementKind::Junction { .. } => {
                    let other = self.anchor(&neighbor)?;
                    self.close(neighbor_id, junction_id);
                    self.graph.add_edge(vertex, other, None)?;
                }
                ElementKind::Run { .. } => {
                    if self.visited_runs.contains(&neighbor_id) {
                        continue;
                    }
                    let Some(entry) = run_entry(&neighbor, junction_id) else {
                        warn!(run = %neighbor_id, junction = %junction_id, "run does not connect back");
                        continue;
                    };
                    self.follow_run(vertex, neighbor, entry)?;
                }
                ElementKind::Other => {
                    let port = self.graph.add_free_vertex(connector.origin);
                    self.graph.add_edge(vertex, port, None)?;
                }
            }
        }
        Ok(true)
    }

    /// Walks a chain of runs entered through connector `entry` of `run`,
    /// starting at vertex `from`, adding one tagged edge per run.
    fn follow_run(&mut self, from: VertexId, run: Element, entry: usize) -> Result<()> {
        let mut current = from;
        let mut run = run;
        let mut entry = entry;
        loop {
            if !self.visited_runs.insert(run.id) {
                return Ok(());
            }
            if run.connectors.len() != 2 {
                warn!(run = %run.id, connectors = run.connectors.len(), "run must have two connectors");
                return Ok(());
            }
            let exit = 1 - entry;
            let far = &run.connectors[exit];
            let next = far.connected_to.and_then(|id| self.ctx.elements.element(id));

            let (far_vertex, continue_with) = match next {
                Some(next) if next.is_junction() => {
                    let v = self.anchor(&next)?;
                    self.close(next.id, run.id);
                    (v, None)
                }
                Some(next) if matches!(next.kind, ElementKind::Run { .. }) => {
                    let v = self.graph.add_free_vertex(far.origin);
                    let next_entry = run_entry(&next, run.id);
                    (v, next_entry.map(|e| (next, e)))
                }
                _ => (self.graph.add_free_vertex(far.origin), None),
            };

            if far_vertex == current {
                warn!(run = %run.id, "run starts and ends at the same vertex");
            } else if entry == 0 {
                self.graph.add_edge(current, far_vertex, Some(run.id))?;
            } else {
                self.graph.add_edge(far_vertex, current, Some(run.id))?;
            }
            trace!(run = %run.id, "run followed");

            match continue_with {
                Some((next, next_entry)) => {
                    current = far_vertex;
                    run = next;
                    entry = next_entry;
                }
                None => return Ok(()),
            }
        }
    }

    // ── Bookkeeping ────────────────────────────────────────────

    /// Returns the vertex of `junction`, creating and queueing it if new.
    fn anchor(&mut self, junction: &Element) -> Result<VertexId> {
        if let Some(existing) = self.graph.anchored_vertex(junction.id) {
            return Ok(existing);
        }
        let id = self.graph.add_anchored_vertex(junction.id, junction.origin)?;
        self.frontier.push_back(id);
        trace!(junction = %junction.id, "anchored");
        Ok(id)
    }

    fn is_closed(&self, junction: ElementId, neighbor: ElementId) -> bool {
        self.closed
            .get(&junction)
            .is_some_and(|c| c.neighbors.contains(&neighbor) || c.tags.contains(&neighbor))
    }

    fn close(&mut self, junction: ElementId, neighbor: ElementId) {
        let set = self.closed.entry(junction).or_default();
        set.neighbors.insert(neighbor);
        if self.visited_runs.contains(&neighbor) {
            set.tags.insert(neighbor);
        }
    }

    fn fetch(&self, id: ElementId) -> Result<Element> {
        self.ctx
            .elements
            .element(id)
            .ok_or_else(|| ModelError::ElementNotFound(id).into())
    }
}

/// Connector index through which `run` is joined to `from`, if it is a
/// two-connector run.
fn run_entry(run: &Element, from: ElementId) -> Option<usize> {
    if run.connectors.len() != 2 {
        return None;
    }
    run.port_to(from)
}
