use std::fmt;

use rustc_hash::FxHashSet;
use tracing::trace;

use crate::error::Result;
use crate::geometry::{Aabb, Frame, Segment, Solid};
use crate::math::Point3;
use crate::model::{Category, CategoryFilter, ElementId, SolidRef, WorldSolid};
use crate::topology::{path_metrics, EdgeId, RouteGraph, VertexId};

use super::collision::CollisionDetector;
use super::context::RoutingContext;
use super::segments::SegmentExtractor;

// ── Candidates ─────────────────────────────────────────────────

/// Where a candidate vertex goes in the graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// A new vertex on its own.
    Standalone,
    /// A new vertex splitting an existing edge.
    OnEdge(EdgeId),
}

/// A vertex proposed for insertion, described without touching the graph.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub location: Point3,
    /// Junction the vertex is anchored to; `None` for a free vertex.
    pub anchor: Option<ElementId>,
    /// Element the location was picked on, if any.
    pub element: Option<ElementId>,
    pub placement: Placement,
    /// Existing vertex the new one will be joined to by an untagged edge.
    pub connect_from: Option<VertexId>,
    /// Elements the candidate attaches to; never reported as obstructions.
    pub attach_to: Vec<ElementId>,
    /// Solid occupied by the placement; a bare point when `None`.
    pub footprint: Option<Solid>,
}

impl Candidate {
    /// A free vertex at `location`.
    #[must_use]
    pub fn free(location: Point3) -> Self {
        Self {
            location,
            anchor: None,
            element: None,
            placement: Placement::Standalone,
            connect_from: None,
            attach_to: Vec::new(),
            footprint: None,
        }
    }

    /// Describes a vertex already in `graph`, attached to the runs that meet
    /// there. Applying it reuses the vertex.
    ///
    /// # Errors
    ///
    /// Returns a topology error if `vertex` is not in `graph`.
    pub fn existing(graph: &RouteGraph, vertex: VertexId) -> Result<Self> {
        let record = graph.vertex(vertex)?;
        let mut candidate = match record.anchor() {
            Some(junction) => Self::anchored(junction, *record.location()),
            None => Self::free(*record.location()),
        };
        for edge in graph.edges_at(vertex) {
            candidate.attach_to.extend(graph.edge(*edge)?.tag);
        }
        Ok(candidate)
    }

    /// A vertex anchored to `junction` at `location`.
    #[must_use]
    pub fn anchored(junction: ElementId, location: Point3) -> Self {
        Self {
            anchor: Some(junction),
            element: Some(junction),
            ..Self::free(location)
        }
    }

    #[must_use]
    pub fn with_element(mut self, element: ElementId) -> Self {
        self.element = Some(element);
        self
    }

    #[must_use]
    pub fn on_edge(mut self, edge: EdgeId) -> Self {
        self.placement = Placement::OnEdge(edge);
        self
    }

    #[must_use]
    pub fn connected_from(mut self, vertex: VertexId) -> Self {
        self.connect_from = Some(vertex);
        self
    }

    #[must_use]
    pub fn attached_to(mut self, element: ElementId) -> Self {
        self.attach_to.push(element);
        self
    }

    #[must_use]
    pub fn with_footprint(mut self, footprint: Solid) -> Self {
        self.footprint = Some(footprint);
        self
    }

    /// Inserts the candidate into `graph` and returns its vertex.
    ///
    /// # Errors
    ///
    /// Propagates graph invariant violations, e.g. a duplicate anchor or a
    /// location that is not strictly inside the target edge.
    pub fn apply_to(&self, graph: &mut RouteGraph) -> Result<VertexId> {
        let vertex = match (self.placement, self.anchor) {
            (Placement::OnEdge(edge), None) => graph.insert_point(edge, self.location)?,
            (Placement::OnEdge(edge), Some(junction)) => {
                let v = graph.add_anchored_vertex(junction, self.location)?;
                graph.split_edge(edge, v)?;
                v
            }
            (Placement::Standalone, None) => graph.add_free_vertex(self.location),
            (Placement::Standalone, Some(junction)) => match graph.anchored_vertex(junction) {
                Some(existing) => existing,
                None => graph.add_anchored_vertex(junction, self.location)?,
            },
        };
        if let Some(from) = self.connect_from {
            if from != vertex {
                graph.add_edge(from, vertex, None)?;
            }
        }
        Ok(vertex)
    }

    /// Elements that must not count against the candidate: everything it
    /// attaches to, the run it splits, whatever meets at the vertex it
    /// connects from and, for junctions among those, their connected runs.
    fn attachments(&self, graph: &RouteGraph, ctx: &RoutingContext<'_>) -> FxHashSet<SolidRef> {
        let mut direct: Vec<ElementId> = self.attach_to.clone();
        direct.extend(self.anchor);
        direct.extend(self.element);
        if let Placement::OnEdge(edge) = self.placement {
            direct.extend(graph.edge(edge).ok().and_then(|e| e.tag));
        }
        if let Some(from) = self.connect_from {
            direct.extend(graph.vertex(from).ok().and_then(|v| v.anchor()));
            direct.extend(
                graph
                    .edges_at(from)
                    .iter()
                    .filter_map(|e| graph.edge(*e).ok().and_then(|e| e.tag)),
            );
        }

        let mut out: FxHashSet<SolidRef> = direct.iter().copied().map(SolidRef::from).collect();
        for id in direct {
            if let Some(element) = ctx.elements.element(id).filter(|e| e.is_junction()) {
                out.extend(element.neighbors().map(SolidRef::from));
            }
        }
        out
    }
}

// ── Verdicts ───────────────────────────────────────────────────

/// Result of one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail(String),
}

/// A rule's outcome, labelled with the rule's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub rule: &'static str,
    pub outcome: Outcome,
}

/// Every verdict for one candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    verdicts: Vec<Verdict>,
}

impl ValidationReport {
    /// A report holding a single failure.
    #[must_use]
    pub fn failure(rule: &'static str, reason: impl Into<String>) -> Self {
        Self {
            verdicts: vec![Verdict {
                rule,
                outcome: Outcome::Fail(reason.into()),
            }],
        }
    }

    pub fn push(&mut self, verdict: Verdict) {
        self.verdicts.push(verdict);
    }

    #[must_use]
    pub fn verdicts(&self) -> &[Verdict] {
        &self.verdicts
    }

    /// Returns `true` if no rule failed.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.verdicts.iter().all(|v| v.outcome == Outcome::Pass)
    }

    /// `(rule, reason)` for every failed rule, in chain order.
    pub fn failures(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.verdicts.iter().filter_map(|v| match &v.outcome {
            Outcome::Pass => None,
            Outcome::Fail(reason) => Some((v.rule, reason.as_str())),
        })
    }

    /// Failure reasons prefixed by their rule, ready to show a user.
    #[must_use]
    pub fn reasons(&self) -> Vec<String> {
        self.failures()
            .map(|(rule, reason)| format!("{rule}: {reason}"))
            .collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_accepted() {
            return f.write_str("accepted");
        }
        f.write_str(&self.reasons().join("; "))
    }
}

// ── Chain ──────────────────────────────────────────────────────

/// An acceptance rule for candidate vertices.
pub trait Validator {
    /// Short rule name used in reports.
    fn name(&self) -> &'static str;

    /// Judges `candidate` against the current graph and world.
    fn validate(&self, candidate: &Candidate, graph: &RouteGraph, ctx: &RoutingContext<'_>) -> Outcome;

    /// Whether the rule judges the connection from `connect_from` rather
    /// than the candidate's own placement. Only these rules run when a path
    /// joins two vertices that already exist.
    fn judges_connection(&self) -> bool {
        false
    }
}

/// An ordered list of validators. Every validator runs, even after a
/// failure, so a report lists all violations at once.
#[derive(Default)]
pub struct ValidatorChain {
    validators: Vec<Box<dyn Validator>>,
}

impl ValidatorChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a validator.
    #[must_use]
    pub fn with(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Runs every validator against `candidate`.
    #[must_use]
    pub fn run(&self, candidate: &Candidate, graph: &RouteGraph, ctx: &RoutingContext<'_>) -> ValidationReport {
        self.run_where(candidate, graph, ctx, |_| true)
    }

    /// Runs only the validators that judge connections.
    #[must_use]
    pub fn run_connection_rules(
        &self,
        candidate: &Candidate,
        graph: &RouteGraph,
        ctx: &RoutingContext<'_>,
    ) -> ValidationReport {
        self.run_where(candidate, graph, ctx, |v| v.judges_connection())
    }

    fn run_where<F>(&self, candidate: &Candidate, graph: &RouteGraph, ctx: &RoutingContext<'_>, keep: F) -> ValidationReport
    where
        F: Fn(&dyn Validator) -> bool,
    {
        let mut report = ValidationReport::default();
        for validator in self.validators.iter().filter(|v| keep(v.as_ref())) {
            let outcome = validator.validate(candidate, graph, ctx);
            trace!(rule = validator.name(), ?outcome, "validated");
            report.push(Verdict {
                rule: validator.name(),
                outcome,
            });
        }
        report
    }
}

// ── World probing ──────────────────────────────────────────────

/// First world solid, local or linked, for which `hit` holds. `hit` gets the
/// solid and the frame mapping active-model coordinates into its model.
fn find_in_world<F>(
    ctx: &RoutingContext<'_>,
    filter: &CategoryFilter,
    excluded: &FxHashSet<SolidRef>,
    mut hit: F,
) -> Option<(SolidRef, WorldSolid)>
where
    F: FnMut(&Solid, &Frame) -> bool,
{
    let host = Frame::identity();
    for candidate in ctx.world.local_solids(filter) {
        let id = SolidRef::from(candidate.element);
        if excluded.contains(&id) {
            continue;
        }
        if candidate.solid.as_ref().is_some_and(|s| hit(s, &host)) {
            return Some((id, candidate));
        }
    }
    for link in ctx.world.linked_models(filter) {
        let to_local = link.frame.inverse();
        for candidate in link.solids {
            let id = SolidRef::linked(link.id, candidate.element);
            if excluded.contains(&id) {
                continue;
            }
            if candidate.solid.as_ref().is_some_and(|s| hit(s, &to_local)) {
                return Some((id, candidate));
            }
        }
    }
    None
}

fn describe(id: SolidRef) -> String {
    match id.link {
        Some(link) => format!("{} in link {}", id.element, link.0),
        None => id.element.to_string(),
    }
}

// ── Validators ─────────────────────────────────────────────────

/// The candidate must lie inside a region.
pub struct BoundingRegionValidator {
    region: Aabb,
}

impl BoundingRegionValidator {
    #[must_use]
    pub fn new(region: Aabb) -> Self {
        Self { region }
    }
}

impl Validator for BoundingRegionValidator {
    fn name(&self) -> &'static str {
        "bounding-region"
    }

    fn validate(&self, candidate: &Candidate, _: &RouteGraph, ctx: &RoutingContext<'_>) -> Outcome {
        if self
            .region
            .contains_point(&candidate.location, ctx.settings.vertex_tolerance())
        {
            Outcome::Pass
        } else {
            Outcome::Fail(format!("{} is outside the allowed region", fmt_point(&candidate.location)))
        }
    }
}

/// Path length and hop count from the candidate back to a root vertex must
/// stay within limits.
///
/// Measured on a copy of the graph with the candidate applied. A candidate
/// that would not be connected to the root fails.
pub struct LimitsValidator {
    root: VertexId,
    max_length: Option<f64>,
    max_hops: Option<usize>,
}

impl LimitsValidator {
    #[must_use]
    pub fn new(root: VertexId) -> Self {
        Self {
            root,
            max_length: None,
            max_hops: None,
        }
    }

    #[must_use]
    pub fn with_max_length(mut self, length: f64) -> Self {
        self.max_length = Some(length);
        self
    }

    #[must_use]
    pub fn with_max_hops(mut self, hops: usize) -> Self {
        self.max_hops = Some(hops);
        self
    }
}

impl Validator for LimitsValidator {
    fn name(&self) -> &'static str {
        "limits"
    }

    fn judges_connection(&self) -> bool {
        true
    }

    fn validate(&self, candidate: &Candidate, graph: &RouteGraph, _: &RoutingContext<'_>) -> Outcome {
        let mut hypothetical = graph.clone();
        let vertex = match candidate.apply_to(&mut hypothetical) {
            Ok(vertex) => vertex,
            Err(err) => return Outcome::Fail(format!("candidate cannot be inserted: {err}")),
        };
        let Some(metrics) = path_metrics(&hypothetical, vertex, self.root) else {
            return Outcome::Fail("candidate is not connected to the root".into());
        };
        let mut problems = Vec::new();
        if let Some(max) = self.max_length.filter(|max| metrics.length > *max) {
            problems.push(format!("path length {:.1} exceeds {max:.1}", metrics.length));
        }
        if let Some(max) = self.max_hops.filter(|max| metrics.hops > *max) {
            problems.push(format!("{} hops exceed {max}", metrics.hops));
        }
        if problems.is_empty() {
            Outcome::Pass
        } else {
            Outcome::Fail(problems.join(", "))
        }
    }
}

/// The candidate's element must not belong to an excluded category or type.
///
/// Without a picked element the world solid containing the location stands
/// in for it.
#[derive(Default)]
pub struct CategoryExclusionValidator {
    categories: FxHashSet<Category>,
    types: FxHashSet<String>,
}

impl CategoryExclusionValidator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn excluding_category(mut self, category: Category) -> Self {
        self.categories.insert(category);
        self
    }

    #[must_use]
    pub fn excluding_type(mut self, type_name: impl Into<String>) -> Self {
        self.types.insert(type_name.into());
        self
    }

    fn judge(&self, what: &str, category: &Category, type_name: &str) -> Outcome {
        if self.categories.contains(category) {
            Outcome::Fail(format!("{what} belongs to excluded category {category}"))
        } else if self.types.contains(type_name) {
            Outcome::Fail(format!("{what} is of excluded type {type_name}"))
        } else {
            Outcome::Pass
        }
    }
}

impl Validator for CategoryExclusionValidator {
    fn name(&self) -> &'static str {
        "category-exclusion"
    }

    fn validate(&self, candidate: &Candidate, _: &RouteGraph, ctx: &RoutingContext<'_>) -> Outcome {
        if let Some(element) = candidate.element.and_then(|id| ctx.elements.element(id)) {
            return self.judge(&format!("element {}", element.id), &element.category, &element.type_name);
        }
        let location = candidate.location;
        let host = find_in_world(ctx, &CategoryFilter::none(), &FxHashSet::default(), |solid, to_local| {
            let local = ctx.kernel.transform_point(&location, to_local);
            ctx.kernel.contains_point(solid, &local)
        });
        match host {
            Some((id, host)) => self.judge(
                &format!("location inside {}", describe(id)),
                &host.category,
                &host.type_name,
            ),
            None => Outcome::Pass,
        }
    }
}

/// The candidate's footprint (or bare location) must not collide with world
/// geometry other than what it attaches to.
#[derive(Default)]
pub struct CollisionValidator;

impl Validator for CollisionValidator {
    fn name(&self) -> &'static str {
        "collision"
    }

    fn validate(&self, candidate: &Candidate, graph: &RouteGraph, ctx: &RoutingContext<'_>) -> Outcome {
        let excluded = candidate.attachments(graph, ctx);
        if let Some(footprint) = &candidate.footprint {
            let hits = CollisionDetector::new(*ctx).get_collisions(footprint, &excluded);
            if hits.is_empty() {
                return Outcome::Pass;
            }
            let names: Vec<String> = hits.iter().map(|c| describe(c.candidate)).collect();
            return Outcome::Fail(format!("footprint collides with {}", names.join(", ")));
        }
        let location = candidate.location;
        match find_in_world(ctx, ctx.category_filter, &excluded, |solid, to_local| {
            let local = ctx.kernel.transform_point(&location, to_local);
            ctx.kernel.contains_point(solid, &local)
        }) {
            Some((id, _)) => Outcome::Fail(format!("{} lies inside {}", fmt_point(&location), describe(id))),
            None => Outcome::Pass,
        }
    }
}

/// The candidate must sit between a floor elevation and the maximum floor
/// clearance above it.
pub struct FloorClearanceValidator {
    floor_elevation: f64,
}

impl FloorClearanceValidator {
    #[must_use]
    pub fn new(floor_elevation: f64) -> Self {
        Self { floor_elevation }
    }
}

impl Validator for FloorClearanceValidator {
    fn name(&self) -> &'static str {
        "floor-clearance"
    }

    fn validate(&self, candidate: &Candidate, _: &RouteGraph, ctx: &RoutingContext<'_>) -> Outcome {
        let height = candidate.location.z - self.floor_elevation;
        let max = ctx.settings.max_floor_clearance();
        if height < -ctx.settings.vertex_tolerance() {
            Outcome::Fail(format!("{height:.1} below the floor"))
        } else if height > max {
            Outcome::Fail(format!("{height:.1} above the floor exceeds {max:.1}"))
        } else {
            Outcome::Pass
        }
    }
}

/// The new connection must continue every edge at its start vertex either
/// straight or at an allowed angle no sharper than the fitting angle.
#[derive(Default)]
pub struct AngleValidator;

/// Degrees of slack when matching allowed angles.
const ANGLE_TOLERANCE: f64 = 0.5;

impl Validator for AngleValidator {
    fn name(&self) -> &'static str {
        "angle"
    }

    fn judges_connection(&self) -> bool {
        true
    }

    fn validate(&self, candidate: &Candidate, graph: &RouteGraph, ctx: &RoutingContext<'_>) -> Outcome {
        let Some(from) = candidate.connect_from else {
            return Outcome::Pass;
        };
        let Ok(start) = graph.vertex(from) else {
            return Outcome::Fail("start vertex is not in the graph".into());
        };
        let direction = candidate.location - start.location();
        if direction.norm() <= ctx.settings.vertex_tolerance() {
            return Outcome::Pass;
        }
        for other in graph.neighbors(from) {
            let Ok(other) = graph.vertex(other) else {
                continue;
            };
            if other.is_at(&candidate.location) {
                continue;
            }
            let incoming = start.location() - other.location();
            if incoming.norm() <= ctx.settings.vertex_tolerance() {
                continue;
            }
            let deviation = incoming.angle(&direction).to_degrees();
            if deviation <= ANGLE_TOLERANCE {
                continue;
            }
            if deviation > ctx.settings.fitting_angle() + ANGLE_TOLERANCE {
                return Outcome::Fail(format!(
                    "{deviation:.1}° turn exceeds the {:.1}° fitting angle",
                    ctx.settings.fitting_angle()
                ));
            }
            if !ctx.settings.is_angle_allowed(deviation, ANGLE_TOLERANCE) {
                return Outcome::Fail(format!("{deviation:.1}° turn is not an allowed fitting angle"));
            }
        }
        Outcome::Pass
    }
}

/// The straight connection from the start vertex to the candidate must not
/// pass through world solids.
#[derive(Default)]
pub struct ConnectionValidator;

impl Validator for ConnectionValidator {
    fn name(&self) -> &'static str {
        "connection"
    }

    fn judges_connection(&self) -> bool {
        true
    }

    fn validate(&self, candidate: &Candidate, graph: &RouteGraph, ctx: &RoutingContext<'_>) -> Outcome {
        let Some(from) = candidate.connect_from else {
            return Outcome::Pass;
        };
        let Ok(start) = graph.vertex(from) else {
            return Outcome::Fail("start vertex is not in the graph".into());
        };
        let path = Segment::new(*start.location(), candidate.location);
        let excluded = candidate.attachments(graph, ctx);
        let tolerance = ctx.settings.vertex_tolerance();
        let blocked = find_in_world(ctx, ctx.category_filter, &excluded, |solid, to_local| {
            let local = Segment::new(
                ctx.kernel.transform_point(path.start(), to_local),
                ctx.kernel.transform_point(path.end(), to_local),
            );
            ctx.kernel
                .segment_inside(solid, &local)
                .iter()
                .any(|i| i.length() > tolerance)
        });
        match blocked {
            Some((id, _)) => Outcome::Fail(format!("connection passes through {}", describe(id))),
            None => Outcome::Pass,
        }
    }
}

/// A candidate splitting an edge must land on one of the edge's free
/// segments.
#[derive(Default)]
pub struct FreeSegmentValidator;

impl Validator for FreeSegmentValidator {
    fn name(&self) -> &'static str {
        "free-segment"
    }

    fn validate(&self, candidate: &Candidate, graph: &RouteGraph, ctx: &RoutingContext<'_>) -> Outcome {
        let Placement::OnEdge(edge) = candidate.placement else {
            return Outcome::Pass;
        };
        let tolerance = ctx.settings.vertex_tolerance();
        match SegmentExtractor::new(*ctx).free_segments(graph, edge) {
            Ok(free) if free.iter().any(|s| s.contains(&candidate.location, tolerance)) => Outcome::Pass,
            Ok(_) => Outcome::Fail(format!(
                "{} is not on a free stretch of the run",
                fmt_point(&candidate.location)
            )),
            Err(err) => Outcome::Fail(format!("edge cannot be inspected: {err}")),
        }
    }
}

fn fmt_point(p: &Point3) -> String {
    format!("({:.1}, {:.1}, {:.1})", p.x, p.y, p.z)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Element, InMemoryModel};
    use crate::routing::builder::GraphBuilder;
    use crate::routing::test_support::{self, p, Fixture};
    use crate::settings::TraceSettings;

    fn wall(model: &mut InMemoryModel, id: u64, min: Point3, max: Point3) {
        model.insert(
            Element::other(ElementId(id), Category::new("Walls"), nalgebra::center(&min, &max), &[])
                .with_type_name("Basic Wall"),
        );
        model.set_solid(ElementId(id), Solid::from_box(min, max).unwrap());
    }

    fn lone_graph(fx: &Fixture<'_>) -> RouteGraph {
        GraphBuilder::new(fx.ctx()).build(ElementId(1)).unwrap()
    }

    fn start_vertex(graph: &RouteGraph) -> VertexId {
        graph
            .vertices()
            .find(|(_, v)| *v.location() == p(0.0, 0.0, 0.0))
            .unwrap()
            .0
    }

    // ── Chain ──────────────────────────────────────────────────

    #[test]
    fn chain_runs_every_validator() {
        let model = test_support::lone_run();
        let fx = Fixture::new(&model);
        let graph = lone_graph(&fx);
        let chain = ValidatorChain::new()
            .with(BoundingRegionValidator::new(Aabb::new(p(0.0, 0.0, 0.0), p(10.0, 10.0, 10.0))))
            .with(FloorClearanceValidator::new(0.0))
            .with(CollisionValidator);
        let report = chain.run(&Candidate::free(p(5000.0, 5000.0, -50.0)), &graph, &fx.ctx());
        assert!(!report.is_accepted());
        assert_eq!(report.verdicts().len(), 3);
        let failed: Vec<&str> = report.failures().map(|(rule, _)| rule).collect();
        assert_eq!(failed, vec!["bounding-region", "floor-clearance"]);
        assert!(report.to_string().contains("bounding-region"));
    }

    // ── Individual rules ───────────────────────────────────────

    #[test]
    fn limits_walk_to_root_on_a_copy() {
        let model = test_support::lone_run();
        let fx = Fixture::new(&model);
        let graph = lone_graph(&fx);
        let root = start_vertex(&graph);
        let far_end = graph.neighbors(root)[0];
        let candidate = Candidate::free(p(3000.0, 1000.0, 0.0)).connected_from(far_end);

        let ok = LimitsValidator::new(root).with_max_length(5000.0).with_max_hops(2);
        assert_eq!(ok.validate(&candidate, &graph, &fx.ctx()), Outcome::Pass);

        let too_long = LimitsValidator::new(root).with_max_length(3500.0);
        assert!(matches!(too_long.validate(&candidate, &graph, &fx.ctx()), Outcome::Fail(_)));

        let too_many = LimitsValidator::new(root).with_max_hops(1);
        assert!(matches!(too_many.validate(&candidate, &graph, &fx.ctx()), Outcome::Fail(_)));

        let detached = Candidate::free(p(0.0, 5000.0, 0.0));
        assert!(matches!(ok.validate(&detached, &graph, &fx.ctx()), Outcome::Fail(_)));
        assert_eq!(graph.vertex_count(), 2);
    }

    #[test]
    fn category_exclusion_by_element_and_by_location() {
        let mut model = test_support::lone_run();
        wall(&mut model, 5, p(1000.0, 500.0, -500.0), p(1200.0, 1500.0, 500.0));
        let fx = Fixture::new(&model);
        let graph = lone_graph(&fx);
        let rule = CategoryExclusionValidator::new().excluding_category(Category::new("Walls"));

        let picked = Candidate::free(p(1100.0, 1000.0, 0.0)).with_element(ElementId(5));
        let Outcome::Fail(reason) = rule.validate(&picked, &graph, &fx.ctx()) else {
            panic!("wall pick should be rejected");
        };
        assert!(reason.contains("excluded category Walls"));

        let inside = Candidate::free(p(1100.0, 1000.0, 0.0));
        assert!(matches!(rule.validate(&inside, &graph, &fx.ctx()), Outcome::Fail(_)));

        let by_type = CategoryExclusionValidator::new().excluding_type("Basic Wall");
        assert!(matches!(by_type.validate(&inside, &graph, &fx.ctx()), Outcome::Fail(_)));

        let outside = Candidate::free(p(1100.0, 3000.0, 0.0));
        assert_eq!(rule.validate(&outside, &graph, &fx.ctx()), Outcome::Pass);
    }

    #[test]
    fn collision_ignores_attached_elements() {
        let model = test_support::lone_run();
        let fx = Fixture::new(&model);
        let graph = lone_graph(&fx);
        let on_run = Candidate::free(p(1500.0, 0.0, 0.0));
        assert!(matches!(CollisionValidator.validate(&on_run, &graph, &fx.ctx()), Outcome::Fail(_)));
        let attached = on_run.attached_to(ElementId(1));
        assert_eq!(CollisionValidator.validate(&attached, &graph, &fx.ctx()), Outcome::Pass);
    }

    #[test]
    fn junction_footprint_ignores_its_connected_runs() {
        let mut model = test_support::elbow_chain();
        let elbow_at = p(2000.0, 0.0, 0.0);
        let body = || test_support::duct_solid(p(1850.0, 0.0, 0.0), p(2150.0, 0.0, 0.0), 120.0);
        model.set_solid(ElementId(10), body());
        let fx = Fixture::new(&model);
        let graph = GraphBuilder::new(fx.ctx()).build(ElementId(1)).unwrap();
        let candidate = Candidate::anchored(ElementId(10), elbow_at).with_footprint(body());
        assert_eq!(CollisionValidator.validate(&candidate, &graph, &fx.ctx()), Outcome::Pass);

        let stranger = Candidate::free(elbow_at).with_footprint(body());
        assert!(matches!(CollisionValidator.validate(&stranger, &graph, &fx.ctx()), Outcome::Fail(_)));
    }

    #[test]
    fn floor_clearance_bounds() {
        let model = InMemoryModel::new();
        let fx = Fixture::new(&model).with_settings(TraceSettings::default().with_max_floor_clearance(2500.0));
        let graph = RouteGraph::new();
        let rule = FloorClearanceValidator::new(100.0);
        assert_eq!(rule.validate(&Candidate::free(p(0.0, 0.0, 2600.0)), &graph, &fx.ctx()), Outcome::Pass);
        assert!(matches!(rule.validate(&Candidate::free(p(0.0, 0.0, 2601.0)), &graph, &fx.ctx()), Outcome::Fail(_)));
        assert!(matches!(rule.validate(&Candidate::free(p(0.0, 0.0, 50.0)), &graph, &fx.ctx()), Outcome::Fail(_)));
    }

    #[test]
    fn angle_must_be_straight_or_allowed() {
        let model = test_support::lone_run();
        let fx = Fixture::new(&model);
        let graph = lone_graph(&fx);
        let end = graph
            .vertices()
            .find(|(_, v)| *v.location() == p(3000.0, 0.0, 0.0))
            .unwrap()
            .0;
        let straight = Candidate::free(p(4000.0, 0.0, 0.0)).connected_from(end);
        let square = Candidate::free(p(3000.0, 1000.0, 0.0)).connected_from(end);
        let odd = Candidate::free(p(4000.0, 1000.0 * 50.0_f64.to_radians().tan(), 0.0)).connected_from(end);
        assert_eq!(AngleValidator.validate(&straight, &graph, &fx.ctx()), Outcome::Pass);
        assert_eq!(AngleValidator.validate(&square, &graph, &fx.ctx()), Outcome::Pass);
        assert!(matches!(AngleValidator.validate(&odd, &graph, &fx.ctx()), Outcome::Fail(_)));
    }

    #[test]
    fn turns_beyond_the_fitting_angle_fail() {
        let model = test_support::lone_run();
        let fx = Fixture::new(&model).with_settings(TraceSettings::default().with_fitting_angle(45.0));
        let graph = lone_graph(&fx);
        let end = graph
            .vertices()
            .find(|(_, v)| *v.location() == p(3000.0, 0.0, 0.0))
            .unwrap()
            .0;
        let square = Candidate::free(p(3000.0, 1000.0, 0.0)).connected_from(end);
        let Outcome::Fail(reason) = AngleValidator.validate(&square, &graph, &fx.ctx()) else {
            panic!("90° turn should exceed a 45° fitting");
        };
        assert!(reason.contains("fitting angle"));
        let diagonal = Candidate::free(p(4000.0, 1000.0, 0.0)).connected_from(end);
        assert_eq!(AngleValidator.validate(&diagonal, &graph, &fx.ctx()), Outcome::Pass);
    }

    #[test]
    fn existing_vertex_attaches_to_its_runs() {
        let model = test_support::lone_run();
        let fx = Fixture::new(&model);
        let mut graph = lone_graph(&fx);
        let start = start_vertex(&graph);
        let candidate = Candidate::existing(&graph, start).unwrap();
        assert_eq!(candidate.attach_to, vec![ElementId(1)]);
        assert_eq!(candidate.anchor, None);
        assert_eq!(candidate.apply_to(&mut graph).unwrap(), start);
        assert_eq!(graph.vertex_count(), 2);
        // The bare point sits on the run's end face, which it attaches to.
        assert_eq!(CollisionValidator.validate(&candidate, &graph, &fx.ctx()), Outcome::Pass);
    }

    #[test]
    fn connection_rules_are_a_subset() {
        let model = test_support::lone_run();
        let fx = Fixture::new(&model);
        let graph = lone_graph(&fx);
        let chain = ValidatorChain::new()
            .with(FloorClearanceValidator::new(1000.0))
            .with(AngleValidator)
            .with(ConnectionValidator)
            .with(LimitsValidator::new(start_vertex(&graph)));
        let candidate = Candidate::existing(&graph, start_vertex(&graph)).unwrap();
        let report = chain.run_connection_rules(&candidate, &graph, &fx.ctx());
        let rules: Vec<&str> = report.verdicts().iter().map(|v| v.rule).collect();
        assert_eq!(rules, vec!["angle", "connection", "limits"]);
        assert_eq!(chain.run(&candidate, &graph, &fx.ctx()).verdicts().len(), 4);
    }

    #[test]
    fn connection_must_not_cross_solids() {
        let mut model = test_support::lone_run();
        wall(&mut model, 5, p(3400.0, -1000.0, -1000.0), p(3600.0, 1000.0, 1000.0));
        let fx = Fixture::new(&model);
        let graph = lone_graph(&fx);
        let end = graph
            .vertices()
            .find(|(_, v)| *v.location() == p(3000.0, 0.0, 0.0))
            .unwrap()
            .0;
        let through = Candidate::free(p(4000.0, 0.0, 0.0)).connected_from(end);
        let Outcome::Fail(reason) = ConnectionValidator.validate(&through, &graph, &fx.ctx()) else {
            panic!("wall should block the connection");
        };
        assert!(reason.contains("#5"));
        let short = Candidate::free(p(3300.0, 0.0, 0.0)).connected_from(end);
        assert_eq!(ConnectionValidator.validate(&short, &graph, &fx.ctx()), Outcome::Pass);
    }

    #[test]
    fn free_segment_rule_checks_on_edge_placements() {
        let model = test_support::lone_run();
        let fx = Fixture::new(&model);
        let graph = lone_graph(&fx);
        let edge = graph.edges().next().unwrap().0;
        let inside = Candidate::free(p(1500.0, 0.0, 0.0)).on_edge(edge);
        let near_end = Candidate::free(p(50.0, 0.0, 0.0)).on_edge(edge);
        assert_eq!(FreeSegmentValidator.validate(&inside, &graph, &fx.ctx()), Outcome::Pass);
        assert!(matches!(FreeSegmentValidator.validate(&near_end, &graph, &fx.ctx()), Outcome::Fail(_)));
    }

    #[test]
    fn apply_splits_edges_and_connects() {
        let model = test_support::lone_run();
        let fx = Fixture::new(&model);
        let mut graph = lone_graph(&fx);
        let edge = graph.edges().next().unwrap().0;
        let split = Candidate::free(p(1500.0, 0.0, 0.0)).on_edge(edge).apply_to(&mut graph).unwrap();
        assert_eq!(graph.edges_with_tag(ElementId(1)).len(), 2);

        let branch = Candidate::free(p(1500.0, 1000.0, 0.0))
            .connected_from(split)
            .apply_to(&mut graph)
            .unwrap();
        let link = graph.find_edge(split, branch).unwrap();
        assert_eq!(graph.edge(link).unwrap().tag, None);
        assert_eq!(graph.vertex_count(), 4);
    }
}
