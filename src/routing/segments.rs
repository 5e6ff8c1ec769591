use rustc_hash::FxHashSet;
use tracing::{debug, instrument, trace};

use crate::error::Result;
use crate::geometry::{Segment, Solid};
use crate::math::{complement_within, merge_intervals, Interval};
use crate::model::{BranchRelation, Element, ElementId, SolidRef};
use crate::operations::query::ProjectOntoSegment;
use crate::topology::{EdgeId, RouteGraph, Vertex};

use super::collision::CollisionDetector;
use super::context::RoutingContext;

/// Reduces a tagged edge to the stretches of its run that are free for new
/// fittings.
///
/// The edge is trimmed by the end clearance (plus a tap's branch standoff),
/// then every world solid the run collides with is projected onto the
/// centerline and padded by the element clearance. An obstruction reaching
/// an end of the usable stretch also reserves the distance-from-source
/// beyond it. What is left is returned as segments ordered from the edge's
/// source. Nothing is cached; each call re-reads the world.
pub struct SegmentExtractor<'a> {
    ctx: RoutingContext<'a>,
}

impl<'a> SegmentExtractor<'a> {
    #[must_use]
    pub fn new(ctx: RoutingContext<'a>) -> Self {
        Self { ctx }
    }

    /// Free segments of `edge`.
    ///
    /// Untagged edges and edges whose run cannot be resolved yield no
    /// segments.
    ///
    /// # Errors
    ///
    /// Returns a topology error if `edge` or its endpoints are not in `graph`.
    #[instrument(skip_all, fields(edge = ?edge))]
    pub fn free_segments(&self, graph: &RouteGraph, edge: EdgeId) -> Result<Vec<Segment>> {
        let record = *graph.edge(edge)?;
        let source = graph.vertex(record.source)?;
        let target = graph.vertex(record.target)?;

        let Some(run_id) = record.tag else {
            debug!("untagged edge has no backing run");
            return Ok(Vec::new());
        };
        let Some(run) = self.ctx.elements.element(run_id) else {
            debug!(run = %run_id, "backing run not found");
            return Ok(Vec::new());
        };
        let Some(centerline) = run.centerline().copied() else {
            debug!(run = %run_id, "tag is not a run");
            return Ok(Vec::new());
        };

        // The edge's stretch of the centerline; anchored ends sit at fitting
        // origins and are clamped onto the run.
        let length = centerline.length();
        let t_source = centerline.parameter_of(source.location()).clamp(0.0, length);
        let t_target = centerline.parameter_of(target.location()).clamp(0.0, length);
        let line = Segment::new(centerline.point_at(t_source), centerline.point_at(t_target));
        let span = line.length();

        let start = self.end_clearance(source, run_id);
        let end = span - self.end_clearance(target, run_id);
        if end <= start {
            debug!(span, start, end, "edge shorter than its end clearances");
            return Ok(Vec::new());
        }
        let usable = Interval::new(start, end);

        let occupied = self.reserve_ends(usable, &self.occupied(&run, &line, source, target));
        let free: Vec<Segment> = complement_within(usable, &occupied)
            .into_iter()
            .filter(|gap| !gap.is_empty())
            .map(|gap| line.sub_segment(gap))
            .collect();
        debug!(count = free.len(), "free segments");
        Ok(free)
    }

    /// Clearance at one end of the edge: the end clearance, plus the child
    /// branch standoff when the end is a tap feeding another run.
    fn end_clearance(&self, vertex: &Vertex, run: ElementId) -> f64 {
        let settings = self.ctx.settings;
        let base = settings.end_clearance();
        let Some(junction) = vertex.anchor().and_then(|id| self.ctx.elements.element(id)) else {
            return base;
        };
        if !junction.is_tap() {
            return base;
        }
        let standoff = junction
            .connectors
            .iter()
            .filter(|c| c.relation == BranchRelation::Child)
            .filter_map(|c| c.connected_to)
            .filter(|child| *child != run)
            .filter_map(|child| self.ctx.elements.element(child)?.cross_section)
            .map(|section| {
                let insulation = if settings.include_insulation() {
                    section.insulation
                } else {
                    0.0
                };
                section.outer_size / 2.0 + insulation
            })
            .fold(0.0, f64::max);
        trace!(junction = %junction.id, standoff, "tap standoff");
        base + standoff
    }

    /// Padded shadows of every obstruction along `line`, in arc length from
    /// its start.
    fn occupied(&self, run: &Element, line: &Segment, source: &Vertex, target: &Vertex) -> Vec<Interval> {
        let Some(solid) = self.run_solid(run) else {
            debug!(run = %run.id, "run has no solid, only clearances apply");
            return Vec::new();
        };

        let mut excluded: FxHashSet<SolidRef> = run.neighbors().map(SolidRef::from).collect();
        excluded.insert(run.id.into());
        excluded.extend(source.anchor().map(SolidRef::from));
        excluded.extend(target.anchor().map(SolidRef::from));

        let padding = self.ctx.settings.min_clearance_to_elements();
        let shadows: Vec<Interval> = CollisionDetector::new(self.ctx)
            .get_collisions(&solid, &excluded)
            .iter()
            .filter_map(|collision| {
                let shadow = ProjectOntoSegment::new(&collision.intersection, line).execute()?;
                trace!(candidate = %collision.candidate.element, ?shadow, "obstruction");
                Some(shadow.padded(padding))
            })
            .collect();
        merge_intervals(&shadows)
    }

    /// The run's own solid, or its cross-section swept along the centerline
    /// and grown by the insulation when that counts.
    fn run_solid(&self, run: &Element) -> Option<Solid> {
        if let Some(solid) = self.ctx.elements.solid(run.id) {
            return Some(solid);
        }
        let centerline = run.centerline()?;
        let section = run.cross_section.as_ref()?;
        let offset = if self.ctx.settings.include_insulation() {
            section.insulation
        } else {
            0.0
        };
        self.ctx
            .kernel
            .offset_extrude(centerline, &section.samples, offset)
            .ok()
    }

    /// Extends obstructions that reach an end of `usable` by the
    /// distance-from-source, so no fitting lands right next to them.
    fn reserve_ends(&self, usable: Interval, occupied: &[Interval]) -> Vec<Interval> {
        let reserve = self.ctx.settings.min_distance_from_source();
        let mut out = occupied.to_vec();
        for interval in occupied {
            if interval.contains(usable.start) {
                out.push(Interval::new(usable.start, interval.end + reserve));
            }
            if interval.contains(usable.end) {
                out.push(Interval::new(interval.start - reserve, usable.end));
            }
        }
        merge_intervals(&out)
    }
}
