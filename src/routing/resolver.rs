use tracing::{debug, instrument, trace};

use crate::error::Result;
use crate::math::Point3;
use crate::model::{ElementKind, Pick};
use crate::topology::{EdgeId, RouteGraph, VertexId};

use super::context::RoutingContext;
use super::validators::{Candidate, FreeSegmentValidator, Placement, ValidationReport, ValidatorChain, Validator, Verdict};

/// One end of a requested connection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Endpoint {
    /// A vertex already in the graph.
    Vertex(VertexId),
    /// A point picked on an element.
    OnElement(Pick),
    /// A point in free space.
    FreeSpace(Point3),
}

/// Outcome of resolving a single endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Accepted { vertex: VertexId, reused: bool },
    Rejected(ValidationReport),
}

impl Resolution {
    #[must_use]
    pub fn vertex(&self) -> Option<VertexId> {
        match self {
            Self::Accepted { vertex, .. } => Some(*vertex),
            Self::Rejected(_) => None,
        }
    }

    fn into_report(self) -> Option<ValidationReport> {
        match self {
            Self::Accepted { .. } => None,
            Self::Rejected(report) => Some(report),
        }
    }
}

/// Outcome of resolving a source/target pair.
#[derive(Debug, Clone, PartialEq)]
pub enum PathResolution {
    /// Both ends were accepted and joined by an untagged edge.
    Resolved {
        source: VertexId,
        target: VertexId,
        edge: EdgeId,
    },
    /// At least one end was rejected; the graph is unchanged.
    Rejected {
        source: Option<ValidationReport>,
        target: Option<ValidationReport>,
    },
}

enum Proposal {
    Existing(VertexId),
    New(Candidate),
    Invalid(ValidationReport),
}

/// Turns endpoint descriptions into graph vertices, subject to a
/// validator chain.
///
/// New candidates run through every validator in the chain, plus a
/// free-segment check when they split an existing edge, and touch the graph
/// only when all of them pass. Vertices already in the graph are reused;
/// when one closes a path, the chain's connection rules still judge the edge
/// it would gain.
pub struct PathResolver<'a> {
    ctx: RoutingContext<'a>,
    chain: ValidatorChain,
}

impl<'a> PathResolver<'a> {
    #[must_use]
    pub fn new(ctx: RoutingContext<'a>, chain: ValidatorChain) -> Self {
        Self { ctx, chain }
    }

    #[must_use]
    pub fn chain(&self) -> &ValidatorChain {
        &self.chain
    }

    /// Resolves one endpoint into `graph`.
    ///
    /// # Errors
    ///
    /// Returns a topology error if the endpoint names a vertex that is not in
    /// `graph`. Rejections are reported as [`Resolution::Rejected`].
    pub fn resolve_endpoint(&self, graph: &mut RouteGraph, endpoint: &Endpoint) -> Result<Resolution> {
        self.resolve_into(graph, endpoint, None)
    }

    /// Resolves both endpoints and joins them with an untagged edge.
    ///
    /// The second end is validated as a connection from the first. The
    /// source goes first unless it is new and the target already exists, so
    /// a new end is always judged as joined to the network. Work happens on a
    /// copy of `graph` that replaces it only if both ends are accepted.
    ///
    /// # Errors
    ///
    /// Returns a topology error if an endpoint names a vertex that is not in
    /// `graph`.
    #[instrument(skip_all)]
    pub fn resolve(&self, graph: &mut RouteGraph, source: &Endpoint, target: &Endpoint) -> Result<PathResolution> {
        let mut scratch = graph.clone();
        let target_first = matches!(self.propose(&scratch, source)?, Proposal::New(_))
            && matches!(self.propose(&scratch, target)?, Proposal::Existing(_));
        let (from, to) = if target_first {
            let to = self.resolve_into(&mut scratch, target, None)?;
            let from = self.resolve_into(&mut scratch, source, to.vertex())?;
            (from, to)
        } else {
            let from = self.resolve_into(&mut scratch, source, None)?;
            let to = self.resolve_into(&mut scratch, target, from.vertex())?;
            (from, to)
        };

        let (Some(s), Some(t)) = (from.vertex(), to.vertex()) else {
            debug!("path rejected");
            return Ok(PathResolution::Rejected {
                source: from.into_report(),
                target: to.into_report(),
            });
        };
        if s == t {
            return Ok(PathResolution::Rejected {
                source: None,
                target: Some(ValidationReport::failure("input", "target coincides with source")),
            });
        }
        let edge = scratch.add_edge(s, t, None)?;
        *graph = scratch;
        debug!(vertices = graph.vertex_count(), edges = graph.edge_count(), "path resolved");
        Ok(PathResolution::Resolved {
            source: s,
            target: t,
            edge,
        })
    }

    fn resolve_into(
        &self,
        graph: &mut RouteGraph,
        endpoint: &Endpoint,
        connect_from: Option<VertexId>,
    ) -> Result<Resolution> {
        let candidate = match self.propose(graph, endpoint)? {
            Proposal::Existing(vertex) => return self.reuse(graph, vertex, connect_from),
            Proposal::Invalid(report) => return Ok(Resolution::Rejected(report)),
            Proposal::New(candidate) => match connect_from {
                Some(from) => candidate.connected_from(from),
                None => candidate,
            },
        };

        let mut report = self.chain.run(&candidate, graph, &self.ctx);
        if matches!(candidate.placement, Placement::OnEdge(_)) {
            let rule = FreeSegmentValidator;
            report.push(Verdict {
                rule: rule.name(),
                outcome: rule.validate(&candidate, graph, &self.ctx),
            });
        }
        if !report.is_accepted() {
            debug!(%report, "candidate rejected");
            return Ok(Resolution::Rejected(report));
        }

        let mut scratch = graph.clone();
        let vertex = candidate.apply_to(&mut scratch)?;
        *graph = scratch;
        trace!(?vertex, "candidate applied");
        Ok(Resolution::Accepted { vertex, reused: false })
    }

    /// Accepts an existing vertex, judging the edge from `connect_from` with
    /// the chain's connection rules.
    fn reuse(&self, graph: &RouteGraph, vertex: VertexId, connect_from: Option<VertexId>) -> Result<Resolution> {
        let Some(from) = connect_from.filter(|from| *from != vertex) else {
            return Ok(Resolution::Accepted { vertex, reused: true });
        };
        let candidate = Candidate::existing(graph, vertex)?.connected_from(from);
        let report = self.chain.run_connection_rules(&candidate, graph, &self.ctx);
        if report.is_accepted() {
            Ok(Resolution::Accepted { vertex, reused: true })
        } else {
            debug!(%report, "connection to existing vertex rejected");
            Ok(Resolution::Rejected(report))
        }
    }

    fn propose(&self, graph: &RouteGraph, endpoint: &Endpoint) -> Result<Proposal> {
        let pick = match endpoint {
            Endpoint::Vertex(vertex) => {
                graph.vertex(*vertex)?;
                return Ok(Proposal::Existing(*vertex));
            }
            Endpoint::FreeSpace(point) => return Ok(free_space(graph, *point)),
            Endpoint::OnElement(pick) => pick,
        };
        let Some(id) = pick.element else {
            return Ok(free_space(graph, pick.point));
        };
        let Some(element) = self.ctx.elements.element(id) else {
            return Ok(Proposal::Invalid(ValidationReport::failure(
                "input",
                format!("element {id} not found"),
            )));
        };

        match &element.kind {
            ElementKind::Junction { .. } => {
                if let Some(vertex) = graph.anchored_vertex(id) {
                    return Ok(Proposal::Existing(vertex));
                }
                let mut candidate = Candidate::anchored(id, element.origin);
                if let Some(footprint) = self.ctx.elements.solid(id) {
                    candidate = candidate.with_footprint(footprint);
                }
                Ok(Proposal::New(candidate))
            }
            ElementKind::Run { centerline } => {
                let point = centerline.closest_point(&pick.point);
                for edge in graph.edges_with_tag(id) {
                    let record = *graph.edge(edge)?;
                    for end in [record.source, record.target] {
                        if graph.vertex(end)?.is_at(&point) {
                            return Ok(Proposal::Existing(end));
                        }
                    }
                    if graph.segment(edge)?.contains(&point, graph.tolerance()) {
                        return Ok(Proposal::New(
                            Candidate::free(point).on_edge(edge).with_element(id).attached_to(id),
                        ));
                    }
                }
                Ok(Proposal::New(Candidate::free(point).with_element(id).attached_to(id)))
            }
            ElementKind::Other => Ok(Proposal::New(
                Candidate::free(pick.point).with_element(id).attached_to(id),
            )),
        }
    }
}

fn free_space(graph: &RouteGraph, point: Point3) -> Proposal {
    match graph.find_free_vertex(&point) {
        Some(vertex) => Proposal::Existing(vertex),
        None => Proposal::New(Candidate::free(point)),
    }
}
