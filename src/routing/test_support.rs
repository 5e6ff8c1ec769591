//! Shared fixtures for routing tests.

#![allow(clippy::unwrap_used)]

use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::geometry::{Aabb, Frame, Segment, Solid};
use crate::kernel::{ConvexKernel, GeometryKernel};
use crate::math::{Interval, Point2, Point3};
use crate::model::{CategoryFilter, CrossSection, Element, ElementId, InMemoryModel};
use crate::settings::TraceSettings;

use super::context::RoutingContext;

/// Installs a test subscriber honouring `RUST_LOG`; repeated calls are no-ops.
pub(crate) fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

pub(crate) fn p(x: f64, y: f64, z: f64) -> Point3 {
    Point3::new(x, y, z)
}

/// Owns everything a [`RoutingContext`] borrows besides the model.
pub(crate) struct Fixture<'m, K: GeometryKernel = ConvexKernel> {
    pub model: &'m InMemoryModel,
    pub kernel: K,
    pub settings: TraceSettings,
    pub filter: CategoryFilter,
}

impl<'m> Fixture<'m> {
    pub fn new(model: &'m InMemoryModel) -> Self {
        Self {
            model,
            kernel: ConvexKernel,
            settings: TraceSettings::default(),
            filter: CategoryFilter::none(),
        }
    }
}

impl<'m, K: GeometryKernel> Fixture<'m, K> {
    pub fn with_kernel<L: GeometryKernel>(self, kernel: L) -> Fixture<'m, L> {
        Fixture {
            model: self.model,
            kernel,
            settings: self.settings,
            filter: self.filter,
        }
    }

    pub fn with_settings(mut self, settings: TraceSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_filter(mut self, filter: CategoryFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn ctx(&self) -> RoutingContext<'_> {
        RoutingContext::new(&self.kernel, self.model, &self.settings, &self.filter)
    }
}

/// A kernel whose boolean operations always fail.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FailingKernel;

impl GeometryKernel for FailingKernel {
    fn intersect(&self, _: &Solid, _: &Solid) -> Result<Option<Solid>> {
        Err(GeometryError::Kernel("boolean intersection failed".into()).into())
    }

    fn union(&self, _: &Solid, _: &Solid) -> Result<Solid> {
        Err(GeometryError::Kernel("boolean union failed".into()).into())
    }

    fn volume(&self, solid: &Solid) -> Result<f64> {
        ConvexKernel.volume(solid)
    }

    fn bounding_volume(&self, solids: &[&Solid], points: &[Point3]) -> Option<Aabb> {
        ConvexKernel.bounding_volume(solids, points)
    }

    fn transform_point(&self, point: &Point3, frame: &Frame) -> Point3 {
        ConvexKernel.transform_point(point, frame)
    }

    fn transform_solid(&self, solid: &Solid, frame: &Frame) -> Solid {
        ConvexKernel.transform_solid(solid, frame)
    }

    fn offset_extrude(&self, centerline: &Segment, section: &[Point2], offset: f64) -> Result<Solid> {
        ConvexKernel.offset_extrude(centerline, section, offset)
    }

    fn contains_point(&self, solid: &Solid, point: &Point3) -> bool {
        ConvexKernel.contains_point(solid, point)
    }

    fn segment_inside(&self, solid: &Solid, segment: &Segment) -> Vec<Interval> {
        ConvexKernel.segment_inside(solid, segment)
    }
}

// ── Networks ───────────────────────────────────────────────────

/// Square duct solid of half-size `half` around a straight centerline.
pub(crate) fn duct_solid(start: Point3, end: Point3, half: f64) -> Solid {
    ConvexKernel
        .offset_extrude(
            &Segment::new(start, end),
            &CrossSection::rectangular(2.0 * half, 2.0 * half).samples,
            0.0,
        )
        .unwrap()
}

fn insert_run(model: &mut InMemoryModel, id: u64, start: Point3, end: Point3) -> ElementId {
    let id = model.insert(
        Element::run(ElementId(id), start, end).with_cross_section(CrossSection::rectangular(200.0, 200.0)),
    );
    model.set_solid(id, duct_solid(start, end, 100.0));
    id
}

/// Run 1: a 3000 long 200x200 duct along +X with both ends open.
pub(crate) fn lone_run() -> InMemoryModel {
    let mut model = InMemoryModel::new();
    insert_run(&mut model, 1, p(0.0, 0.0, 0.0), p(3000.0, 0.0, 0.0));
    model
}

/// Runs `1..=n`, each 1000 long along +X, joined end to start without fittings.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn run_chain(n: u64) -> InMemoryModel {
    let mut model = InMemoryModel::new();
    for i in 1..=n {
        let x = (i - 1) as f64 * 1000.0;
        insert_run(&mut model, i, p(x, 0.0, 0.0), p(x + 1000.0, 0.0, 0.0));
    }
    for i in 1..n {
        model.connect(ElementId(i), 1, ElementId(i + 1), 0).unwrap();
    }
    model
}

/// run 1 - elbow 10 - run 2 - elbow 11 - run 3, a Z-shaped path in plan.
pub(crate) fn elbow_chain() -> InMemoryModel {
    let mut model = InMemoryModel::new();
    let a = p(0.0, 0.0, 0.0);
    let b = p(2000.0, 0.0, 0.0);
    let c = p(2000.0, 2000.0, 0.0);
    let d = p(4000.0, 2000.0, 0.0);
    insert_run(&mut model, 1, a, b);
    insert_run(&mut model, 2, b, c);
    insert_run(&mut model, 3, c, d);
    model.insert(Element::junction(ElementId(10), b, &[b, b]));
    model.insert(Element::junction(ElementId(11), c, &[c, c]));
    model.connect(ElementId(1), 1, ElementId(10), 0).unwrap();
    model.connect(ElementId(10), 1, ElementId(2), 0).unwrap();
    model.connect(ElementId(2), 1, ElementId(11), 0).unwrap();
    model.connect(ElementId(11), 1, ElementId(3), 0).unwrap();
    model
}

/// Main run 1 into tap 20 (parent, main, child ports), main run 2 out of it
/// and branch run 3 rising from the child port. The branch is 150 wide.
pub(crate) fn tap_network() -> InMemoryModel {
    let mut model = InMemoryModel::new();
    let t = p(3000.0, 0.0, 0.0);
    insert_run(&mut model, 1, p(0.0, 0.0, 0.0), t);
    insert_run(&mut model, 2, t, p(6000.0, 0.0, 0.0));
    let branch_start = p(3000.0, 0.0, 100.0);
    model.insert(
        Element::run(ElementId(3), branch_start, p(3000.0, 0.0, 2000.0))
            .with_cross_section(CrossSection::rectangular(150.0, 150.0).with_insulation(25.0)),
    );
    model.insert(Element::tap(ElementId(20), t, t, t, branch_start));
    model.connect(ElementId(1), 1, ElementId(20), 0).unwrap();
    model.connect(ElementId(20), 1, ElementId(2), 0).unwrap();
    model.connect(ElementId(20), 2, ElementId(3), 0).unwrap();
    model
}

/// Tee 30 with runs 1 and 2 on two ports and the third port open.
pub(crate) fn open_tee() -> InMemoryModel {
    let mut model = InMemoryModel::new();
    let t = p(1000.0, 0.0, 0.0);
    insert_run(&mut model, 1, p(0.0, 0.0, 0.0), t);
    insert_run(&mut model, 2, t, p(2000.0, 0.0, 0.0));
    model.insert(Element::junction(ElementId(30), t, &[t, t, p(1000.0, 100.0, 0.0)]));
    model.connect(ElementId(1), 1, ElementId(30), 0).unwrap();
    model.connect(ElementId(30), 1, ElementId(2), 0).unwrap();
    model
}

/// `n` elbows (ids `100..`) on a circle joined by runs `1..=n` into a loop.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn ring(n: usize) -> InMemoryModel {
    let mut model = InMemoryModel::new();
    let corner = |i: usize| {
        let a = TAU * (i % n) as f64 / n as f64;
        p(5000.0 * a.cos(), 5000.0 * a.sin(), 0.0)
    };
    for i in 0..n {
        let c = corner(i);
        model.insert(Element::junction(ElementId(100 + i as u64), c, &[c, c]));
    }
    for i in 0..n {
        let run = insert_run(&mut model, 1 + i as u64, corner(i), corner(i + 1));
        model.connect(ElementId(100 + i as u64), 1, run, 0).unwrap();
        model.connect(run, 1, ElementId(100 + ((i + 1) % n) as u64), 0).unwrap();
    }
    model
}
