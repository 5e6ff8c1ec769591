//! The host model as the engine sees it.
//!
//! Hosts expose their document through two capability traits:
//! [`ElementProvider`] (per-element connectors, kind and solid) and
//! [`WorldIndex`] (every solid in the active model and in each linked model).
//! [`InMemoryModel`] implements both for embedding and tests.

mod memory;

pub use memory::InMemoryModel;

use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::geometry::{Frame, Segment, Solid};
use crate::math::{Point2, Point3};

/// Opaque, stable identity of a host element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host category name (e.g. "Ducts", "Structural Columns").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Category(String);

impl Category {
    /// Creates a category from its name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the category name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role of a connector on a junction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BranchRelation {
    /// Through-connector of a run or fitting.
    #[default]
    Main,
    /// Connector facing the branch a tap was cut into.
    Parent,
    /// Connector leading into the tapped-off branch.
    Child,
}

/// A connection point on an element.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    /// Location in the active model.
    pub origin: Point3,
    /// Element on the other side, if connected.
    pub connected_to: Option<ElementId>,
    /// Role on a junction; `Main` everywhere else.
    pub relation: BranchRelation,
}

impl Connector {
    /// An unconnected connector at `origin`.
    #[must_use]
    pub fn free(origin: Point3) -> Self {
        Self {
            origin,
            connected_to: None,
            relation: BranchRelation::Main,
        }
    }

    /// Sets the branch relation.
    #[must_use]
    pub fn with_relation(mut self, relation: BranchRelation) -> Self {
        self.relation = relation;
        self
    }
}

/// What an element is, as far as routing is concerned.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// A fitting joining two or more runs. `tap` marks spud/tap-in fittings
    /// whose child branch needs extra standoff on the parent run.
    Junction { tap: bool },
    /// A linear run along a straight centerline.
    Run { centerline: Segment },
    /// Anything else (equipment, terminals, accessories).
    Other,
}

/// Outer cross-section of a run or a tap's child branch.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossSection {
    /// Outline samples in the section plane, centred on the centerline.
    pub samples: Vec<Point2>,
    /// Largest outer dimension (diameter or width).
    pub outer_size: f64,
    /// Insulation thickness around the outline.
    pub insulation: f64,
}

impl CrossSection {
    /// A rectangular section of `width` x `height`.
    #[must_use]
    pub fn rectangular(width: f64, height: f64) -> Self {
        let (hw, hh) = (width / 2.0, height / 2.0);
        Self {
            samples: vec![
                Point2::new(-hw, -hh),
                Point2::new(hw, -hh),
                Point2::new(hw, hh),
                Point2::new(-hw, hh),
            ],
            outer_size: width.max(height),
            insulation: 0.0,
        }
    }

    /// A round section sampled as a regular polygon circumscribing the circle.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn round(diameter: f64, samples: usize) -> Self {
        let n = samples.max(3);
        let step = std::f64::consts::TAU / n as f64;
        let radius = diameter / 2.0 / (step / 2.0).cos();
        Self {
            samples: (0..n)
                .map(|i| {
                    let a = step * i as f64;
                    Point2::new(radius * a.cos(), radius * a.sin())
                })
                .collect(),
            outer_size: diameter,
            insulation: 0.0,
        }
    }

    /// Sets the insulation thickness.
    #[must_use]
    pub fn with_insulation(mut self, insulation: f64) -> Self {
        self.insulation = insulation;
        self
    }
}

/// A host element with everything routing reads from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    pub category: Category,
    pub type_name: String,
    /// Reference location (insertion point of a fitting, midpoint of a run).
    pub origin: Point3,
    /// Connectors in host order. A run's connector 0 sits at the
    /// centerline start and connector 1 at its end.
    pub connectors: Vec<Connector>,
    pub cross_section: Option<CrossSection>,
}

impl Element {
    /// A run between two points, with free connectors at both ends.
    #[must_use]
    pub fn run(id: ElementId, start: Point3, end: Point3) -> Self {
        let centerline = Segment::new(start, end);
        Self {
            id,
            kind: ElementKind::Run { centerline },
            category: Category::new("Ducts"),
            type_name: String::new(),
            origin: centerline.midpoint(),
            connectors: vec![Connector::free(start), Connector::free(end)],
            cross_section: None,
        }
    }

    /// A junction at `origin` with free connectors at `ports`.
    #[must_use]
    pub fn junction(id: ElementId, origin: Point3, ports: &[Point3]) -> Self {
        Self {
            id,
            kind: ElementKind::Junction { tap: false },
            category: Category::new("Duct Fittings"),
            type_name: String::new(),
            origin,
            connectors: ports.iter().map(|p| Connector::free(*p)).collect(),
            cross_section: None,
        }
    }

    /// A tap fitting at `origin` on a main run: connector 0 faces the parent
    /// side, connector 1 continues the main run and connector 2 feeds the
    /// child branch.
    #[must_use]
    pub fn tap(id: ElementId, origin: Point3, parent_port: Point3, main_port: Point3, child_port: Point3) -> Self {
        Self {
            id,
            kind: ElementKind::Junction { tap: true },
            category: Category::new("Duct Fittings"),
            type_name: String::new(),
            origin,
            connectors: vec![
                Connector::free(parent_port).with_relation(BranchRelation::Parent),
                Connector::free(main_port),
                Connector::free(child_port).with_relation(BranchRelation::Child),
            ],
            cross_section: None,
        }
    }

    /// A non-routing element at `origin` with free connectors at `ports`.
    #[must_use]
    pub fn other(id: ElementId, category: Category, origin: Point3, ports: &[Point3]) -> Self {
        Self {
            id,
            kind: ElementKind::Other,
            category,
            type_name: String::new(),
            origin,
            connectors: ports.iter().map(|p| Connector::free(*p)).collect(),
            cross_section: None,
        }
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Sets the type name.
    #[must_use]
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    /// Sets the cross-section.
    #[must_use]
    pub fn with_cross_section(mut self, section: CrossSection) -> Self {
        self.cross_section = Some(section);
        self
    }

    /// Sets the relation of connector `port`; ignored if out of range.
    #[must_use]
    pub fn with_relation(mut self, port: usize, relation: BranchRelation) -> Self {
        if let Some(c) = self.connectors.get_mut(port) {
            c.relation = relation;
        }
        self
    }

    /// Centerline of a run; `None` for other kinds.
    #[must_use]
    pub fn centerline(&self) -> Option<&Segment> {
        match &self.kind {
            ElementKind::Run { centerline } => Some(centerline),
            _ => None,
        }
    }

    /// Returns `true` for junctions.
    #[must_use]
    pub fn is_junction(&self) -> bool {
        matches!(self.kind, ElementKind::Junction { .. })
    }

    /// Returns `true` for tap junctions.
    #[must_use]
    pub fn is_tap(&self) -> bool {
        matches!(self.kind, ElementKind::Junction { tap: true })
    }

    /// Elements on the other side of every connected connector.
    pub fn neighbors(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.connectors.iter().filter_map(|c| c.connected_to)
    }

    /// Index of the connector joined to `other`.
    #[must_use]
    pub fn port_to(&self, other: ElementId) -> Option<usize> {
        self.connectors
            .iter()
            .position(|c| c.connected_to == Some(other))
    }
}

/// A point picked by the user, optionally on an element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pick {
    pub element: Option<ElementId>,
    pub point: Point3,
}

/// Identity of a linked model within the active model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub u32);

/// Stable identity of one world solid: the element, qualified by the link it
/// lives in (`None` for the active model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SolidRef {
    pub link: Option<LinkId>,
    pub element: ElementId,
}

impl SolidRef {
    /// A solid of a linked model.
    #[must_use]
    pub fn linked(link: LinkId, element: ElementId) -> Self {
        Self {
            link: Some(link),
            element,
        }
    }
}

impl From<ElementId> for SolidRef {
    fn from(element: ElementId) -> Self {
        Self {
            link: None,
            element,
        }
    }
}

/// One entry of the world geometry index, in its own model's coordinates.
#[derive(Debug, Clone)]
pub struct WorldSolid {
    pub element: ElementId,
    pub category: Category,
    pub type_name: String,
    /// `None` for non-physical elements.
    pub solid: Option<Solid>,
}

/// A linked model and the solids it contributes.
#[derive(Debug, Clone)]
pub struct LinkedModel {
    pub id: LinkId,
    /// Link-to-host transform.
    pub frame: Frame,
    pub solids: Vec<WorldSolid>,
}

/// Category pre-filter applied when enumerating world geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryFilter {
    excluded: FxHashSet<Category>,
}

impl CategoryFilter {
    /// A filter that admits every category.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Excludes `category`.
    #[must_use]
    pub fn excluding(mut self, category: Category) -> Self {
        self.excluded.insert(category);
        self
    }

    /// Returns `true` if solids of `category` should be enumerated.
    #[must_use]
    pub fn allows(&self, category: &Category) -> bool {
        !self.excluded.contains(category)
    }
}

/// Per-element access to the host model.
pub trait ElementProvider {
    /// Looks up an element in the active model.
    fn element(&self, id: ElementId) -> Option<Element>;

    /// Solid geometry of an element in the active model.
    fn solid(&self, id: ElementId) -> Option<Solid>;
}

/// Enumeration of all world geometry.
pub trait WorldIndex {
    /// Solids of the active model admitted by `filter`, ordered by element.
    fn local_solids(&self, filter: &CategoryFilter) -> Vec<WorldSolid>;

    /// Linked models with their solids admitted by `filter`.
    fn linked_models(&self, filter: &CategoryFilter) -> Vec<LinkedModel>;
}
