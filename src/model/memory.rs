use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{ModelError, Result};
use crate::geometry::{Frame, Solid};

use super::{
    CategoryFilter, Element, ElementId, ElementProvider, LinkId, LinkedModel, WorldIndex,
    WorldSolid,
};

/// An in-process host model.
///
/// Elements are keyed by id; iteration order is by id so scans are
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct InMemoryModel {
    elements: BTreeMap<ElementId, Element>,
    solids: BTreeMap<ElementId, Solid>,
    links: Vec<LinkedModel>,
}

impl InMemoryModel {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an element.
    pub fn insert(&mut self, element: Element) -> ElementId {
        let id = element.id;
        self.elements.insert(id, element);
        id
    }

    /// Attaches solid geometry to an element.
    pub fn set_solid(&mut self, id: ElementId, solid: Solid) {
        self.solids.insert(id, solid);
    }

    /// Adds a linked model placed at `frame`.
    pub fn add_link(&mut self, id: LinkId, frame: Frame, solids: Vec<WorldSolid>) {
        self.links.push(LinkedModel { id, frame, solids });
    }

    /// Joins connector `a_port` of `a` with connector `b_port` of `b`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ElementNotFound`] or
    /// [`ModelError::PortOutOfRange`] if either side does not exist.
    pub fn connect(&mut self, a: ElementId, a_port: usize, b: ElementId, b_port: usize) -> Result<()> {
        self.check_port(a, a_port)?;
        self.check_port(b, b_port)?;
        if let Some(c) = self.elements.get_mut(&a).and_then(|e| e.connectors.get_mut(a_port)) {
            c.connected_to = Some(b);
        }
        if let Some(c) = self.elements.get_mut(&b).and_then(|e| e.connectors.get_mut(b_port)) {
            c.connected_to = Some(a);
        }
        debug!(%a, a_port, %b, b_port, "connected");
        Ok(())
    }

    /// Borrows an element.
    #[must_use]
    pub fn element_ref(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    fn check_port(&self, id: ElementId, port: usize) -> Result<()> {
        let element = self
            .elements
            .get(&id)
            .ok_or(ModelError::ElementNotFound(id))?;
        if port >= element.connectors.len() {
            return Err(ModelError::PortOutOfRange { element: id, port }.into());
        }
        Ok(())
    }
}

impl ElementProvider for InMemoryModel {
    fn element(&self, id: ElementId) -> Option<Element> {
        self.elements.get(&id).cloned()
    }

    fn solid(&self, id: ElementId) -> Option<Solid> {
        self.solids.get(&id).cloned()
    }
}

impl WorldIndex for InMemoryModel {
    fn local_solids(&self, filter: &CategoryFilter) -> Vec<WorldSolid> {
        self.elements
            .values()
            .filter(|e| filter.allows(&e.category))
            .map(|e| WorldSolid {
                element: e.id,
                category: e.category.clone(),
                type_name: e.type_name.clone(),
                solid: self.solids.get(&e.id).cloned(),
            })
            .collect()
    }

    fn linked_models(&self, filter: &CategoryFilter) -> Vec<LinkedModel> {
        self.links
            .iter()
            .map(|link| LinkedModel {
                id: link.id,
                frame: link.frame,
                solids: link
                    .solids
                    .iter()
                    .filter(|s| filter.allows(&s.category))
                    .cloned()
                    .collect(),
            })
            .collect()
    }
}
