use rustc_hash::FxHashSet;
use tracing::{debug, instrument, trace, warn};

use crate::error::{ModelError, Result};
use crate::geometry::{Aabb, Solid};
use crate::model::{Category, ElementId, SolidRef, WorldSolid};

use super::context::RoutingContext;

/// A subject solid intersecting one world solid.
///
/// `intersection` is expressed in the active model's frame even when the
/// candidate lives in a linked model.
#[derive(Debug, Clone)]
pub struct Collision {
    /// Element the subject solid belongs to, when known.
    pub subject: Option<ElementId>,
    pub candidate: SolidRef,
    pub category: Category,
    pub intersection: Solid,
    pub volume: f64,
}

/// Scans the world for solids intersecting a subject.
///
/// A pair registers only if its intersection volume is strictly greater
/// than [`TraceSettings::min_collision_volume`], so face, edge and corner
/// contacts never count. Candidates without geometry are skipped, and a
/// kernel failure on one pair is logged and treated as no intersection.
///
/// [`TraceSettings::min_collision_volume`]: crate::settings::TraceSettings::min_collision_volume
pub struct CollisionDetector<'a> {
    ctx: RoutingContext<'a>,
}

impl<'a> CollisionDetector<'a> {
    #[must_use]
    pub fn new(ctx: RoutingContext<'a>) -> Self {
        Self { ctx }
    }

    /// Collisions of `subject` (in active-model coordinates) with every
    /// world solid not listed in `excluded`.
    #[must_use]
    #[instrument(skip_all, fields(excluded = excluded.len()))]
    pub fn get_collisions(&self, subject: &Solid, excluded: &FxHashSet<SolidRef>) -> Vec<Collision> {
        self.scan(None, subject, excluded)
    }

    /// Collisions of an element's solid. The element itself is always
    /// excluded; an element without geometry collides with nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ElementNotFound`] if `subject` does not exist.
    #[instrument(skip_all, fields(subject = %subject, excluded = excluded.len()))]
    pub fn get_element_collisions(
        &self,
        subject: ElementId,
        excluded: &FxHashSet<SolidRef>,
    ) -> Result<Vec<Collision>> {
        if self.ctx.elements.element(subject).is_none() {
            return Err(ModelError::ElementNotFound(subject).into());
        }
        let Some(solid) = self.ctx.elements.solid(subject) else {
            debug!("subject has no solid");
            return Ok(Vec::new());
        };
        let mut excluded = excluded.clone();
        excluded.insert(subject.into());
        Ok(self.scan(Some(subject), &solid, &excluded))
    }

    fn scan(&self, subject_id: Option<ElementId>, subject: &Solid, excluded: &FxHashSet<SolidRef>) -> Vec<Collision> {
        let kernel = self.ctx.kernel;
        let Some(subject_box) = kernel.bounding_volume(&[subject], &[]) else {
            return Vec::new();
        };
        let mut collisions = Vec::new();

        for candidate in self.ctx.world.local_solids(self.ctx.category_filter) {
            let id = SolidRef::from(candidate.element);
            if excluded.contains(&id) {
                continue;
            }
            if let Some((intersection, volume)) = self.intersect_pair(subject, &subject_box, &candidate, id) {
                collisions.push(Collision {
                    subject: subject_id,
                    candidate: id,
                    category: candidate.category,
                    intersection,
                    volume,
                });
            }
        }

        for link in self.ctx.world.linked_models(self.ctx.category_filter) {
            // Bring the subject into the link's frame rather than every
            // linked solid into ours.
            let local_subject = kernel.transform_solid(subject, &link.frame.inverse());
            let Some(local_box) = kernel.bounding_volume(&[&local_subject], &[]) else {
                continue;
            };
            for candidate in link.solids {
                let id = SolidRef::linked(link.id, candidate.element);
                if excluded.contains(&id) {
                    continue;
                }
                if let Some((intersection, volume)) =
                    self.intersect_pair(&local_subject, &local_box, &candidate, id)
                {
                    collisions.push(Collision {
                        subject: subject_id,
                        candidate: id,
                        category: candidate.category,
                        intersection: kernel.transform_solid(&intersection, &link.frame),
                        volume,
                    });
                }
            }
        }

        debug!(count = collisions.len(), "collision scan finished");
        collisions
    }

    fn intersect_pair(
        &self,
        subject: &Solid,
        subject_box: &Aabb,
        candidate: &WorldSolid,
        id: SolidRef,
    ) -> Option<(Solid, f64)> {
        let kernel = self.ctx.kernel;
        let Some(solid) = candidate.solid.as_ref() else {
            trace!(candidate = %id.element, "candidate has no solid");
            return None;
        };
        let candidate_box = kernel.bounding_volume(&[solid], &[])?;
        if !candidate_box.overlaps(subject_box) {
            return None;
        }
        let intersection = match kernel.intersect(subject, solid) {
            Ok(Some(intersection)) => intersection,
            Ok(None) => return None,
            Err(err) => {
                warn!(candidate = %id.element, link = ?id.link, %err, "intersection failed, pair skipped");
                return None;
            }
        };
        let volume = match kernel.volume(&intersection) {
            Ok(volume) => volume,
            Err(err) => {
                warn!(candidate = %id.element, %err, "volume failed, pair skipped");
                return None;
            }
        };
        if volume > self.ctx.settings.min_collision_volume() {
            trace!(candidate = %id.element, volume, "collision");
            Some((intersection, volume))
        } else {
            trace!(candidate = %id.element, volume, "contact below threshold");
            None
        }
    }
}
