use crate::kernel::GeometryKernel;
use crate::model::{CategoryFilter, ElementProvider, WorldIndex};
use crate::settings::TraceSettings;

/// Everything an engine call reads from the outside world.
///
/// Built by the caller for a routing session and passed by reference; the
/// engine keeps no state of its own between calls.
#[derive(Clone, Copy)]
pub struct RoutingContext<'a> {
    pub kernel: &'a dyn GeometryKernel,
    pub elements: &'a dyn ElementProvider,
    pub world: &'a dyn WorldIndex,
    pub settings: &'a TraceSettings,
    /// Categories left out of every world scan.
    pub category_filter: &'a CategoryFilter,
}

impl<'a> RoutingContext<'a> {
    /// Creates a context over a single host model that serves both as element
    /// provider and world index.
    #[must_use]
    pub fn new<M>(
        kernel: &'a dyn GeometryKernel,
        model: &'a M,
        settings: &'a TraceSettings,
        category_filter: &'a CategoryFilter,
    ) -> Self
    where
        M: ElementProvider + WorldIndex,
    {
        Self {
            kernel,
            elements: model,
            world: model,
            settings,
            category_filter,
        }
    }
}
