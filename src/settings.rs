//! Routing configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SettingsError};

/// Immutable configuration for a routing session.
///
/// Lengths are in model units (millimetres for typical hosts), angles in
/// degrees. Construct once, adjust with the `with_*` builders or load from
/// JSON, and pass by reference; the engine never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TraceSettings {
    fitting_angle: f64,
    min_clearance_to_elements: f64,
    min_clearance_to_connector: f64,
    min_distance_from_source: f64,
    max_floor_clearance: f64,
    allowed_angles: Vec<f64>,
    include_insulation: bool,
    min_collision_volume: f64,
    vertex_tolerance: f64,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self {
            fitting_angle: 90.0,
            min_clearance_to_elements: 100.0,
            min_clearance_to_connector: 100.0,
            min_distance_from_source: 50.0,
            max_floor_clearance: 3000.0,
            allowed_angles: vec![15.0, 30.0, 45.0, 60.0, 90.0],
            include_insulation: true,
            min_collision_volume: 1e-6,
            vertex_tolerance: 1e-3,
        }
    }
}

impl TraceSettings {
    /// Parses settings from JSON; absent fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Parse`] for malformed JSON or unknown fields
    /// and [`SettingsError::Invalid`] if the values fail [`Self::validate`].
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json).map_err(SettingsError::from)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("min_clearance_to_elements", self.min_clearance_to_elements),
            ("min_clearance_to_connector", self.min_clearance_to_connector),
            ("min_distance_from_source", self.min_distance_from_source),
            ("max_floor_clearance", self.max_floor_clearance),
            ("min_collision_volume", self.min_collision_volume),
            ("vertex_tolerance", self.vertex_tolerance),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(field, format!("must be a non-negative number, got {value}")));
            }
        }
        if !(self.fitting_angle > 0.0 && self.fitting_angle <= 180.0) {
            return Err(invalid(
                "fitting_angle",
                format!("must be in (0, 180], got {}", self.fitting_angle),
            ));
        }
        if self.allowed_angles.is_empty() {
            return Err(invalid("allowed_angles", "must not be empty".into()));
        }
        if let Some(bad) = self
            .allowed_angles
            .iter()
            .find(|a| !(**a > 0.0 && **a <= 180.0))
        {
            return Err(invalid("allowed_angles", format!("{bad} is not in (0, 180]")));
        }
        Ok(())
    }

    // ── Getters ────────────────────────────────────────────────

    /// Default angle for new fittings.
    #[must_use]
    pub fn fitting_angle(&self) -> f64 {
        self.fitting_angle
    }

    /// Minimum straight length kept clear of other elements.
    #[must_use]
    pub fn min_clearance_to_elements(&self) -> f64 {
        self.min_clearance_to_elements
    }

    /// Minimum straight length kept clear of a connector.
    #[must_use]
    pub fn min_clearance_to_connector(&self) -> f64 {
        self.min_clearance_to_connector
    }

    /// Extra length reserved next to an obstruction at a run end.
    #[must_use]
    pub fn min_distance_from_source(&self) -> f64 {
        self.min_distance_from_source
    }

    #[must_use]
    pub fn max_floor_clearance(&self) -> f64 {
        self.max_floor_clearance
    }

    #[must_use]
    pub fn allowed_angles(&self) -> &[f64] {
        &self.allowed_angles
    }

    /// Whether tap standoffs include the child branch's insulation.
    #[must_use]
    pub fn include_insulation(&self) -> bool {
        self.include_insulation
    }

    /// Intersection volume a pair must exceed to count as a collision.
    #[must_use]
    pub fn min_collision_volume(&self) -> f64 {
        self.min_collision_volume
    }

    /// Distance within which free vertices coincide.
    #[must_use]
    pub fn vertex_tolerance(&self) -> f64 {
        self.vertex_tolerance
    }

    /// Clearance trimmed off both ends of a run.
    #[must_use]
    pub fn end_clearance(&self) -> f64 {
        self.min_clearance_to_elements
            .min(self.min_clearance_to_connector)
    }

    /// Returns `true` if `angle` (degrees) matches an allowed fitting angle.
    #[must_use]
    pub fn is_angle_allowed(&self, angle: f64, tolerance: f64) -> bool {
        self.allowed_angles
            .iter()
            .any(|a| (a - angle).abs() <= tolerance)
    }

    // ── Builders ───────────────────────────────────────────────

    #[must_use]
    pub fn with_fitting_angle(mut self, degrees: f64) -> Self {
        self.fitting_angle = degrees;
        self
    }

    #[must_use]
    pub fn with_min_clearance_to_elements(mut self, length: f64) -> Self {
        self.min_clearance_to_elements = length;
        self
    }

    #[must_use]
    pub fn with_min_clearance_to_connector(mut self, length: f64) -> Self {
        self.min_clearance_to_connector = length;
        self
    }

    #[must_use]
    pub fn with_min_distance_from_source(mut self, length: f64) -> Self {
        self.min_distance_from_source = length;
        self
    }

    #[must_use]
    pub fn with_max_floor_clearance(mut self, length: f64) -> Self {
        self.max_floor_clearance = length;
        self
    }

    #[must_use]
    pub fn with_allowed_angles(mut self, degrees: Vec<f64>) -> Self {
        self.allowed_angles = degrees;
        self
    }

    #[must_use]
    pub fn with_include_insulation(mut self, include: bool) -> Self {
        self.include_insulation = include;
        self
    }

    #[must_use]
    pub fn with_min_collision_volume(mut self, volume: f64) -> Self {
        self.min_collision_volume = volume;
        self
    }

    #[must_use]
    pub fn with_vertex_tolerance(mut self, tolerance: f64) -> Self {
        self.vertex_tolerance = tolerance;
        self
    }
}

fn invalid(field: &'static str, reason: String) -> crate::error::TraceError {
    SettingsError::Invalid { field, reason }.into()
}
