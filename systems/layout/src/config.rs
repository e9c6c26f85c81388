use std::f64::consts::FRAC_PI_6;

use serde::{Deserialize, Serialize};
use star_chart_core::Position;
use thiserror::Error;

/// Geometry constants driving the radial layout.
///
/// Every field falls back to its default when omitted, so configuration
/// files only need to list the values they override.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeometryConfig {
    /// Shared centre of the planet ring.
    pub center: Position,
    /// Distance from the centre to every planet.
    pub orbit_radius: f64,
    /// Edge length of the square a renderer reserves for each planet.
    pub planet_size: f64,
    /// Branch length for the first tier.
    pub branch_base_radius: f64,
    /// Extra branch length added per tier index.
    pub branch_radius_step: f64,
    /// Angular gap, in radians, between neighbouring achievements of a topic.
    pub angular_spread: f64,
    /// Radial offset applied to every other achievement of a topic.
    pub radial_jitter: f64,
    /// Distance beyond the branch endpoint at which junctions sit.
    pub junction_offset: f64,
    /// Angular step, in radians, between neighbouring tier satellites.
    pub tier_perturbation: f64,
    /// Distance from a planet to its tier satellites.
    pub satellite_radius: f64,
    /// Maximum number of tier satellites drawn per planet.
    pub max_satellites: usize,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            center: Position::new(0.0, 0.0),
            orbit_radius: 300.0,
            planet_size: 80.0,
            branch_base_radius: 80.0,
            branch_radius_step: 30.0,
            angular_spread: 0.3,
            radial_jitter: 15.0,
            junction_offset: 40.0,
            tier_perturbation: FRAC_PI_6,
            satellite_radius: 150.0,
            max_satellites: 5,
        }
    }
}

impl GeometryConfig {
    /// Checks that every value is finite and every length is non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("center.x", self.center.x),
            ("center.y", self.center.y),
            ("angular_spread", self.angular_spread),
            ("tier_perturbation", self.tier_perturbation),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field });
            }
        }

        let lengths = [
            ("orbit_radius", self.orbit_radius),
            ("planet_size", self.planet_size),
            ("branch_base_radius", self.branch_base_radius),
            ("branch_radius_step", self.branch_radius_step),
            ("radial_jitter", self.radial_jitter),
            ("junction_offset", self.junction_offset),
            ("satellite_radius", self.satellite_radius),
        ];
        for (field, value) in lengths {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field });
            }
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        Ok(())
    }
}

/// Reasons a geometry configuration is rejected.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A value was NaN or infinite.
    #[error("geometry field `{field}` must be finite")]
    NonFinite {
        /// Offending field.
        field: &'static str,
    },
    /// A length was negative.
    #[error("geometry field `{field}` must not be negative (received {value})")]
    Negative {
        /// Offending field.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
}
