//! Release-step checks for surface-micromachined structures: capillary and
//! van der Waals stiction after sacrificial etch, and residual-stress curl.
//!
//! The plate is pulled toward the substrate, so the relevant restoring
//! stiffness is the out-of-plane one, `E·w·t³ / (4·L³)` per cantilever segment
//! scaled by the same topology multiplier as the in-plane stiffness.

use serde::{Deserialize, Serialize};

use crate::errors::{require_positive, MemsError};
use crate::geometry::DeviceGeometry;
use crate::materials::MaterialProperties;
use crate::math::Scalar;

/// Hamaker constant for silicon on silicon across air, in J.
pub const HAMAKER_SILICON: Scalar = 2.0e-19;

/// Rinse liquid wetting the gap while the sacrificial layer dries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseConditions {
    /// Liquid–air surface tension γ in N/m.
    pub surface_tension: Scalar,
    /// Contact angle θ on the structural surfaces, in radians.
    pub contact_angle: Scalar,
}

impl Default for ReleaseConditions {
    fn default() -> Self {
        Self::water()
    }
}

impl ReleaseConditions {
    /// DI water on hydrophilic oxide-terminated silicon.
    #[must_use]
    pub const fn water() -> Self {
        Self {
            surface_tension: 0.072,
            contact_angle: 0.0,
        }
    }

    fn validate(&self) -> Result<(), MemsError> {
        require_positive("surface_tension", self.surface_tension)?;
        if !(0.0..std::f64::consts::PI).contains(&self.contact_angle) {
            return Err(MemsError::input(
                "contact_angle",
                self.contact_angle,
                "must lie in [0, π)",
            ));
        }
        Ok(())
    }

    /// Laplace pressure `2·γ·cos θ / h` across a gap `gap`, in Pa.
    #[must_use]
    pub fn capillary_pressure(&self, gap: Scalar) -> Scalar {
        2.0 * self.surface_tension * self.contact_angle.cos() / gap
    }

    /// Capillary force on a wetted `area` over `gap`, in N. Negative for a
    /// non-wetting liquid.
    #[must_use]
    pub fn capillary_force(&self, area: Scalar, gap: Scalar) -> Scalar {
        self.capillary_pressure(gap) * area
    }
}

/// Non-retarded van der Waals attraction `A_H·area / (6π·d³)` between flat
/// surfaces a distance `separation` apart, in N.
pub fn van_der_waals_force(area: Scalar, separation: Scalar) -> Result<Scalar, MemsError> {
    require_positive("area", area)?;
    require_positive("separation", separation)?;
    Ok(HAMAKER_SILICON * area / (6.0 * std::f64::consts::PI * separation.powi(3)))
}

/// Suspension stiffness normal to the substrate, in N/m.
#[must_use]
pub fn out_of_plane_stiffness(geometry: &DeviceGeometry, material: &MaterialProperties) -> Scalar {
    Scalar::from(geometry.units)
        * geometry.topology.stiffness_multiplier()
        * material.youngs_modulus
        * geometry.beam_width
        * geometry.beam_thickness.powi(3)
        / (4.0 * geometry.beam_length.powi(3))
}

/// Outcome of a stiction check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StictionReport {
    /// Capillary force over the plate, in N.
    pub capillary_force: Scalar,
    /// Spring force with the plate touching down, `k_z·h`, in N.
    pub restoring_force: Scalar,
    /// `capillary_force / restoring_force`; above 1 the plate sticks.
    pub stiction_number: Scalar,
}

impl StictionReport {
    /// True if capillary pull outweighs the spring.
    #[must_use]
    pub fn sticks(&self) -> bool {
        self.stiction_number > 1.0
    }
}

/// Compares capillary pull on the plate against the out-of-plane spring.
pub fn stiction(
    geometry: &DeviceGeometry,
    material: &MaterialProperties,
    conditions: &ReleaseConditions,
) -> Result<StictionReport, MemsError> {
    geometry.validate()?;
    material.validate()?;
    conditions.validate()?;
    let capillary_force = conditions.capillary_force(geometry.electrode_area(), geometry.gap);
    let restoring_force = out_of_plane_stiffness(geometry, material) * geometry.gap;
    Ok(StictionReport {
        capillary_force,
        restoring_force,
        stiction_number: capillary_force / restoring_force,
    })
}

/// Longest single cantilever of this cross-section that frees itself after
/// drying, `(E·t³·h² / (8·γ·cos θ))^¼`, in m.
///
/// At this length the stiction number of a bare cantilever is exactly 1.
pub fn critical_length(
    geometry: &DeviceGeometry,
    material: &MaterialProperties,
    conditions: &ReleaseConditions,
) -> Result<Scalar, MemsError> {
    conditions.validate()?;
    let wetting = conditions.surface_tension * conditions.contact_angle.cos();
    if wetting <= 0.0 {
        return Err(MemsError::validation(
            "capillary_tension",
            wetting,
            "non-wetting liquid leaves no stiction limit",
        ));
    }
    let t = require_positive("beam_thickness", geometry.beam_thickness)?;
    let h = require_positive("gap", geometry.gap)?;
    Ok((material.youngs_modulus * t.powi(3) * h * h / (8.0 * wetting)).powf(0.25))
}

/// Curl of a released beam under gradient residual stress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidualCurl {
    /// Stoney radius of curvature `E·t / (6·σ·(1 − ν))`, in m; infinite when
    /// unstressed, negative when compressive.
    pub radius_of_curvature: Scalar,
    /// Tip deflection `L² / (2R)`, in m.
    pub tip_deflection: Scalar,
}

/// Stoney curvature and tip deflection of one beam segment.
pub fn residual_curl(
    geometry: &DeviceGeometry,
    material: &MaterialProperties,
) -> Result<ResidualCurl, MemsError> {
    material.validate()?;
    let t = require_positive("beam_thickness", geometry.beam_thickness)?;
    let l = require_positive("beam_length", geometry.beam_length)?;
    let sigma = material.residual_stress;
    if sigma == 0.0 {
        return Ok(ResidualCurl {
            radius_of_curvature: Scalar::INFINITY,
            tip_deflection: 0.0,
        });
    }
    let radius = material.youngs_modulus * t / (6.0 * sigma * (1.0 - material.poisson_ratio));
    Ok(ResidualCurl {
        radius_of_curvature: radius,
        tip_deflection: l * l / (2.0 * radius),
    })
}
