//! Thermomechanical and readout noise budgets.

use serde::{Deserialize, Serialize};

use crate::constants::{BOLTZMANN_CONSTANT, STANDARD_GRAVITY};
use crate::errors::{require_non_negative, require_positive, MemsError};
use crate::math::Scalar;

/// Displacement-referred noise budget of a resonant sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoiseBudget {
    /// Thermal RMS displacement √(k_B·T/k), in m.
    pub thermal_displacement: Scalar,
    /// Readout RMS displacement e_n·√BW, in m.
    pub electronic_displacement: Scalar,
    /// Quadrature sum of both contributions, in m.
    pub total_displacement: Scalar,
    /// Minimum detectable displacement, equal to the total, in m.
    pub min_detectable_displacement: Scalar,
    /// Minimum detectable acceleration `total·ω_n²`, in m/s².
    pub min_detectable_acceleration: Scalar,
}

impl NoiseBudget {
    /// Minimum detectable acceleration in units of g.
    #[must_use]
    pub fn min_detectable_acceleration_g(&self) -> Scalar {
        self.min_detectable_acceleration / STANDARD_GRAVITY
    }
}

/// Builds a [`NoiseBudget`] for mass `mass` (kg) and stiffness `stiffness`
/// (N/m) at `temperature` (K), with readout noise density
/// `electronic_density` (m/√Hz) integrated over `bandwidth` (Hz).
pub fn noise_budget(
    mass: Scalar,
    stiffness: Scalar,
    temperature: Scalar,
    electronic_density: Scalar,
    bandwidth: Scalar,
) -> Result<NoiseBudget, MemsError> {
    require_positive("mass", mass)?;
    require_positive("stiffness", stiffness)?;
    require_positive("temperature", temperature)?;
    require_non_negative("electronic_noise_density", electronic_density)?;
    require_non_negative("bandwidth", bandwidth)?;

    let thermal = (BOLTZMANN_CONSTANT * temperature / stiffness).sqrt();
    let electronic = electronic_density * bandwidth.sqrt();
    let total = thermal.hypot(electronic);
    let omega_n_sq = stiffness / mass;

    Ok(NoiseBudget {
        thermal_displacement: thermal,
        electronic_displacement: electronic,
        total_displacement: total,
        min_detectable_displacement: total,
        min_detectable_acceleration: total * omega_n_sq,
    })
}

/// Brownian (mechanical-thermal) noise of a damped proof mass.
///
/// The damping coefficient sets a white force noise `√(4·k_B·T·b)`; dividing by
/// the mass refers it to the input acceleration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrownianNoise {
    /// Force noise density in N/√Hz.
    pub force_density: Scalar,
    /// Acceleration noise density in (m/s²)/√Hz.
    pub acceleration_density: Scalar,
}

impl BrownianNoise {
    /// Noise densities for mass `mass` (kg), damping `damping` (N·s/m) and
    /// `temperature` (K).
    pub fn new(mass: Scalar, damping: Scalar, temperature: Scalar) -> Result<Self, MemsError> {
        require_positive("mass", mass)?;
        require_non_negative("damping", damping)?;
        require_positive("temperature", temperature)?;
        let force_density = (4.0 * BOLTZMANN_CONSTANT * temperature * damping).sqrt();
        Ok(Self {
            force_density,
            acceleration_density: force_density / mass,
        })
    }

    /// Acceleration noise density in g/√Hz.
    #[must_use]
    pub fn acceleration_density_g(&self) -> Scalar {
        self.acceleration_density / STANDARD_GRAVITY
    }

    /// RMS acceleration noise integrated over `bandwidth` Hz, in m/s².
    #[must_use]
    pub fn rms_acceleration(&self, bandwidth: Scalar) -> Scalar {
        self.acceleration_density * bandwidth.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn thermal_only_budget_is_equipartition() {
        let nb = noise_budget(1.0e-10, 4.0, 300.0, 0.0, 1.0e3).expect("budget");
        let expected = (BOLTZMANN_CONSTANT * 300.0 / 4.0).sqrt();
        assert_relative_eq!(nb.thermal_displacement, expected, max_relative = 1.0e-12);
        assert_eq!(nb.electronic_displacement, 0.0);
        assert_relative_eq!(nb.total_displacement, expected, max_relative = 1.0e-12);
        assert_relative_eq!(
            nb.min_detectable_acceleration,
            expected * 4.0 / 1.0e-10,
            max_relative = 1.0e-12
        );
    }

    #[test]
    fn electronic_noise_adds_in_quadrature() {
        let nb = noise_budget(1.0e-10, 4.0, 300.0, 1.0e-12, 100.0).expect("budget");
        assert_relative_eq!(nb.electronic_displacement, 1.0e-11, max_relative = 1.0e-12);
        let expected = (nb.thermal_displacement.powi(2) + 1.0e-22).sqrt();
        assert_relative_eq!(nb.total_displacement, expected, max_relative = 1.0e-12);
        assert!(nb.total_displacement >= nb.thermal_displacement);
    }

    #[test]
    fn colder_device_is_quieter() {
        let warm = noise_budget(1.0e-10, 4.0, 300.0, 0.0, 1.0).expect("warm");
        let cold = noise_budget(1.0e-10, 4.0, 77.0, 0.0, 1.0).expect("cold");
        assert!(cold.total_displacement < warm.total_displacement);
        assert!(cold.min_detectable_acceleration_g() < warm.min_detectable_acceleration_g());
    }

    #[test]
    fn zero_stiffness_is_rejected() {
        assert!(noise_budget(1.0e-10, 0.0, 300.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn brownian_force_density_from_damping() {
        let b = 1.0e-6;
        let m = 1.0e-9;
        let noise = BrownianNoise::new(m, b, 300.0).expect("noise");
        let force = (4.0 * BOLTZMANN_CONSTANT * 300.0 * b).sqrt();
        assert_relative_eq!(noise.force_density, force, max_relative = 1.0e-12);
        assert_relative_eq!(noise.acceleration_density, force / m, max_relative = 1.0e-12);
        assert_relative_eq!(
            noise.rms_acceleration(100.0),
            10.0 * noise.acceleration_density,
            max_relative = 1.0e-12
        );
    }

    #[test]
    fn vacuum_has_no_brownian_noise() {
        let noise = BrownianNoise::new(1.0e-9, 0.0, 300.0).expect("noise");
        assert_eq!(noise.acceleration_density_g(), 0.0);
    }
}
