//! Ambient gas state: pressure, temperature and the rarefaction quantities derived from them.

use serde::{Deserialize, Serialize};

use crate::constants::{
    AIR_MEAN_FREE_PATH, AIR_SUTHERLAND_CONSTANT, AIR_VISCOSITY, ATMOSPHERIC_PRESSURE,
    REFERENCE_TEMPERATURE,
};
use crate::errors::{require_non_negative, require_positive, MemsError};
use crate::math::Scalar;

/// Pressure and temperature of the gas surrounding the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentState {
    /// Ambient pressure in Pa. Zero is an ideal vacuum.
    #[serde(rename = "P")]
    pub pressure: Scalar,
    /// Ambient temperature in K.
    #[serde(rename = "T")]
    pub temperature: Scalar,
}

impl Default for EnvironmentState {
    fn default() -> Self {
        Self::atmospheric(300.0)
    }
}

impl EnvironmentState {
    /// Creates an environment; see [`EnvironmentState::validate`].
    #[must_use]
    pub const fn new(pressure: Scalar, temperature: Scalar) -> Self {
        Self {
            pressure,
            temperature,
        }
    }

    /// One standard atmosphere at `temperature`.
    #[must_use]
    pub const fn atmospheric(temperature: Scalar) -> Self {
        Self::new(ATMOSPHERIC_PRESSURE, temperature)
    }

    /// Returns a copy at a different pressure.
    #[must_use]
    pub const fn with_pressure(self, pressure: Scalar) -> Self {
        Self::new(pressure, self.temperature)
    }

    /// Requires `pressure >= 0` and `temperature > 0`, both finite.
    pub fn validate(&self) -> Result<(), MemsError> {
        require_non_negative("pressure", self.pressure)?;
        require_positive("temperature", self.temperature)?;
        Ok(())
    }

    /// Gas mean free path λ(P, T) = λ_ref · (P_atm / P) · (T / T_ref), in m.
    ///
    /// Infinite in vacuum.
    #[must_use]
    pub fn mean_free_path(&self) -> Scalar {
        if self.pressure == 0.0 {
            return Scalar::INFINITY;
        }
        AIR_MEAN_FREE_PATH * (ATMOSPHERIC_PRESSURE / self.pressure)
            * (self.temperature / REFERENCE_TEMPERATURE)
    }

    /// Knudsen number Kn = λ / h for a gap `gap` in m.
    #[must_use]
    pub fn knudsen_number(&self, gap: Scalar) -> Scalar {
        self.mean_free_path() / gap
    }

    /// Slip-flow rarefaction factor Q_eff = 1 / (1 + 2·Kn).
    ///
    /// Tends to 1 in the continuum limit and to 0 in vacuum.
    #[must_use]
    pub fn rarefaction_factor(&self, gap: Scalar) -> Scalar {
        1.0 / (1.0 + 2.0 * self.knudsen_number(gap))
    }

    /// Dynamic viscosity of air from Sutherland's law, in Pa·s.
    #[must_use]
    pub fn viscosity(&self) -> Scalar {
        let t = self.temperature;
        AIR_VISCOSITY
            * (t / REFERENCE_TEMPERATURE).powf(1.5)
            * (REFERENCE_TEMPERATURE + AIR_SUTHERLAND_CONSTANT)
            / (t + AIR_SUTHERLAND_CONSTANT)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn reference_conditions_reproduce_tabulated_air() {
        let env = EnvironmentState::atmospheric(REFERENCE_TEMPERATURE);
        assert_relative_eq!(env.mean_free_path(), 68.0e-9, max_relative = 1.0e-12);
        assert_relative_eq!(env.viscosity(), 1.81e-5, max_relative = 1.0e-12);
        assert_relative_eq!(env.knudsen_number(2.0e-6), 0.034, max_relative = 1.0e-9);
    }

    #[test]
    fn mean_free_path_scales_inversely_with_pressure() {
        let atm = EnvironmentState::atmospheric(REFERENCE_TEMPERATURE);
        let low = atm.with_pressure(ATMOSPHERIC_PRESSURE / 100.0);
        assert_relative_eq!(
            low.mean_free_path(),
            100.0 * atm.mean_free_path(),
            max_relative = 1.0e-12
        );
    }

    #[test]
    fn vacuum_is_fully_rarefied() {
        let vac = EnvironmentState::new(0.0, 300.0);
        vac.validate().expect("vacuum allowed");
        assert!(vac.mean_free_path().is_infinite());
        assert_eq!(vac.rarefaction_factor(2.0e-6), 0.0);
    }

    #[test]
    fn negative_pressure_and_zero_temperature_are_rejected() {
        assert!(EnvironmentState::new(-1.0, 300.0).validate().is_err());
        assert!(EnvironmentState::new(1.0e5, 0.0).validate().is_err());
    }

    #[test]
    fn viscosity_rises_with_temperature() {
        let cold = EnvironmentState::atmospheric(250.0);
        let hot = EnvironmentState::atmospheric(400.0);
        assert!(hot.viscosity() > cold.viscosity());
    }
}
