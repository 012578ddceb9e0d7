//! Physical constants and reference gas properties.
//!
//! ## Accuracy
//!
//! Constants marked "exact" have zero uncertainty by SI definition (2019 revision).
//! Gas properties for air are engineering reference values at 20 °C and one
//! standard atmosphere; they are adequate for lumped damping estimates, not for
//! metrology.
//!
//! ## References
//!
//! - NIST Reference on Constants, Units, and Uncertainty: <https://physics.nist.gov/cuu/Constants/>
//! - Bao, M. (2005). *Analysis and Design Principles of MEMS Devices*. Elsevier.
//! - Kaajakari, V. (2009). *Practical MEMS*. Small Gear Publishing.

use std::f64::consts::PI;

use crate::math::Scalar;

/// Vacuum permittivity ε₀ in farads per meter (F/m).
/// CODATA 2018 value 8.8541878128 × 10⁻¹² F/m.
pub const VACUUM_PERMITTIVITY: Scalar = 8.854_187_812_8e-12;
/// Boltzmann constant _k_B_ in joules per kelvin (J/K).
/// Exact value by 2019 SI definition: 1.380649 × 10⁻²³ J/K.
pub const BOLTZMANN_CONSTANT: Scalar = 1.380_649e-23;
/// Standard gravity _g_ₙ in m/s². Exact by definition.
pub const STANDARD_GRAVITY: Scalar = 9.806_65;

/// Standard atmosphere in pascals. Exact by definition.
pub const ATMOSPHERIC_PRESSURE: Scalar = 101_325.0;
/// Reference temperature for the air properties below (20 °C) in kelvin.
pub const REFERENCE_TEMPERATURE: Scalar = 293.15;
/// Mean free path of air at [`ATMOSPHERIC_PRESSURE`] and [`REFERENCE_TEMPERATURE`] (m).
pub const AIR_MEAN_FREE_PATH: Scalar = 68.0e-9;
/// Dynamic viscosity of air at [`REFERENCE_TEMPERATURE`] (Pa·s).
pub const AIR_VISCOSITY: Scalar = 1.81e-5;
/// Sutherland constant for air (K).
pub const AIR_SUTHERLAND_CONSTANT: Scalar = 110.4;

/// Returns the angular frequency corresponding to a linear frequency `hz`.
#[inline]
#[must_use]
pub fn angular_frequency(hz: Scalar) -> Scalar {
    2.0 * PI * hz
}

/// Returns the linear frequency in hertz for an angular frequency `omega` (rad/s).
#[inline]
#[must_use]
pub fn linear_frequency(omega: Scalar) -> Scalar {
    omega / (2.0 * PI)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn angular_and_linear_frequency_are_inverse() {
        let f = 12_345.0;
        assert_relative_eq!(linear_frequency(angular_frequency(f)), f, max_relative = 1.0e-12);
    }
}
