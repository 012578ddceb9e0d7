//! Nonlinear response: Duffing backbone and electrostatic pull-in.
//!
//! Large deflections stiffen a doubly-clamped flexure through mid-plane
//! stretching, giving a restoring force `k·x + α·x³`. The peak of the forced
//! response then follows the backbone
//!
//! ```text
//! f_peak(A) = f₀ · √(1 + (3/8)·(α/k)·A²)
//! ```
//!
//! A parallel-plate electrode at gap `g₀` pulls the plate with
//! `ε₀·A·V² / (2·(g₀ − x)²)`; the stable equilibrium disappears at `x = g₀/3`,
//! reached at the pull-in voltage `V_pi = √(8·k·g₀³ / (27·ε₀·A))`.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::VACUUM_PERMITTIVITY;
use crate::errors::{require_positive, MemsError};
use crate::geometry::DeviceGeometry;
use crate::materials::MaterialProperties;
use crate::math::{bisect, ConvergenceCriteria, Scalar};
use crate::resolver::{resolve, MechanicalModel};

/// Sign of the cubic stiffness term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NonlinearityKind {
    /// α > 0: resonance bends toward higher frequency.
    Hardening,
    /// α < 0: resonance bends toward lower frequency.
    Softening,
    /// α = 0.
    Linear,
}

impl NonlinearityKind {
    /// Classifies a cubic stiffness coefficient.
    #[must_use]
    pub fn from_cubic_stiffness(alpha: Scalar) -> Self {
        if alpha > 0.0 {
            Self::Hardening
        } else if alpha < 0.0 {
            Self::Softening
        } else {
            Self::Linear
        }
    }
}

/// Amplitude-dependent peak frequency of a Duffing resonator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackboneCurve {
    /// Cubic stiffness α in N/m³.
    pub cubic_stiffness: Scalar,
    /// Small-amplitude natural frequency in Hz.
    pub linear_frequency_hz: Scalar,
    /// Hardening, softening or linear.
    pub kind: NonlinearityKind,
    /// Vibration amplitudes in m.
    pub amplitudes: Vec<Scalar>,
    /// Peak frequency at each amplitude, in Hz.
    pub frequencies_hz: Vec<Scalar>,
}

impl BackboneCurve {
    /// Relative frequency shift `f_peak/f₀ − 1` at each amplitude.
    #[must_use]
    pub fn relative_shift(&self) -> Vec<Scalar> {
        self.frequencies_hz
            .iter()
            .map(|f| f / self.linear_frequency_hz - 1.0)
            .collect()
    }
}

/// Mid-plane stretching estimate of the cubic stiffness, `units·π⁴·E·w·t / (8·L³)`.
#[must_use]
pub fn cubic_stiffness(geometry: &DeviceGeometry, material: &MaterialProperties) -> Scalar {
    Scalar::from(geometry.units)
        * PI.powi(4)
        * material.youngs_modulus
        * geometry.beam_width
        * geometry.beam_thickness
        / (8.0 * geometry.beam_length.powi(3))
}

/// Backbone curve with α taken from [`cubic_stiffness`].
pub fn backbone_curve(
    geometry: &DeviceGeometry,
    material: &MaterialProperties,
    amplitudes: &[Scalar],
) -> Result<BackboneCurve, MemsError> {
    let model = resolve(geometry, material)?;
    backbone_with_alpha(&model, cubic_stiffness(geometry, material), amplitudes)
}

/// Backbone curve for a caller-supplied cubic stiffness `alpha` (N/m³).
///
/// Fails with [`MemsError::Validation`] when a softening term drives the
/// radicand negative at some amplitude.
pub fn backbone_with_alpha(
    model: &MechanicalModel,
    alpha: Scalar,
    amplitudes: &[Scalar],
) -> Result<BackboneCurve, MemsError> {
    if !alpha.is_finite() {
        return Err(MemsError::input("cubic_stiffness", alpha, "must be finite"));
    }
    let f0 = model.natural_frequency_hz();
    let ratio = alpha / model.stiffness;

    let frequencies_hz = amplitudes
        .iter()
        .map(|&a| {
            let radicand = 1.0 + 0.375 * ratio * a * a;
            if radicand < 0.0 || !radicand.is_finite() {
                return Err(MemsError::validation(
                    "backbone_radicand",
                    radicand,
                    format!("softening term exceeds linear stiffness at amplitude {a:e} m"),
                ));
            }
            Ok(f0 * radicand.sqrt())
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BackboneCurve {
        cubic_stiffness: alpha,
        linear_frequency_hz: f0,
        kind: NonlinearityKind::from_cubic_stiffness(alpha),
        amplitudes: amplitudes.to_vec(),
        frequencies_hz,
    })
}

/// Pull-in voltage of a parallel-plate actuator, `√(8·k·g₀³ / (27·ε₀·A))`.
pub fn pull_in_voltage(stiffness: Scalar, gap: Scalar, area: Scalar) -> Result<Scalar, MemsError> {
    require_positive("stiffness", stiffness)?;
    require_positive("gap", gap)?;
    require_positive("electrode_area", area)?;
    Ok((8.0 * stiffness * gap.powi(3) / (27.0 * VACUUM_PERMITTIVITY * area)).sqrt())
}

/// Electrostatic equilibrium solver with an explicit iteration budget.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PullInSolver {
    /// Bisection budget and tolerance.
    pub criteria: ConvergenceCriteria,
}

impl PullInSolver {
    /// Creates a solver with custom criteria.
    #[must_use]
    pub const fn new(criteria: ConvergenceCriteria) -> Self {
        Self { criteria }
    }

    /// Static deflection toward the electrode under bias `voltage`.
    ///
    /// Solves `k·x = ε₀·A·V² / (2·(g₀ − x)²)` on the stable branch `[0, g₀/3]`.
    /// Voltages beyond `V_pi` fail with [`MemsError::PullIn`]; at exactly
    /// `V_pi` the result is `g₀/3`.
    pub fn solve(
        &self,
        voltage: Scalar,
        geometry: &DeviceGeometry,
        stiffness: Scalar,
    ) -> Result<Scalar, MemsError> {
        if !voltage.is_finite() {
            return Err(MemsError::input("bias_voltage", voltage, "must be finite"));
        }
        let gap = geometry.gap;
        let area = geometry.electrode_area();
        let v_pi = pull_in_voltage(stiffness, gap, area)?;
        if voltage.abs() > v_pi {
            return Err(MemsError::PullIn {
                voltage,
                pull_in_voltage: v_pi,
            });
        }
        if voltage == 0.0 {
            return Ok(0.0);
        }

        let drive = 0.5 * VACUUM_PERMITTIVITY * area * voltage * voltage;
        let residual = |x: Scalar| stiffness * x - drive / (gap - x).powi(2);
        let x_max = gap / 3.0;
        // rounding can leave the residual a hair below zero at V == V_pi
        if residual(x_max) <= 0.0 {
            return Ok(x_max);
        }

        let root = bisect(residual, 0.0, x_max, &self.criteria)?;
        debug!(
            voltage,
            pull_in_voltage = v_pi,
            iterations = root.iterations,
            "electrostatic equilibrium converged"
        );
        Ok(root.x)
    }
}

/// [`PullInSolver::solve`] with default criteria.
pub fn equilibrium_displacement(
    voltage: Scalar,
    geometry: &DeviceGeometry,
    stiffness: Scalar,
) -> Result<Scalar, MemsError> {
    PullInSolver::default().solve(voltage, geometry, stiffness)
}
