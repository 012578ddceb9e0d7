//! Fabrication-tolerance sensitivity of the resonant frequency.
//!
//! Each parameter is perturbed by `±tolerance_percent` on its own and the
//! frequency is re-derived through the full resolver (and damping path where
//! relevant). Both directions are reported; the response to `w` and `L` is
//! far from symmetric at ±10 %.
//!
//! The nominal device must meet the manufacturing limits. Its perturbed
//! corners only need positive dimensions, so a design sitting on a process
//! bound still gets a full report.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::linear_frequency;
use crate::errors::MemsError;
use crate::geometry::ManufacturingLimits;
use crate::math::Scalar;
use crate::simulation::DeviceConfig;

/// Default ± fabrication tolerance in percent.
pub const DEFAULT_TOLERANCE_PERCENT: Scalar = 10.0;

/// Relative frequency shift for a ± perturbation of one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyShift {
    /// Name of the perturbed parameter.
    pub parameter: String,
    /// Frequency change in percent when the parameter is raised.
    pub plus_percent: Scalar,
    /// Frequency change in percent when the parameter is lowered.
    pub minus_percent: Scalar,
}

impl FrequencyShift {
    /// Larger of the two absolute shifts, in percent.
    #[must_use]
    pub fn worst_case_percent(&self) -> Scalar {
        self.plus_percent.abs().max(self.minus_percent.abs())
    }
}

/// Perturbs `base` by `±tolerance_percent`, evaluates the frequency at the
/// nominal and both perturbed values, and returns the relative shifts.
///
/// `evaluator` maps a parameter value to a frequency; any error it raises is
/// propagated unchanged.
pub fn sensitivity<F>(
    name: &str,
    base: Scalar,
    tolerance_percent: Scalar,
    mut evaluator: F,
) -> Result<FrequencyShift, MemsError>
where
    F: FnMut(Scalar) -> Result<Scalar, MemsError>,
{
    check_tolerance(tolerance_percent)?;
    if !base.is_finite() {
        return Err(MemsError::input("sensitivity_base", base, "must be finite"));
    }
    let fraction = tolerance_percent / 100.0;
    let nominal = evaluator(base)?;
    if !(nominal.is_finite() && nominal > 0.0) {
        return Err(MemsError::validation(
            "nominal_frequency",
            nominal,
            format!("cannot normalize shifts for `{name}`"),
        ));
    }
    let plus = evaluator(base * (1.0 + fraction))?;
    let minus = evaluator(base * (1.0 - fraction))?;
    Ok(FrequencyShift {
        parameter: name.to_owned(),
        plus_percent: 100.0 * (plus / nominal - 1.0),
        minus_percent: 100.0 * (minus / nominal - 1.0),
    })
}

fn check_tolerance(tolerance_percent: Scalar) -> Result<Scalar, MemsError> {
    if !(tolerance_percent > 0.0 && tolerance_percent < 100.0) {
        return Err(MemsError::input(
            "tolerance_percent",
            tolerance_percent,
            "must lie in (0, 100)",
        ));
    }
    Ok(tolerance_percent)
}

/// Device parameter that can be perturbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    /// Flexure width w.
    BeamWidth,
    /// Flexure length L.
    BeamLength,
    /// Flexure thickness t.
    BeamThickness,
    /// Gap h.
    Gap,
    /// Proof-mass length.
    ProofMassLength,
    /// Proof-mass width.
    ProofMassWidth,
    /// Proof-mass thickness.
    ProofMassThickness,
    /// Young's modulus E.
    YoungsModulus,
    /// Density ρ.
    Density,
    /// Ambient pressure.
    Pressure,
    /// Ambient temperature.
    Temperature,
}

impl Parameter {
    /// All parameters in report order.
    pub const ALL: [Self; 11] = [
        Self::BeamWidth,
        Self::BeamLength,
        Self::BeamThickness,
        Self::Gap,
        Self::ProofMassLength,
        Self::ProofMassWidth,
        Self::ProofMassThickness,
        Self::YoungsModulus,
        Self::Density,
        Self::Pressure,
        Self::Temperature,
    ];

    /// Snake-case name used in reports and CSV headers.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BeamWidth => "beam_width",
            Self::BeamLength => "beam_length",
            Self::BeamThickness => "beam_thickness",
            Self::Gap => "gap",
            Self::ProofMassLength => "proof_mass_length",
            Self::ProofMassWidth => "proof_mass_width",
            Self::ProofMassThickness => "proof_mass_thickness",
            Self::YoungsModulus => "youngs_modulus",
            Self::Density => "density",
            Self::Pressure => "pressure",
            Self::Temperature => "temperature",
        }
    }

    /// True if the parameter can move the undamped natural frequency.
    #[must_use]
    pub const fn affects_stiffness_or_mass(self) -> bool {
        !matches!(self, Self::Gap | Self::Pressure | Self::Temperature)
    }

    /// Current value in `config`, or `None` when it does not apply
    /// (proof-mass dimensions on a bare flexure, or an unknown material name).
    #[must_use]
    pub fn value(self, config: &DeviceConfig) -> Option<Scalar> {
        let g = &config.geometry;
        let pm = g.proof_mass.as_ref();
        match self {
            Self::BeamWidth => Some(g.beam_width),
            Self::BeamLength => Some(g.beam_length),
            Self::BeamThickness => Some(g.beam_thickness),
            Self::Gap => Some(g.gap),
            Self::ProofMassLength => pm.map(|p| p.length),
            Self::ProofMassWidth => pm.map(|p| p.width),
            Self::ProofMassThickness => pm.map(|p| p.thickness),
            Self::YoungsModulus => config.material.properties().ok().map(|m| m.youngs_modulus),
            Self::Density => config.material.properties().ok().map(|m| m.density),
            Self::Pressure => Some(config.environment.pressure),
            Self::Temperature => Some(config.environment.temperature),
        }
    }

    /// Returns a copy of `config` with this parameter set to `value`.
    ///
    /// Material parameters resolve the material first and store explicit
    /// properties in the copy.
    pub fn with_value(
        self,
        config: &DeviceConfig,
        value: Scalar,
    ) -> Result<DeviceConfig, MemsError> {
        let mut out = config.clone();
        let missing = || MemsError::Config(format!("`{self}` requires a proof mass"));
        match self {
            Self::BeamWidth => out.geometry.beam_width = value,
            Self::BeamLength => out.geometry.beam_length = value,
            Self::BeamThickness => out.geometry.beam_thickness = value,
            Self::Gap => out.geometry.gap = value,
            Self::ProofMassLength => {
                out.geometry.proof_mass.as_mut().ok_or_else(missing)?.length = value;
            }
            Self::ProofMassWidth => {
                out.geometry.proof_mass.as_mut().ok_or_else(missing)?.width = value;
            }
            Self::ProofMassThickness => {
                out.geometry.proof_mass.as_mut().ok_or_else(missing)?.thickness = value;
            }
            Self::YoungsModulus | Self::Density => {
                let mut props = config.material.properties()?;
                if self == Self::YoungsModulus {
                    props.youngs_modulus = value;
                } else {
                    props.density = value;
                }
                out.material = props.into();
            }
            Self::Pressure => out.environment.pressure = value,
            Self::Temperature => out.environment.temperature = value,
        }
        Ok(out)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which frequency the sensitivity is taken on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SensitivityTarget {
    /// Undamped natural frequency f₀; only stiffness and mass parameters apply.
    #[default]
    NaturalFrequency,
    /// Damped natural frequency; gap and gas state apply through the damping model.
    DampedFrequency,
}

impl SensitivityTarget {
    fn frequency_hz(
        self,
        config: &DeviceConfig,
        limits: &ManufacturingLimits,
    ) -> Result<Scalar, MemsError> {
        match self {
            Self::NaturalFrequency => {
                Ok(config.mechanics_with_limits(limits)?.natural_frequency_hz())
            }
            Self::DampedFrequency => {
                let system = config.system_with_limits(limits)?;
                system
                    .damped_natural_frequency()
                    .map(linear_frequency)
                    .ok_or_else(|| {
                        MemsError::validation(
                            "damping_ratio",
                            system.damping_ratio(),
                            "overdamped: no damped natural frequency",
                        )
                    })
            }
        }
    }

    const fn includes(self, parameter: Parameter) -> bool {
        match self {
            Self::NaturalFrequency => parameter.affects_stiffness_or_mass(),
            Self::DampedFrequency => true,
        }
    }
}

/// Frequency shifts for every applicable parameter of a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityReport {
    /// ± tolerance applied, in percent.
    pub tolerance_percent: Scalar,
    /// Frequency the shifts refer to.
    pub target: SensitivityTarget,
    /// One entry per perturbed parameter, in [`Parameter::ALL`] order.
    pub entries: Vec<FrequencyShift>,
}

impl SensitivityReport {
    /// Looks up the shift for `parameter`.
    #[must_use]
    pub fn get(&self, parameter: Parameter) -> Option<&FrequencyShift> {
        self.entries.iter().find(|e| e.parameter == parameter.name())
    }

    /// Entry with the largest worst-case shift.
    #[must_use]
    pub fn dominant(&self) -> Option<&FrequencyShift> {
        self.entries
            .iter()
            .max_by(|a, b| a.worst_case_percent().total_cmp(&b.worst_case_percent()))
    }
}

/// Runs [`sensitivity`] for each applicable [`Parameter`] of `config`.
///
/// `config` itself is checked against the default manufacturing limits; the
/// perturbed copies are resolved under [`ManufacturingLimits::positive_only`].
pub fn device_sensitivity(
    config: &DeviceConfig,
    tolerance_percent: Scalar,
    target: SensitivityTarget,
) -> Result<SensitivityReport, MemsError> {
    check_tolerance(tolerance_percent)?;
    config.geometry.validate()?;
    let limits = ManufacturingLimits::positive_only();
    let entries = Parameter::ALL
        .into_iter()
        .filter(|p| target.includes(*p))
        .filter_map(|p| p.value(config).map(|v| (p, v)))
        .map(|(p, base)| {
            sensitivity(p.name(), base, tolerance_percent, |v| {
                target.frequency_hz(&p.with_value(config, v)?, &limits)
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SensitivityReport {
        tolerance_percent,
        target,
        entries,
    })
}
