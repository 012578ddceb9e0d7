//! Single-point evaluation: request configuration in, full design record out.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::damping::{quality_factor, Damping, DampingContext, DampingModel};
use crate::dynamics::SecondOrderSystem;
use crate::environment::EnvironmentState;
use crate::errors::{require_non_negative, require_positive, MemsError};
use crate::geometry::{DeviceGeometry, ManufacturingLimits};
use crate::materials::MaterialSpec;
use crate::math::Scalar;
use crate::noise::{noise_budget, BrownianNoise, NoiseBudget};
use crate::nonlinear::{cubic_stiffness, equilibrium_displacement, pull_in_voltage};
use crate::resolver::{resolve, resolve_with_limits, MechanicalModel};
use crate::sensitivity::{
    device_sensitivity, SensitivityReport, SensitivityTarget, DEFAULT_TOLERANCE_PERCENT,
};
use crate::transduction::{capacitive_readout, CapacitiveReadout};

/// Damping model selector as it appears in a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DampingKind {
    /// Squeeze-film gas damping.
    #[default]
    Squeeze,
    /// Slide-film gas damping.
    Slide,
    /// Fixed quality factor, taken from `Q`.
    ConstantQ,
    /// Fixed damping ratio, taken from `zeta`.
    ConstantZeta,
}

fn default_tolerance() -> Scalar {
    DEFAULT_TOLERANCE_PERCENT
}

/// One evaluation request. SI units throughout.
///
/// ```text
/// {
///   "geometry": {"w": 4e-6, "L": 2e-4, "t": 2e-6, "h": 2e-6},
///   "material": "silicon",
///   "environment": {"P": 101325, "T": 300},
///   "dampingModel": "constantQ",
///   "Q": 50
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConfig {
    /// Device geometry.
    pub geometry: DeviceGeometry,
    /// Material name or explicit properties; silicon when omitted.
    #[serde(default)]
    pub material: MaterialSpec,
    /// Gas state; one atmosphere at 300 K when omitted.
    #[serde(default)]
    pub environment: EnvironmentState,
    /// Damping model selector.
    #[serde(default)]
    pub damping_model: DampingKind,
    /// Quality factor for [`DampingKind::ConstantQ`].
    #[serde(default, rename = "Q", skip_serializing_if = "Option::is_none")]
    pub quality_factor: Option<Scalar>,
    /// Damping ratio for [`DampingKind::ConstantZeta`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zeta: Option<Scalar>,
    /// Readout displacement noise density in m/√Hz; zero when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electronic_noise_density: Option<Scalar>,
    /// Measurement bandwidth in Hz; the −3 dB sensor cutoff when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<Scalar>,
    /// DC bias between plate and electrode, in volts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bias_voltage: Option<Scalar>,
    /// ± fabrication tolerance for the sensitivity report, in percent.
    #[serde(default = "default_tolerance")]
    pub tolerance_percent: Scalar,
}

impl DeviceConfig {
    /// Silicon device at one atmosphere and 300 K with squeeze-film damping.
    #[must_use]
    pub fn new(geometry: DeviceGeometry) -> Self {
        Self {
            geometry,
            material: MaterialSpec::default(),
            environment: EnvironmentState::default(),
            damping_model: DampingKind::default(),
            quality_factor: None,
            zeta: None,
            electronic_noise_density: None,
            bandwidth: None,
            bias_voltage: None,
            tolerance_percent: DEFAULT_TOLERANCE_PERCENT,
        }
    }

    /// Parses and validates a JSON request.
    pub fn from_json(json: &str) -> Result<Self, MemsError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the request back to JSON.
    pub fn to_json(&self) -> Result<String, MemsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks every field without deriving anything.
    pub fn validate(&self) -> Result<(), MemsError> {
        self.geometry.validate()?;
        self.material.properties()?;
        self.environment.validate()?;
        self.damping_model()?;
        if let Some(e_n) = self.electronic_noise_density {
            require_non_negative("electronic_noise_density", e_n)?;
        }
        if let Some(bw) = self.bandwidth {
            require_positive("bandwidth", bw)?;
        }
        if let Some(v) = self.bias_voltage {
            if !v.is_finite() {
                return Err(MemsError::input("bias_voltage", v, "must be finite"));
            }
        }
        if !(self.tolerance_percent > 0.0 && self.tolerance_percent < 100.0) {
            return Err(MemsError::input(
                "tolerance_percent",
                self.tolerance_percent,
                "must lie in (0, 100)",
            ));
        }
        Ok(())
    }

    /// Builds the damping model named by `dampingModel`.
    pub fn damping_model(&self) -> Result<DampingModel, MemsError> {
        match self.damping_model {
            DampingKind::Squeeze => Ok(DampingModel::squeeze_film()),
            DampingKind::Slide => Ok(DampingModel::slide_film()),
            DampingKind::ConstantQ => self
                .quality_factor
                .map(DampingModel::constant_q)
                .ok_or_else(|| MemsError::Config("dampingModel `constantQ` requires `Q`".into())),
            DampingKind::ConstantZeta => self
                .zeta
                .map(DampingModel::constant_zeta)
                .ok_or_else(|| {
                    MemsError::Config("dampingModel `constantZeta` requires `zeta`".into())
                }),
        }
    }

    /// Resolves mass, stiffness and natural frequency.
    pub fn mechanics(&self) -> Result<MechanicalModel, MemsError> {
        self.mechanics_with_limits(&ManufacturingLimits::default())
    }

    /// Resolves mechanics with explicit manufacturability limits.
    pub fn mechanics_with_limits(
        &self,
        limits: &ManufacturingLimits,
    ) -> Result<MechanicalModel, MemsError> {
        resolve_with_limits(&self.geometry, &self.material.properties()?, limits)
    }

    /// Damping coefficient for already-resolved mechanics.
    pub fn damping_coefficient(&self, mechanics: &MechanicalModel) -> Result<Scalar, MemsError> {
        self.damping_model()?.coefficient(&DampingContext {
            geometry: &self.geometry,
            environment: &self.environment,
            mechanics,
        })
    }

    /// Resolves the full second-order system.
    pub fn system(&self) -> Result<SecondOrderSystem, MemsError> {
        self.system_with_limits(&ManufacturingLimits::default())
    }

    /// Resolves the second-order system with explicit manufacturability limits.
    pub fn system_with_limits(
        &self,
        limits: &ManufacturingLimits,
    ) -> Result<SecondOrderSystem, MemsError> {
        let mechanics = self.mechanics_with_limits(limits)?;
        let b = self.damping_coefficient(&mechanics)?;
        SecondOrderSystem::from_model(&mechanics, b)
    }
}

/// Everything derived for one device.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    /// Mass, stiffness and ω_n.
    pub mechanics: MechanicalModel,
    /// f₀ in Hz.
    pub natural_frequency_hz: Scalar,
    /// Damping model identifier.
    pub damping_model: &'static str,
    /// b in N·s/m.
    pub damping_coefficient: Scalar,
    /// ζ.
    pub damping_ratio: Scalar,
    /// Q.
    pub quality_factor: Scalar,
    /// Resonator bandwidth f₀/Q in Hz.
    pub bandwidth_hz: Scalar,
    /// −3 dB sensor bandwidth in Hz.
    pub cutoff_frequency_hz: Scalar,
    /// Quasi-static deflection per g, in m.
    pub static_displacement_per_g: Scalar,
    /// Mid-plane stretching cubic stiffness in N/m³.
    pub cubic_stiffness: Scalar,
    /// Displacement noise budget.
    pub noise: NoiseBudget,
    /// Damping-induced Brownian noise.
    pub brownian: BrownianNoise,
    /// Parallel-plate pull-in voltage in V.
    pub pull_in_voltage: Scalar,
    /// Static deflection at the requested bias, in m.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equilibrium_displacement: Option<Scalar>,
    /// Differential-pair capacitive readout.
    pub readout: CapacitiveReadout,
    /// f₀ shifts under ± fabrication tolerance.
    pub sensitivity: SensitivityReport,
}

impl Evaluation {
    /// Serializes the record as pretty JSON.
    pub fn to_json(&self) -> Result<String, MemsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Runs the full pipeline for one request: resolve, damp, analyse dynamics,
/// noise, pull-in and tolerance sensitivity.
pub fn evaluate(config: &DeviceConfig) -> Result<Evaluation, MemsError> {
    config.validate()?;
    let material = config.material.properties()?;
    let mechanics = resolve(&config.geometry, &material)?;
    let damping = config.damping_model()?;
    let b = config.damping_coefficient(&mechanics)?;
    let system = SecondOrderSystem::from_model(&mechanics, b)?;

    let cutoff = system.cutoff_frequency_hz();
    let noise = noise_budget(
        mechanics.mass,
        mechanics.stiffness,
        config.environment.temperature,
        config.electronic_noise_density.unwrap_or(0.0),
        config.bandwidth.unwrap_or(cutoff),
    )?;
    let brownian = BrownianNoise::new(mechanics.mass, b, config.environment.temperature)?;

    let v_pi = pull_in_voltage(
        mechanics.stiffness,
        config.geometry.gap,
        config.geometry.electrode_area(),
    )?;
    let equilibrium = config
        .bias_voltage
        .map(|v| equilibrium_displacement(v, &config.geometry, mechanics.stiffness))
        .transpose()?;

    let readout = capacitive_readout(&config.geometry, &mechanics)?;

    let sensitivity = device_sensitivity(
        config,
        config.tolerance_percent,
        SensitivityTarget::NaturalFrequency,
    )?;

    debug!(
        f0_hz = mechanics.natural_frequency_hz(),
        damping = b,
        model = damping.name(),
        "device evaluated"
    );

    Ok(Evaluation {
        mechanics,
        natural_frequency_hz: mechanics.natural_frequency_hz(),
        damping_model: damping.name(),
        damping_coefficient: b,
        damping_ratio: system.damping_ratio(),
        quality_factor: quality_factor(&mechanics, b),
        bandwidth_hz: system.bandwidth_hz(),
        cutoff_frequency_hz: cutoff,
        static_displacement_per_g: mechanics.static_displacement_per_g(),
        cubic_stiffness: cubic_stiffness(&config.geometry, &material),
        noise,
        brownian,
        pull_in_voltage: v_pi,
        equilibrium_displacement: equilibrium,
        readout,
        sensitivity,
    })
}
