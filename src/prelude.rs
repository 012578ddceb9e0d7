//! Convenience re-exports for building MEMS resonator studies.

pub use crate::constants::*;
pub use crate::damping::{
    quality_factor, ConstantQ, ConstantZeta, Damping, DampingContext, DampingModel, SlideFilm,
    SqueezeFilm,
};
pub use crate::dynamics::{half_sine_pulse, FrequencyResponse, SecondOrderSystem, TimeResponse};
pub use crate::environment::EnvironmentState;
pub use crate::errors::MemsError;
pub use crate::explorer::{
    quality_factor_vs_pressure, sweep, DesignRow, DesignTable, Metric, ParameterGrid,
    PressurePoint,
};
pub use crate::geometry::{DeviceGeometry, ManufacturingLimits, ProofMass, SpringTopology};
pub use crate::materials::{Material, MaterialProperties, MaterialSpec};
pub use crate::math::{bisect, ConvergenceCriteria, Scalar};
pub use crate::noise::{noise_budget, BrownianNoise, NoiseBudget};
pub use crate::nonlinear::{
    backbone_curve, backbone_with_alpha, cubic_stiffness, equilibrium_displacement,
    pull_in_voltage, BackboneCurve, NonlinearityKind, PullInSolver,
};
pub use crate::release::{
    critical_length, residual_curl, stiction, ReleaseConditions, ResidualCurl, StictionReport,
};
pub use crate::resolver::{resolve, resolve_with_limits, MechanicalModel};
pub use crate::sensitivity::{
    device_sensitivity, sensitivity, FrequencyShift, Parameter, SensitivityReport,
    SensitivityTarget,
};
pub use crate::simulation::{evaluate, DampingKind, DeviceConfig, Evaluation};
pub use crate::sweep::{angular_logspace, linspace, logspace, resonance_window};
pub use crate::transduction::{
    capacitive_readout, differential_capacitance, parallel_plate_capacitance, CapacitiveReadout,
    CombDrive,
};
