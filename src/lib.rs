#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(clippy::all, clippy::cargo, clippy::nursery, missing_docs)]
#![doc = include_str!("../README.md")]

/// Physical constants and reference gas properties.
pub mod constants;
/// Shared numerical utilities (scalar aliases, state vectors, bisection).
pub mod math;
/// Error types shared by every layer.
pub mod errors;
/// Structural material properties and the built-in material table.
pub mod materials;
/// Device geometry, spring topologies and manufacturability limits.
pub mod geometry;
/// Ambient gas state and rarefaction.
pub mod environment;
/// Geometry + material → lumped mass, stiffness and natural frequency.
pub mod resolver;
/// Squeeze-film, slide-film and idealized damping models.
pub mod damping;
/// Linear second-order frequency, step and forced responses.
pub mod dynamics;
/// Duffing backbone and electrostatic pull-in.
pub mod nonlinear;
/// Comb-drive actuation and capacitive readout.
pub mod transduction;
/// Thermomechanical and readout noise budgets.
pub mod noise;
/// Fabrication-tolerance sensitivity of the resonant frequency.
pub mod sensitivity;
/// Frequency and parameter grid builders.
pub mod sweep;
/// Request configuration and single-point evaluation.
pub mod simulation;
/// Design-space sweeps and CSV tables.
pub mod explorer;
/// Stiction and residual-stress checks for the release step.
pub mod release;

/// Common exports for downstream crates.
pub mod prelude;
