//! Gas and idealized damping models producing a viscous coefficient b (N·s/m).
//!
//! # Models
//!
//! - **Squeeze film**: gas pumped out of the gap by plate motion normal to the
//!   substrate, rectangular-plate solution with slip-flow rarefaction.
//! - **Slide film**: Couette shear flow under a plate moving parallel to the
//!   substrate.
//! - **Constant Q / constant ζ**: idealized loss for vacuum-packaged analysis.
//!
//! # References
//!
//! - Starr, J. B. (1990). "Squeeze-film damping in solid-state accelerometers".
//!   IEEE Solid-State Sensor and Actuator Workshop, 44-47.
//! - Bao, M., Yang, H. (2007). "Squeeze film air damping in MEMS".
//!   Sensors and Actuators A 136, 3-27.

use serde::{Deserialize, Serialize};

use crate::environment::EnvironmentState;
use crate::errors::{check_derived, require_non_negative, require_positive, MemsError};
use crate::geometry::DeviceGeometry;
use crate::math::Scalar;
use crate::resolver::MechanicalModel;

/// Everything a damping model may need to evaluate its coefficient.
#[derive(Debug, Clone, Copy)]
pub struct DampingContext<'a> {
    /// Device geometry (plate planform and gap).
    pub geometry: &'a DeviceGeometry,
    /// Gas state.
    pub environment: &'a EnvironmentState,
    /// Resolved mechanics (mass, stiffness, ω_n).
    pub mechanics: &'a MechanicalModel,
}

/// Trait implemented by every damping model.
pub trait Damping {
    /// Viscous damping coefficient b in N·s/m.
    fn coefficient(&self, ctx: &DampingContext<'_>) -> Result<Scalar, MemsError>;

    /// Short identifier (e.g. `squeeze`).
    fn name(&self) -> &'static str;
}

/// Squeeze-film damping of a rectangular plate moving normal to the substrate.
///
/// `b = Q_eff · μ · L · W³ · β(W/L) / h³`, with `W ≤ L` the plate sides,
/// `β(χ) = 1 − 0.6·χ` and `Q_eff = 1 / (1 + 2·Kn)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SqueezeFilm;

impl SqueezeFilm {
    /// Aspect-ratio correction β for a plate with short/long side ratio `chi`.
    #[must_use]
    pub fn aspect_correction(chi: Scalar) -> Scalar {
        1.0 - 0.6 * chi
    }
}

impl Damping for SqueezeFilm {
    fn coefficient(&self, ctx: &DampingContext<'_>) -> Result<Scalar, MemsError> {
        ctx.environment.validate()?;
        let h = ctx.geometry.gap;
        let (long, short) = ctx.geometry.plate_planform();
        let beta = Self::aspect_correction(short / long);
        let mu = ctx.environment.viscosity();
        let q_eff = ctx.environment.rarefaction_factor(h);
        let b = q_eff * mu * long * short.powi(3) * beta / h.powi(3);
        check_derived("squeeze_film_damping", b)
    }

    fn name(&self) -> &'static str {
        "squeeze"
    }
}

/// Slide-film (Couette) damping of a plate moving parallel to the substrate.
///
/// `b = Q_eff · μ · A / h`; no cubic gap dependence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideFilm;

impl Damping for SlideFilm {
    fn coefficient(&self, ctx: &DampingContext<'_>) -> Result<Scalar, MemsError> {
        ctx.environment.validate()?;
        let h = ctx.geometry.gap;
        let area = ctx.geometry.electrode_area();
        let mu = ctx.environment.viscosity();
        let q_eff = ctx.environment.rarefaction_factor(h);
        check_derived("slide_film_damping", q_eff * mu * area / h)
    }

    fn name(&self) -> &'static str {
        "slide"
    }
}

/// Fixed quality factor: `b = k / (Q·ω_n)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantQ {
    /// Target quality factor.
    pub quality_factor: Scalar,
}

impl Damping for ConstantQ {
    fn coefficient(&self, ctx: &DampingContext<'_>) -> Result<Scalar, MemsError> {
        let q = require_positive("quality_factor", self.quality_factor)?;
        let m = ctx.mechanics;
        check_derived("constant_q_damping", m.stiffness / (q * m.natural_frequency))
    }

    fn name(&self) -> &'static str {
        "constantQ"
    }
}

/// Fixed damping ratio: `b = 2·ζ·√(m·k)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantZeta {
    /// Target damping ratio ζ.
    pub damping_ratio: Scalar,
}

impl Damping for ConstantZeta {
    fn coefficient(&self, ctx: &DampingContext<'_>) -> Result<Scalar, MemsError> {
        let zeta = require_non_negative("damping_ratio", self.damping_ratio)?;
        let m = ctx.mechanics;
        check_derived(
            "constant_zeta_damping",
            2.0 * zeta * (m.mass * m.stiffness).sqrt(),
        )
    }

    fn name(&self) -> &'static str {
        "constantZeta"
    }
}

/// Closed set of damping models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DampingModel {
    /// See [`SqueezeFilm`].
    SqueezeFilm(SqueezeFilm),
    /// See [`SlideFilm`].
    SlideFilm(SlideFilm),
    /// See [`ConstantQ`].
    ConstantQ(ConstantQ),
    /// See [`ConstantZeta`].
    ConstantZeta(ConstantZeta),
}

impl DampingModel {
    /// Squeeze-film model.
    #[must_use]
    pub const fn squeeze_film() -> Self {
        Self::SqueezeFilm(SqueezeFilm)
    }

    /// Slide-film model.
    #[must_use]
    pub const fn slide_film() -> Self {
        Self::SlideFilm(SlideFilm)
    }

    /// Constant-Q model.
    #[must_use]
    pub const fn constant_q(quality_factor: Scalar) -> Self {
        Self::ConstantQ(ConstantQ { quality_factor })
    }

    /// Constant damping-ratio model.
    #[must_use]
    pub const fn constant_zeta(damping_ratio: Scalar) -> Self {
        Self::ConstantZeta(ConstantZeta { damping_ratio })
    }

    fn as_dyn(&self) -> &dyn Damping {
        match self {
            Self::SqueezeFilm(m) => m,
            Self::SlideFilm(m) => m,
            Self::ConstantQ(m) => m,
            Self::ConstantZeta(m) => m,
        }
    }
}

impl Damping for DampingModel {
    fn coefficient(&self, ctx: &DampingContext<'_>) -> Result<Scalar, MemsError> {
        self.as_dyn().coefficient(ctx)
    }

    fn name(&self) -> &'static str {
        self.as_dyn().name()
    }
}

/// Quality factor `Q = m·ω_n / b`; infinite for an undamped system.
#[must_use]
pub fn quality_factor(mechanics: &MechanicalModel, damping: Scalar) -> Scalar {
    mechanics.mass * mechanics.natural_frequency / damping
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::constants::{ATMOSPHERIC_PRESSURE, REFERENCE_TEMPERATURE};
    use crate::materials::MaterialProperties;
    use crate::resolver::resolve;
    use crate::sweep::logspace;

    fn plate() -> DeviceGeometry {
        DeviceGeometry::new(4.0e-6, 200.0e-6, 2.0e-6, 2.0e-6).with_proof_mass(
            200.0e-6,
            50.0e-6,
            2.0e-6,
        )
    }

    fn coefficient_at(
        model: DampingModel,
        geometry: &DeviceGeometry,
        env: &EnvironmentState,
    ) -> Scalar {
        let mech = resolve(geometry, &MaterialProperties::silicon()).expect("resolves");
        model
            .coefficient(&DampingContext {
                geometry,
                environment: env,
                mechanics: &mech,
            })
            .expect("coefficient")
    }

    #[test]
    fn squeeze_film_at_one_atmosphere_matches_closed_form() {
        let env = EnvironmentState::atmospheric(REFERENCE_TEMPERATURE);
        let b = coefficient_at(DampingModel::squeeze_film(), &plate(), &env);
        let q_eff = 1.0 / (1.0 + 2.0 * 0.034);
        let expected = q_eff * 1.81e-5 * 200.0e-6 * (50.0e-6_f64).powi(3) * (1.0 - 0.6 * 0.25)
            / (2.0e-6_f64).powi(3);
        assert_relative_eq!(b, expected, max_relative = 1.0e-9);
        assert!(b > 1.0e-6 && b < 1.0e-4, "b = {b}");
    }

    #[test]
    fn slide_film_is_far_weaker_than_squeeze_film() {
        let env = EnvironmentState::atmospheric(REFERENCE_TEMPERATURE);
        let squeeze = coefficient_at(DampingModel::squeeze_film(), &plate(), &env);
        let slide = coefficient_at(DampingModel::slide_film(), &plate(), &env);
        assert!(slide < squeeze / 100.0);
        let expected = 1.81e-5 * 200.0e-6 * 50.0e-6 / 2.0e-6 / (1.0 + 2.0 * 0.034);
        assert_relative_eq!(slide, expected, max_relative = 1.0e-9);
    }

    #[test]
    fn vacuum_gives_zero_gas_damping() {
        let env = EnvironmentState::new(0.0, 300.0);
        assert_eq!(coefficient_at(DampingModel::squeeze_film(), &plate(), &env), 0.0);
        assert_eq!(coefficient_at(DampingModel::slide_film(), &plate(), &env), 0.0);
    }

    #[test]
    fn constant_q_round_trips_through_quality_factor() {
        let geometry = plate();
        let mech = resolve(&geometry, &MaterialProperties::silicon()).expect("resolves");
        let env = EnvironmentState::default();
        let ctx = DampingContext {
            geometry: &geometry,
            environment: &env,
            mechanics: &mech,
        };
        let b_known = 3.7e-8;
        let q = quality_factor(&mech, b_known);
        let b = DampingModel::constant_q(q).coefficient(&ctx).expect("b");
        assert_relative_eq!(b, b_known, max_relative = 1.0e-12);
    }

    #[test]
    fn constant_zeta_matches_critical_damping_fraction() {
        let geometry = plate();
        let mech = resolve(&geometry, &MaterialProperties::silicon()).expect("resolves");
        let env = EnvironmentState::default();
        let ctx = DampingContext {
            geometry: &geometry,
            environment: &env,
            mechanics: &mech,
        };
        let b = DampingModel::constant_zeta(0.005).coefficient(&ctx).expect("b");
        assert_relative_eq!(quality_factor(&mech, b), 100.0, max_relative = 1.0e-9);
    }

    #[test]
    fn non_positive_q_is_rejected() {
        let geometry = plate();
        let mech = resolve(&geometry, &MaterialProperties::silicon()).expect("resolves");
        let env = EnvironmentState::default();
        let ctx = DampingContext {
            geometry: &geometry,
            environment: &env,
            mechanics: &mech,
        };
        assert!(DampingModel::constant_q(0.0).coefficient(&ctx).is_err());
    }

    #[test]
    fn quality_factor_falls_monotonically_from_1pa_to_100kpa() {
        let geometry = plate();
        let mech = resolve(&geometry, &MaterialProperties::silicon()).expect("resolves");
        let pressures = logspace(1.0, 1.0e5, 60).expect("grid");
        let qs: Vec<Scalar> = pressures
            .iter()
            .map(|&p| {
                let env = EnvironmentState::new(p, 300.0);
                quality_factor(&mech, coefficient_at(DampingModel::squeeze_film(), &geometry, &env))
            })
            .collect();
        assert!(qs.iter().all(|q| q.is_finite() && *q > 0.0));
        assert!(qs.windows(2).all(|w| w[1] <= w[0]), "Q not monotone: {qs:?}");
    }

    proptest! {
        #[test]
        fn squeeze_q_never_rises_with_pressure(
            p1 in 1.0..ATMOSPHERIC_PRESSURE,
            ratio in 1.0..100.0_f64,
        ) {
            let geometry = plate();
            let mech = resolve(&geometry, &MaterialProperties::silicon()).expect("resolves");
            let low = EnvironmentState::new(p1, 300.0);
            let high = EnvironmentState::new(p1 * ratio, 300.0);
            let squeeze = DampingModel::squeeze_film();
            let q_low = quality_factor(&mech, coefficient_at(squeeze, &geometry, &low));
            let q_high = quality_factor(&mech, coefficient_at(squeeze, &geometry, &high));
            prop_assert!(q_low >= q_high);
        }
    }
}
