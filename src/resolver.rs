//! Parameter resolution: geometry + material → lumped mass, stiffness and natural frequency.

use serde::{Deserialize, Serialize};

use crate::constants::{linear_frequency, STANDARD_GRAVITY};
use crate::errors::{check_derived, MemsError};
use crate::geometry::{DeviceGeometry, ManufacturingLimits};
use crate::materials::MaterialProperties;
use crate::math::Scalar;

/// Lumped single-degree-of-freedom mechanical model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MechanicalModel {
    /// Effective modal mass in kg.
    pub mass: Scalar,
    /// Suspension stiffness in N/m.
    pub stiffness: Scalar,
    /// Undamped natural angular frequency ω_n in rad/s.
    pub natural_frequency: Scalar,
}

impl MechanicalModel {
    /// Builds a model directly from mass and stiffness.
    pub fn from_lumped(mass: Scalar, stiffness: Scalar) -> Result<Self, MemsError> {
        check_derived("mass", mass)?;
        check_derived("stiffness", stiffness)?;
        let natural_frequency = check_derived("natural_frequency", (stiffness / mass).sqrt())?;
        Ok(Self {
            mass,
            stiffness,
            natural_frequency,
        })
    }

    /// Natural frequency f₀ in Hz.
    #[must_use]
    pub fn natural_frequency_hz(&self) -> Scalar {
        linear_frequency(self.natural_frequency)
    }

    /// Quasi-static displacement under a constant acceleration `acceleration` (m/s²).
    #[must_use]
    pub fn static_displacement(&self, acceleration: Scalar) -> Scalar {
        self.mass * acceleration / self.stiffness
    }

    /// Quasi-static displacement per 1 g, in m/g.
    #[must_use]
    pub fn static_displacement_per_g(&self) -> Scalar {
        self.static_displacement(STANDARD_GRAVITY)
    }
}

/// In-plane stiffness of one cantilever segment, `E·t·w³ / (4·L³)`.
#[must_use]
pub fn cantilever_stiffness(geometry: &DeviceGeometry, material: &MaterialProperties) -> Scalar {
    material.youngs_modulus * geometry.beam_thickness * geometry.beam_width.powi(3)
        / (4.0 * geometry.beam_length.powi(3))
}

/// Resolves `geometry` and `material` into a [`MechanicalModel`] under default limits.
pub fn resolve(
    geometry: &DeviceGeometry,
    material: &MaterialProperties,
) -> Result<MechanicalModel, MemsError> {
    resolve_with_limits(geometry, material, &ManufacturingLimits::default())
}

/// Resolves with explicit manufacturability limits.
///
/// Mass is the proof-mass plate plus the modal fraction of every beam segment;
/// stiffness is the topology multiplier applied to the cantilever base stiffness
/// for each parallel flexure unit.
pub fn resolve_with_limits(
    geometry: &DeviceGeometry,
    material: &MaterialProperties,
    limits: &ManufacturingLimits,
) -> Result<MechanicalModel, MemsError> {
    geometry.validate_with(limits)?;
    material.validate()?;

    let units = Scalar::from(geometry.units);
    let topology = &geometry.topology;
    let stiffness =
        units * topology.stiffness_multiplier() * cantilever_stiffness(geometry, material);

    let beam_mass = units
        * topology.segments()
        * topology.effective_mass_fraction()
        * material.density
        * geometry.beam_segment_volume();
    let plate_mass = geometry
        .proof_mass
        .map_or(0.0, |pm| material.density * pm.volume());

    MechanicalModel::from_lumped(plate_mass + beam_mass, stiffness)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::geometry::SpringTopology;

    fn spring() -> DeviceGeometry {
        DeviceGeometry::new(4.0e-6, 200.0e-6, 2.0e-6, 2.0e-6).with_proof_mass(
            100.0e-6,
            100.0e-6,
            2.0e-6,
        )
    }

    #[test]
    fn folded_spring_lands_in_kilohertz_range() {
        let model = resolve(&spring(), &MaterialProperties::silicon()).expect("resolves");
        // 4 units × 2 × E t w³ / (4 L³) = 2 E t w³ / L³
        assert_relative_eq!(model.stiffness, 5.408, max_relative = 1.0e-9);
        assert!(model.stiffness > 1.0 && model.stiffness < 100.0);
        assert!(model.mass > 1.0e-12 && model.mass < 1.0e-10, "mass {}", model.mass);
        let f0 = model.natural_frequency_hz();
        assert!(f0 > 1.0e3 && f0 < 1.0e6, "f0 = {f0}");
    }

    #[test]
    fn topology_changes_stiffness_by_table_multiplier() {
        let si = MaterialProperties::silicon();
        let folded = resolve(&spring(), &si).expect("folded");
        let guided = resolve(
            &spring().with_suspension(SpringTopology::FixedGuided, 4),
            &si,
        )
        .expect("guided");
        assert_relative_eq!(guided.stiffness / folded.stiffness, 2.0, max_relative = 1.0e-12);
    }

    #[test]
    fn bare_beam_uses_modal_mass_only() {
        let beam = DeviceGeometry::new(4.0e-6, 200.0e-6, 2.0e-6, 2.0e-6)
            .with_suspension(SpringTopology::Cantilever, 1);
        let si = MaterialProperties::silicon();
        let model = resolve(&beam, &si).expect("resolves");
        let expected = 33.0 / 140.0 * si.density * beam.beam_segment_volume();
        assert_relative_eq!(model.mass, expected, max_relative = 1.0e-12);
    }

    #[test]
    fn invalid_geometry_never_reaches_derivation() {
        let mut g = spring();
        g.gap = -1.0e-6;
        let err = resolve(&g, &MaterialProperties::silicon()).unwrap_err();
        assert!(matches!(err, MemsError::Input { parameter: "gap", .. }));
    }

    #[test]
    fn static_displacement_per_g_matches_hookes_law() {
        let model = MechanicalModel::from_lumped(1.0e-9, 1.0).expect("lumped");
        assert_relative_eq!(
            model.static_displacement_per_g(),
            1.0e-9 * STANDARD_GRAVITY,
            max_relative = 1.0e-12
        );
    }

    #[test]
    fn resolution_is_idempotent() {
        let si = MaterialProperties::silicon();
        let a = resolve(&spring(), &si).expect("first");
        let b = resolve(&spring(), &si).expect("second");
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn stiffness_decreases_with_length(
            width in 2.0e-6..20.0e-6_f64,
            length in 50.0e-6..1.0e-3_f64,
            stretch in 1.01..2.0_f64,
        ) {
            let si = MaterialProperties::silicon();
            let short = DeviceGeometry::new(width, length, 2.0e-6, 2.0e-6);
            let long = DeviceGeometry::new(width, length * stretch, 2.0e-6, 2.0e-6);
            let k_short = resolve(&short, &si).expect("short").stiffness;
            let k_long = resolve(&long, &si).expect("long").stiffness;
            prop_assert!(k_long < k_short);
        }

        #[test]
        fn stiffness_increases_with_width(
            width in 2.0e-6..20.0e-6_f64,
            length in 50.0e-6..1.0e-3_f64,
            widen in 1.01..2.0_f64,
        ) {
            let si = MaterialProperties::silicon();
            let narrow = DeviceGeometry::new(width, length, 2.0e-6, 2.0e-6);
            let wide = DeviceGeometry::new(width * widen, length, 2.0e-6, 2.0e-6);
            let k_narrow = resolve(&narrow, &si).expect("narrow").stiffness;
            let k_wide = resolve(&wide, &si).expect("wide").stiffness;
            prop_assert!(k_wide > k_narrow);
        }
    }
}
