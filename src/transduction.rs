//! Electrostatic transduction: comb-drive actuation and capacitive readout.
//!
//! A comb drive with `n` movable fingers has `2n` sidewall gaps. Its
//! capacitance grows linearly with finger overlap, so the drive force
//! `½·V²·dC/dx` does not depend on position. Sidewall fringing enters as the
//! factor `1 + g/(π·t)`.
//!
//! A parallel-plate differential pair reads displacement out as
//!
//! ```text
//! ΔC(x) = ε₀·A·(1/(g − x) − 1/(g + x)) ≈ (2·ε₀·A/g²)·x
//! ```

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::constants::VACUUM_PERMITTIVITY;
use crate::errors::{check_derived, require_positive, MemsError};
use crate::geometry::DeviceGeometry;
use crate::math::Scalar;
use crate::resolver::MechanicalModel;

/// Lateral comb-drive actuator. Lengths in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombDrive {
    /// Number of movable fingers.
    pub fingers: u32,
    /// Finger thickness (structural layer) in m.
    pub finger_thickness: Scalar,
    /// Sidewall gap between interdigitated fingers in m.
    pub gap: Scalar,
    /// Rest overlap of movable and fixed fingers in m.
    pub overlap: Scalar,
}

impl CombDrive {
    /// Builds a comb drive.
    #[must_use]
    pub const fn new(fingers: u32, finger_thickness: Scalar, gap: Scalar, overlap: Scalar) -> Self {
        Self {
            fingers,
            finger_thickness,
            gap,
            overlap,
        }
    }

    /// Checks finger count and dimensions.
    pub fn validate(&self) -> Result<(), MemsError> {
        if self.fingers == 0 {
            return Err(MemsError::input("fingers", 0.0, "must be >= 1"));
        }
        require_positive("finger_thickness", self.finger_thickness)?;
        require_positive("comb_gap", self.gap)?;
        require_positive("overlap", self.overlap)?;
        Ok(())
    }

    /// Sidewall fringing correction `1 + g/(π·t)`.
    #[must_use]
    pub fn fringing_factor(&self) -> Scalar {
        1.0 + self.gap / (PI * self.finger_thickness)
    }

    /// `dC/dx = 2·n·ε₀·t/g`, fringing included, in F/m.
    #[must_use]
    pub fn capacitance_gradient(&self) -> Scalar {
        2.0 * Scalar::from(self.fingers) * VACUUM_PERMITTIVITY * self.finger_thickness / self.gap
            * self.fringing_factor()
    }

    /// Capacitance with the fingers moved `displacement` further into
    /// engagement, in F. Zero once the fingers disengage.
    #[must_use]
    pub fn capacitance(&self, displacement: Scalar) -> Scalar {
        let overlap = self.overlap + displacement;
        if overlap <= 0.0 {
            return 0.0;
        }
        self.capacitance_gradient() * overlap
    }

    /// Drive force `½·V²·dC/dx` in N, pulling the fingers into engagement.
    #[must_use]
    pub fn force(&self, voltage: Scalar) -> Scalar {
        0.5 * voltage * voltage * self.capacitance_gradient()
    }

    /// Static displacement `F/k` of a suspension of stiffness `stiffness` driven at `voltage`.
    pub fn displacement(&self, voltage: Scalar, stiffness: Scalar) -> Result<Scalar, MemsError> {
        self.validate()?;
        require_positive("stiffness", stiffness)?;
        if !voltage.is_finite() {
            return Err(MemsError::input("drive_voltage", voltage, "must be finite"));
        }
        check_derived("comb_displacement", self.force(voltage) / stiffness)
    }

    /// Drive voltage that holds the suspension at `displacement`, in V.
    pub fn voltage_for_displacement(
        &self,
        displacement: Scalar,
        stiffness: Scalar,
    ) -> Result<Scalar, MemsError> {
        self.validate()?;
        require_positive("stiffness", stiffness)?;
        if !(displacement.is_finite() && displacement >= 0.0) {
            return Err(MemsError::input(
                "displacement",
                displacement,
                "comb drives only pull into engagement",
            ));
        }
        Ok((2.0 * stiffness * displacement / self.capacitance_gradient()).sqrt())
    }
}

/// Parallel-plate capacitance `ε₀·A/g` in F.
pub fn parallel_plate_capacitance(area: Scalar, gap: Scalar) -> Result<Scalar, MemsError> {
    require_positive("area", area)?;
    require_positive("gap", gap)?;
    Ok(VACUUM_PERMITTIVITY * area / gap)
}

/// Differential capacitance `C₁ − C₂` of a plate moved `displacement` toward
/// electrode 1 of a symmetric pair, in F.
pub fn differential_capacitance(
    area: Scalar,
    gap: Scalar,
    displacement: Scalar,
) -> Result<Scalar, MemsError> {
    require_positive("area", area)?;
    require_positive("gap", gap)?;
    if !(displacement.is_finite() && displacement.abs() < gap) {
        return Err(MemsError::input(
            "displacement",
            displacement,
            "plate must stay inside the gap",
        ));
    }
    let near = VACUUM_PERMITTIVITY * area / (gap - displacement);
    let far = VACUUM_PERMITTIVITY * area / (gap + displacement);
    Ok(near - far)
}

/// Small-signal capacitive readout of a device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacitiveReadout {
    /// Rest capacitance of each electrode, in F.
    pub rest_capacitance: Scalar,
    /// Differential slope `2·ε₀·A/g²`, in F/m.
    pub capacitance_gradient: Scalar,
    /// Differential capacitance change per 1 g of input, in F/g.
    pub capacitance_per_g: Scalar,
}

/// Differential-pair readout over the device's electrode area and gap.
pub fn capacitive_readout(
    geometry: &DeviceGeometry,
    mechanics: &MechanicalModel,
) -> Result<CapacitiveReadout, MemsError> {
    let area = geometry.electrode_area();
    let rest_capacitance = parallel_plate_capacitance(area, geometry.gap)?;
    let capacitance_gradient = 2.0 * rest_capacitance / geometry.gap;
    Ok(CapacitiveReadout {
        rest_capacitance,
        capacitance_gradient,
        capacitance_per_g: capacitance_gradient * mechanics.static_displacement_per_g(),
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::materials::MaterialProperties;
    use crate::resolver::resolve;

    fn comb() -> CombDrive {
        CombDrive::new(50, 20.0e-6, 2.0e-6, 10.0e-6)
    }

    #[test]
    fn rest_capacitance_counts_both_sidewalls() {
        let c = comb();
        let expected = 2.0 * 50.0 * VACUUM_PERMITTIVITY * 20.0e-6 * 10.0e-6 / 2.0e-6
            * (1.0 + 2.0e-6 / (PI * 20.0e-6));
        assert_relative_eq!(c.capacitance(0.0), expected, max_relative = 1.0e-12);
        assert!(c.fringing_factor() > 1.0);
    }

    #[test]
    fn capacitance_is_linear_in_engagement() {
        let c = comb();
        let dx = 1.0e-6;
        let slope = (c.capacitance(dx) - c.capacitance(0.0)) / dx;
        assert_relative_eq!(slope, c.capacitance_gradient(), max_relative = 1.0e-9);
        assert_relative_eq!(
            c.capacitance(c.overlap),
            2.0 * c.capacitance(0.0),
            max_relative = 1.0e-12
        );
    }

    #[test]
    fn disengaged_fingers_have_no_capacitance() {
        let c = comb();
        assert_eq!(c.capacitance(-c.overlap), 0.0);
        assert_eq!(c.capacitance(-2.0 * c.overlap), 0.0);
    }

    #[test]
    fn force_is_quadratic_and_sign_blind() {
        let c = comb();
        assert_relative_eq!(c.force(20.0), 4.0 * c.force(10.0), max_relative = 1.0e-12);
        assert_eq!(c.force(-10.0), c.force(10.0));
        assert_relative_eq!(
            c.force(10.0),
            50.0 * c.capacitance_gradient(),
            max_relative = 1.0e-12
        );
    }

    #[test]
    fn displacement_and_drive_voltage_invert() {
        let c = comb();
        let k = 2.0;
        let x = c.displacement(30.0, k).expect("displacement");
        assert_relative_eq!(x, c.force(30.0) / k, max_relative = 1.0e-12);
        let v = c.voltage_for_displacement(x, k).expect("voltage");
        assert_relative_eq!(v, 30.0, max_relative = 1.0e-9);
    }

    #[test]
    fn bad_comb_inputs_are_rejected() {
        let c = comb();
        assert!(c.displacement(10.0, 0.0).is_err());
        assert!(c.voltage_for_displacement(-1.0e-6, 1.0).is_err());
        let mut empty = comb();
        empty.fingers = 0;
        assert!(matches!(
            empty.displacement(10.0, 1.0),
            Err(MemsError::Input { parameter: "fingers", .. })
        ));
    }

    #[test]
    fn differential_pair_is_odd_and_linear_near_rest() {
        let (area, gap) = (1.0e-8, 2.0e-6);
        assert_eq!(differential_capacitance(area, gap, 0.0).expect("rest"), 0.0);
        let up = differential_capacitance(area, gap, 1.0e-9).expect("up");
        let down = differential_capacitance(area, gap, -1.0e-9).expect("down");
        assert_relative_eq!(up, -down, max_relative = 1.0e-12);
        let slope = 2.0 * VACUUM_PERMITTIVITY * area / (gap * gap);
        assert_relative_eq!(up / 1.0e-9, slope, max_relative = 1.0e-6);
        assert!(differential_capacitance(area, gap, gap).is_err());
    }

    #[test]
    fn readout_scales_with_static_deflection() {
        let geometry = DeviceGeometry::new(4.0e-6, 200.0e-6, 2.0e-6, 2.0e-6).with_proof_mass(
            100.0e-6, 100.0e-6, 2.0e-6,
        );
        let mechanics = resolve(&geometry, &MaterialProperties::silicon()).expect("resolves");
        let readout = capacitive_readout(&geometry, &mechanics).expect("readout");
        assert_relative_eq!(
            readout.rest_capacitance,
            VACUUM_PERMITTIVITY * 1.0e-8 / 2.0e-6,
            max_relative = 1.0e-12
        );
        assert_relative_eq!(
            readout.capacitance_per_g,
            readout.capacitance_gradient * mechanics.static_displacement_per_g(),
            max_relative = 1.0e-12
        );

        let mut longer = geometry;
        longer.beam_length = 300.0e-6;
        let soft = resolve(&longer, &MaterialProperties::silicon()).expect("soft");
        let soft_readout = capacitive_readout(&longer, &soft).expect("soft readout");
        assert!(soft_readout.capacitance_per_g > readout.capacitance_per_g);
    }
}
