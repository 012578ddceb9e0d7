//! Device geometry value objects and manufacturability checks.

use serde::{Deserialize, Serialize};

use crate::errors::{require_positive, MemsError};
use crate::math::Scalar;

/// Flexure topology of the suspension.
///
/// Stiffness is expressed as a multiplier on the in-plane cantilever stiffness
/// `k_c = E·t·w³ / (4·L³)` of a single beam segment:
///
/// | topology      | multiplier       | segments per unit | effective mass fraction |
/// |---------------|------------------|-------------------|-------------------------|
/// | cantilever    | 1                | 1                 | 33/140                  |
/// | fixed-guided  | 4                | 1                 | 13/35                   |
/// | folded beam   | 2                | 2                 | 13/35                   |
/// | crab leg (r)  | 1 / (1/4 + r³)   | 1 + r             | 13/35                   |
/// | serpentine (n)| 4 / n            | n                 | 13/35                   |
///
/// The crab-leg shin is modeled as a cantilever of length `r·L` in series with
/// a fixed-guided thigh; serpentine meanders as `n` fixed-guided segments in
/// series with rigid connectors.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SpringTopology {
    /// Single clamped-free beam loaded at the tip.
    Cantilever,
    /// Clamped beam with a guided (slope-free) end.
    FixedGuided,
    /// Folded flexure: two fixed-guided legs in series.
    #[default]
    FoldedBeam,
    /// Crab-leg flexure; `shin_ratio` is shin length over thigh length.
    CrabLeg {
        /// Shin length divided by thigh length.
        shin_ratio: Scalar,
    },
    /// Serpentine flexure with `meanders` segments in series.
    Serpentine {
        /// Number of series segments.
        meanders: u32,
    },
}

impl SpringTopology {
    /// Stiffness multiplier relative to the cantilever base stiffness.
    #[must_use]
    pub fn stiffness_multiplier(&self) -> Scalar {
        match *self {
            Self::Cantilever => 1.0,
            Self::FixedGuided => 4.0,
            Self::FoldedBeam => 2.0,
            Self::CrabLeg { shin_ratio } => 1.0 / (0.25 + shin_ratio.powi(3)),
            Self::Serpentine { meanders } => 4.0 / Scalar::from(meanders),
        }
    }

    /// Beam length per flexure unit, in units of the beam length `L`.
    #[must_use]
    pub fn segments(&self) -> Scalar {
        match *self {
            Self::Cantilever | Self::FixedGuided => 1.0,
            Self::FoldedBeam => 2.0,
            Self::CrabLeg { shin_ratio } => 1.0 + shin_ratio,
            Self::Serpentine { meanders } => Scalar::from(meanders),
        }
    }

    /// Fraction of the beam mass that participates in the fundamental mode.
    #[must_use]
    pub fn effective_mass_fraction(&self) -> Scalar {
        match self {
            Self::Cantilever => 33.0 / 140.0,
            _ => 13.0 / 35.0,
        }
    }

    fn validate(&self) -> Result<(), MemsError> {
        match *self {
            Self::CrabLeg { shin_ratio } => {
                require_positive("shin_ratio", shin_ratio)?;
                if shin_ratio > 10.0 {
                    return Err(MemsError::input("shin_ratio", shin_ratio, "must be <= 10"));
                }
                Ok(())
            }
            Self::Serpentine { meanders: 0 } => {
                Err(MemsError::input("meanders", 0.0, "must be >= 1"))
            }
            _ => Ok(()),
        }
    }
}

/// Rigid proof mass (plate) carried by the suspension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProofMass {
    /// Plate length in m.
    pub length: Scalar,
    /// Plate width in m.
    pub width: Scalar,
    /// Plate thickness in m.
    pub thickness: Scalar,
}

impl ProofMass {
    /// Plate volume in m³.
    #[must_use]
    pub fn volume(&self) -> Scalar {
        self.length * self.width * self.thickness
    }
}

/// Bounds a geometry must satisfy to be manufacturable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManufacturingLimits {
    /// Minimum lithographic feature (beam width, plate sides) in m.
    pub min_feature: Scalar,
    /// Minimum structural film thickness in m.
    pub min_thickness: Scalar,
    /// Minimum sacrificial gap in m.
    pub min_gap: Scalar,
    /// Maximum beam slenderness L/w.
    pub max_slenderness: Scalar,
    /// Maximum etch aspect ratio t/w.
    pub max_aspect_ratio: Scalar,
    /// Maximum extent of any dimension in m.
    pub max_dimension: Scalar,
}

impl Default for ManufacturingLimits {
    fn default() -> Self {
        Self {
            min_feature: 1.0e-6,
            min_thickness: 0.1e-6,
            min_gap: 0.1e-6,
            max_slenderness: 1000.0,
            max_aspect_ratio: 50.0,
            max_dimension: 10.0e-3,
        }
    }
}

impl ManufacturingLimits {
    /// Limits that only ask for finite, strictly positive dimensions.
    ///
    /// Tolerance corners of a manufacturable design are resolved under these,
    /// since a ±10 % step may cross a process bound the nominal design meets.
    #[must_use]
    pub const fn positive_only() -> Self {
        Self {
            min_feature: 0.0,
            min_thickness: 0.0,
            min_gap: 0.0,
            max_slenderness: Scalar::INFINITY,
            max_aspect_ratio: Scalar::INFINITY,
            max_dimension: Scalar::INFINITY,
        }
    }

    fn check_range(
        &self,
        parameter: &'static str,
        value: Scalar,
        min: Scalar,
    ) -> Result<(), MemsError> {
        require_positive(parameter, value)?;
        if value < min {
            return Err(MemsError::input(
                parameter,
                value,
                format!("below manufacturable minimum {min:e} m"),
            ));
        }
        if value > self.max_dimension {
            return Err(MemsError::input(
                parameter,
                value,
                format!("above maximum dimension {:e} m", self.max_dimension),
            ));
        }
        Ok(())
    }
}

fn default_units() -> u32 {
    4
}

/// Geometry of a suspended resonant structure. All lengths in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceGeometry {
    /// Beam (flexure) width w, the in-plane bending dimension.
    #[serde(rename = "w")]
    pub beam_width: Scalar,
    /// Beam length L.
    #[serde(rename = "L")]
    pub beam_length: Scalar,
    /// Beam thickness t (structural layer / etch depth).
    #[serde(rename = "t")]
    pub beam_thickness: Scalar,
    /// Gap h between the moving plate and the fixed electrode or substrate.
    #[serde(rename = "h")]
    pub gap: Scalar,
    /// Number of flexure units acting in parallel.
    #[serde(default = "default_units")]
    pub units: u32,
    /// Flexure topology.
    #[serde(default)]
    pub topology: SpringTopology,
    /// Optional rigid proof mass.
    #[serde(default, rename = "proofMass")]
    pub proof_mass: Option<ProofMass>,
}

impl DeviceGeometry {
    /// Creates a four-unit folded-beam geometry without a proof mass.
    #[must_use]
    pub const fn new(
        beam_width: Scalar,
        beam_length: Scalar,
        beam_thickness: Scalar,
        gap: Scalar,
    ) -> Self {
        Self {
            beam_width,
            beam_length,
            beam_thickness,
            gap,
            units: 4,
            topology: SpringTopology::FoldedBeam,
            proof_mass: None,
        }
    }

    /// Returns a copy with the given topology and unit count.
    #[must_use]
    pub fn with_suspension(mut self, topology: SpringTopology, units: u32) -> Self {
        self.topology = topology;
        self.units = units;
        self
    }

    /// Returns a copy carrying a proof mass of the given dimensions.
    #[must_use]
    pub fn with_proof_mass(mut self, length: Scalar, width: Scalar, thickness: Scalar) -> Self {
        self.proof_mass = Some(ProofMass {
            length,
            width,
            thickness,
        });
        self
    }

    /// Validates against [`ManufacturingLimits::default`].
    pub fn validate(&self) -> Result<(), MemsError> {
        self.validate_with(&ManufacturingLimits::default())
    }

    /// Validates every dimension and ratio against `limits`.
    pub fn validate_with(&self, limits: &ManufacturingLimits) -> Result<(), MemsError> {
        limits.check_range("beam_width", self.beam_width, limits.min_feature)?;
        limits.check_range("beam_length", self.beam_length, limits.min_feature)?;
        limits.check_range("beam_thickness", self.beam_thickness, limits.min_thickness)?;
        limits.check_range("gap", self.gap, limits.min_gap)?;

        let slenderness = self.beam_length / self.beam_width;
        if slenderness > limits.max_slenderness {
            return Err(MemsError::input(
                "beam_length",
                self.beam_length,
                format!(
                    "slenderness L/w = {slenderness:.1} exceeds {}",
                    limits.max_slenderness
                ),
            ));
        }
        let aspect = self.beam_thickness / self.beam_width;
        if aspect > limits.max_aspect_ratio {
            return Err(MemsError::input(
                "beam_thickness",
                self.beam_thickness,
                format!("aspect ratio t/w = {aspect:.1} exceeds {}", limits.max_aspect_ratio),
            ));
        }
        if self.units == 0 {
            return Err(MemsError::input("units", 0.0, "must be >= 1"));
        }
        self.topology.validate()?;

        if let Some(pm) = &self.proof_mass {
            limits.check_range("proof_mass_length", pm.length, limits.min_feature)?;
            limits.check_range("proof_mass_width", pm.width, limits.min_feature)?;
            limits.check_range("proof_mass_thickness", pm.thickness, limits.min_thickness)?;
        }
        Ok(())
    }

    /// Volume of a single beam segment in m³.
    #[must_use]
    pub fn beam_segment_volume(&self) -> Scalar {
        self.beam_width * self.beam_length * self.beam_thickness
    }

    /// In-plane planform of the moving plate as `(long side, short side)`.
    ///
    /// The proof mass when present, otherwise the beam's own length × width face.
    #[must_use]
    pub fn plate_planform(&self) -> (Scalar, Scalar) {
        let (a, b) = match &self.proof_mass {
            Some(pm) => (pm.length, pm.width),
            None => (self.beam_length, self.beam_width),
        };
        if a >= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Area of the moving plate facing the fixed electrode, in m².
    #[must_use]
    pub fn electrode_area(&self) -> Scalar {
        let (long, short) = self.plate_planform();
        long * short
    }
}
