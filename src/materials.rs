//! Structural material properties and the built-in material table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{require_positive, MemsError};
use crate::math::Scalar;

/// Linear isotropic structural material parameters expressed in SI units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperties {
    /// Young's modulus E in Pa.
    #[serde(rename = "E")]
    pub youngs_modulus: Scalar,
    /// Density ρ in kg/m³.
    #[serde(rename = "rho")]
    pub density: Scalar,
    /// Poisson ratio ν (dimensionless).
    #[serde(rename = "nu")]
    pub poisson_ratio: Scalar,
    /// Coefficient of thermal expansion α in 1/K.
    #[serde(rename = "alpha")]
    pub thermal_expansion: Scalar,
    /// In-film residual stress in Pa (negative is compressive).
    #[serde(rename = "residualStress", default)]
    pub residual_stress: Scalar,
}

impl MaterialProperties {
    /// Single-crystal silicon, ⟨100⟩ in-plane modulus.
    #[must_use]
    pub const fn silicon() -> Self {
        Self {
            youngs_modulus: 169.0e9,
            density: 2329.0,
            poisson_ratio: 0.064,
            thermal_expansion: 2.6e-6,
            residual_stress: 0.0,
        }
    }

    /// LPCVD polysilicon with typical compressive residual stress.
    #[must_use]
    pub const fn polysilicon() -> Self {
        Self {
            youngs_modulus: 160.0e9,
            density: 2330.0,
            poisson_ratio: 0.22,
            thermal_expansion: 2.8e-6,
            residual_stress: -50.0e6,
        }
    }

    /// Validates the properties: E > 0, ρ > 0, −1 < ν < 0.5, finite α and σ.
    pub fn validate(&self) -> Result<(), MemsError> {
        require_positive("youngs_modulus", self.youngs_modulus)?;
        require_positive("density", self.density)?;
        let nu = self.poisson_ratio;
        if !nu.is_finite() || nu <= -1.0 || nu >= 0.5 {
            return Err(MemsError::input(
                "poisson_ratio",
                nu,
                "must lie in (-1, 0.5)",
            ));
        }
        if !self.thermal_expansion.is_finite() {
            return Err(MemsError::input(
                "thermal_expansion",
                self.thermal_expansion,
                "must be finite",
            ));
        }
        if !self.residual_stress.is_finite() {
            return Err(MemsError::input(
                "residual_stress",
                self.residual_stress,
                "must be finite",
            ));
        }
        Ok(())
    }

    /// Biaxial modulus E/(1 − ν) in Pa.
    #[must_use]
    pub fn biaxial_modulus(&self) -> Scalar {
        self.youngs_modulus / (1.0 - self.poisson_ratio)
    }
}

impl Default for MaterialProperties {
    fn default() -> Self {
        Self::silicon()
    }
}

/// Materials available by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Material {
    /// Single-crystal silicon.
    Silicon,
    /// LPCVD polysilicon.
    Polysilicon,
    /// Stoichiometric silicon nitride.
    SiliconNitride,
    /// Thermal silicon dioxide.
    SiliconDioxide,
    /// Sputtered aluminum.
    Aluminum,
    /// Electroplated gold.
    Gold,
}

impl Material {
    /// Every entry of the table.
    pub const ALL: [Self; 6] = [
        Self::Silicon,
        Self::Polysilicon,
        Self::SiliconNitride,
        Self::SiliconDioxide,
        Self::Aluminum,
        Self::Gold,
    ];

    /// Canonical lookup name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Silicon => "silicon",
            Self::Polysilicon => "polysilicon",
            Self::SiliconNitride => "silicon_nitride",
            Self::SiliconDioxide => "silicon_dioxide",
            Self::Aluminum => "aluminum",
            Self::Gold => "gold",
        }
    }

    /// Tabulated properties.
    #[must_use]
    pub const fn properties(self) -> MaterialProperties {
        match self {
            Self::Silicon => MaterialProperties::silicon(),
            Self::Polysilicon => MaterialProperties::polysilicon(),
            Self::SiliconNitride => MaterialProperties {
                youngs_modulus: 250.0e9,
                density: 3100.0,
                poisson_ratio: 0.23,
                thermal_expansion: 3.3e-6,
                residual_stress: 0.0,
            },
            Self::SiliconDioxide => MaterialProperties {
                youngs_modulus: 70.0e9,
                density: 2200.0,
                poisson_ratio: 0.17,
                thermal_expansion: 0.5e-6,
                residual_stress: 0.0,
            },
            Self::Aluminum => MaterialProperties {
                youngs_modulus: 70.0e9,
                density: 2700.0,
                poisson_ratio: 0.35,
                thermal_expansion: 23.1e-6,
                residual_stress: 0.0,
            },
            Self::Gold => MaterialProperties {
                youngs_modulus: 79.0e9,
                density: 19_300.0,
                poisson_ratio: 0.42,
                thermal_expansion: 14.2e-6,
                residual_stress: 0.0,
            },
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Material {
    type Err = MemsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let alias = match key.as_str() {
            "si" => "silicon",
            "poly" | "poly_si" => "polysilicon",
            "si3n4" | "nitride" => "silicon_nitride",
            "sio2" | "oxide" => "silicon_dioxide",
            "al" | "aluminium" => "aluminum",
            "au" => "gold",
            other => other,
        };
        Self::ALL
            .into_iter()
            .find(|m| m.name() == alias)
            .ok_or_else(|| MemsError::Config(format!("unknown material `{s}`")))
    }
}

/// Material as given in a request: a table name or explicit properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaterialSpec {
    /// Lookup by name in the built-in table.
    Named(String),
    /// Explicit properties.
    Properties(MaterialProperties),
}

impl MaterialSpec {
    /// Looks up or unwraps the properties and validates them.
    pub fn properties(&self) -> Result<MaterialProperties, MemsError> {
        let props = match self {
            Self::Named(name) => name.parse::<Material>()?.properties(),
            Self::Properties(props) => *props,
        };
        props.validate()?;
        Ok(props)
    }
}

impl Default for MaterialSpec {
    fn default() -> Self {
        Self::Named(Material::Silicon.name().to_owned())
    }
}

impl From<Material> for MaterialSpec {
    fn from(material: Material) -> Self {
        Self::Named(material.name().to_owned())
    }
}

impl From<MaterialProperties> for MaterialSpec {
    fn from(props: MaterialProperties) -> Self {
        Self::Properties(props)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn table_entries_are_valid() {
        for material in Material::ALL {
            material
                .properties()
                .validate()
                .unwrap_or_else(|e| panic!("{material} invalid: {e}"));
        }
    }

    #[test]
    fn lookup_accepts_aliases() {
        assert_eq!("Si".parse::<Material>(), Ok(Material::Silicon));
        assert_eq!("poly-si".parse::<Material>(), Ok(Material::Polysilicon));
        assert_eq!("SiO2".parse::<Material>(), Ok(Material::SiliconDioxide));
        assert!("unobtainium".parse::<Material>().is_err());
    }

    #[test]
    fn poisson_ratio_bounds_are_enforced() {
        let mut props = MaterialProperties::silicon();
        props.poisson_ratio = 0.5;
        assert!(props.validate().is_err());
    }

    #[test]
    fn material_spec_parses_name_or_properties() {
        let named: MaterialSpec = serde_json::from_str("\"silicon\"").expect("name");
        assert_relative_eq!(named.properties().expect("valid").youngs_modulus, 169.0e9);

        let explicit: MaterialSpec =
            serde_json::from_str(r#"{"E": 1.5e11, "rho": 2300, "nu": 0.2, "alpha": 2.5e-6}"#)
                .expect("properties");
        let props = explicit.properties().expect("valid");
        assert_relative_eq!(props.youngs_modulus, 1.5e11);
        assert_relative_eq!(props.residual_stress, 0.0);
    }
}
