//! Shared error type used across the resolver, damping, dynamics and explorer layers.

use thiserror::Error;

use crate::math::Scalar;

/// Top-level error type for the crate.
///
/// Errors are `Clone` so that design-space sweeps can store them per row.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MemsError {
    /// A caller-supplied geometry, material or environment value is out of bounds.
    #[error("invalid input `{parameter}` = {value:e}: {reason}")]
    Input {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// The rejected value.
        value: Scalar,
        /// Why the value was rejected.
        reason: String,
    },
    /// The applied voltage leaves no stable electrostatic equilibrium.
    #[error("pull-in: {voltage:.4} V exceeds pull-in voltage {pull_in_voltage:.4} V")]
    PullIn {
        /// Applied actuation voltage in volts.
        voltage: Scalar,
        /// Pull-in voltage of the structure in volts.
        pull_in_voltage: Scalar,
    },
    /// An iterative solver exhausted its budget or could not bracket a root.
    #[error("solver convergence failure after {iterations} iterations: {reason}")]
    Convergence {
        /// Iterations performed before giving up.
        iterations: usize,
        /// Failure description.
        reason: String,
    },
    /// A derived quantity came out non-finite or physically impossible.
    #[error("derived quantity `{quantity}` = {value:e} is invalid: {reason}")]
    Validation {
        /// Name of the derived quantity.
        quantity: &'static str,
        /// The computed value.
        value: Scalar,
        /// Why the value is rejected.
        reason: String,
    },
    /// The damping ratio of a second-order system is not finite.
    #[error(
        "damping ratio diverged for m = {mass:e} kg, k = {stiffness:e} N/m, b = {damping:e} N·s/m"
    )]
    Diverge {
        /// Mass in kilograms.
        mass: Scalar,
        /// Stiffness in N/m.
        stiffness: Scalar,
        /// Damping coefficient in N·s/m.
        damping: Scalar,
    },
    /// The request configuration could not be parsed or is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),
}

impl MemsError {
    pub(crate) fn input(parameter: &'static str, value: Scalar, reason: impl Into<String>) -> Self {
        Self::Input {
            parameter,
            value,
            reason: reason.into(),
        }
    }

    pub(crate) fn validation(
        quantity: &'static str,
        value: Scalar,
        reason: impl Into<String>,
    ) -> Self {
        Self::Validation {
            quantity,
            value,
            reason: reason.into(),
        }
    }

    /// Short machine-readable label for the error kind, used in sweep tables.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Input { .. } => "input",
            Self::PullIn { .. } => "pull_in",
            Self::Convergence { .. } => "convergence",
            Self::Validation { .. } => "validation",
            Self::Diverge { .. } => "diverge",
            Self::Config(_) => "config",
        }
    }
}

impl From<serde_json::Error> for MemsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Checks that a caller-supplied value is finite and strictly positive.
pub(crate) fn require_positive(
    parameter: &'static str,
    value: Scalar,
) -> Result<Scalar, MemsError> {
    if !value.is_finite() {
        return Err(MemsError::input(parameter, value, "must be finite"));
    }
    if value <= 0.0 {
        return Err(MemsError::input(parameter, value, "must be > 0"));
    }
    Ok(value)
}

/// Checks that a caller-supplied value is finite and not negative.
pub(crate) fn require_non_negative(
    parameter: &'static str,
    value: Scalar,
) -> Result<Scalar, MemsError> {
    if !value.is_finite() {
        return Err(MemsError::input(parameter, value, "must be finite"));
    }
    if value < 0.0 {
        return Err(MemsError::input(parameter, value, "must be >= 0"));
    }
    Ok(value)
}

/// Checks that a derived value is finite and not negative.
pub(crate) fn check_derived(quantity: &'static str, value: Scalar) -> Result<Scalar, MemsError> {
    if !value.is_finite() {
        return Err(MemsError::validation(quantity, value, "not finite"));
    }
    if value < 0.0 {
        return Err(MemsError::validation(quantity, value, "negative"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_check_rejects_zero_and_nan() {
        assert!(require_positive("w", 0.0).is_err());
        assert!(require_positive("w", Scalar::NAN).is_err());
        assert_eq!(require_positive("w", 2.0e-6), Ok(2.0e-6));
    }

    #[test]
    fn error_display_names_parameter() {
        let err = MemsError::input("gap", -1.0e-6, "must be > 0");
        let printed = err.to_string();
        assert!(printed.contains("gap"), "got {printed}");
        assert_eq!(err.kind(), "input");
    }

    #[test]
    fn derived_check_flags_infinity() {
        let err = check_derived("damping", Scalar::INFINITY).unwrap_err();
        assert!(matches!(err, MemsError::Validation { quantity: "damping", .. }));
    }
}
