//! Shared numerical primitives: scalar aliases, state-space types and bounded bisection.

use nalgebra::{Matrix2, Vector2};

use crate::errors::MemsError;

/// Primary scalar type used across the crate.
pub type Scalar = f64;
/// Primary complex scalar type used for frequency responses.
pub type CScalar = num_complex::Complex<Scalar>;
/// Two-dimensional real state vector `[x, v]`.
pub type R2 = Vector2<Scalar>;
/// Two-by-two real state matrix.
pub type R2x2 = Matrix2<Scalar>;

/// Convergence criteria for the bracketing root finder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceCriteria {
    /// Maximum number of bisection steps.
    pub max_iterations: usize,
    /// Stop once the bracket is narrower than `relative_tolerance * |x|`.
    pub relative_tolerance: Scalar,
    /// Stop once the bracket is narrower than this absolute width.
    pub absolute_tolerance: Scalar,
}

impl Default for ConvergenceCriteria {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            relative_tolerance: 1e-12,
            absolute_tolerance: 0.0,
        }
    }
}

impl ConvergenceCriteria {
    fn is_converged(&self, width: Scalar, scale: Scalar) -> bool {
        width <= self.absolute_tolerance || width <= self.relative_tolerance * scale
    }
}

/// Root located by [`bisect`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Root {
    /// Abscissa of the root.
    pub x: Scalar,
    /// Bisection steps performed.
    pub iterations: usize,
}

/// Finds a root of `f` inside `[lo, hi]` by bisection.
///
/// The endpoints must bracket a sign change (or one of them must be an exact
/// root). Fails with [`MemsError::Convergence`] when the bracket is invalid or
/// when `criteria.max_iterations` steps do not shrink it below tolerance.
pub fn bisect<F>(
    mut f: F,
    lo: Scalar,
    hi: Scalar,
    criteria: &ConvergenceCriteria,
) -> Result<Root, MemsError>
where
    F: FnMut(Scalar) -> Scalar,
{
    let (mut lo, mut hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let mut f_lo = f(lo);
    let f_hi = f(hi);

    if !f_lo.is_finite() || !f_hi.is_finite() {
        return Err(MemsError::Convergence {
            iterations: 0,
            reason: format!("non-finite residual at bracket [{lo:e}, {hi:e}]"),
        });
    }
    if f_lo == 0.0 {
        return Ok(Root { x: lo, iterations: 0 });
    }
    if f_hi == 0.0 {
        return Ok(Root { x: hi, iterations: 0 });
    }
    if f_lo.signum() == f_hi.signum() {
        return Err(MemsError::Convergence {
            iterations: 0,
            reason: format!("root not bracketed in [{lo:e}, {hi:e}]"),
        });
    }

    for iteration in 1..=criteria.max_iterations {
        let mid = 0.5 * (lo + hi);
        let f_mid = f(mid);
        if f_mid == 0.0 {
            return Ok(Root { x: mid, iterations: iteration });
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
        let scale = lo.abs().max(hi.abs());
        if criteria.is_converged(hi - lo, scale) {
            return Ok(Root {
                x: 0.5 * (lo + hi),
                iterations: iteration,
            });
        }
    }

    Err(MemsError::Convergence {
        iterations: criteria.max_iterations,
        reason: format!("bracket [{lo:e}, {hi:e}] still wider than tolerance"),
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn bisect_finds_square_root() {
        let root = bisect(|x| x * x - 2.0, 0.0, 2.0, &ConvergenceCriteria::default())
            .expect("bracketed root");
        assert_relative_eq!(root.x, Scalar::sqrt(2.0), max_relative = 1.0e-11);
        assert!(root.iterations > 10);
    }

    #[test]
    fn bisect_rejects_unbracketed_interval() {
        let err = bisect(|x| x * x + 1.0, -1.0, 1.0, &ConvergenceCriteria::default())
            .unwrap_err();
        assert!(matches!(err, MemsError::Convergence { iterations: 0, .. }));
    }

    #[test]
    fn bisect_reports_exhausted_budget() {
        let criteria = ConvergenceCriteria {
            max_iterations: 3,
            ..ConvergenceCriteria::default()
        };
        let err = bisect(|x| x - 0.3, 0.0, 1.0, &criteria).unwrap_err();
        assert!(matches!(err, MemsError::Convergence { iterations: 3, .. }));
    }

    #[test]
    fn bisect_accepts_root_on_endpoint() {
        let root = bisect(|x| x - 1.0, 0.0, 1.0, &ConvergenceCriteria::default())
            .expect("endpoint root");
        assert_eq!(root.x, 1.0);
        assert_eq!(root.iterations, 0);
    }
}
