//! Sample-grid builders for frequency, time and parameter sweeps.

use crate::constants::angular_frequency;
use crate::errors::MemsError;
use crate::math::Scalar;

/// Generates `n` linearly spaced samples in [start, stop].
#[must_use]
pub fn linspace(start: Scalar, stop: Scalar, n: usize) -> Vec<Scalar> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n as Scalar - 1.0);
            (0..n).map(|i| start + step * i as Scalar).collect()
        }
    }
}

/// Generates `n` logarithmically spaced samples in [start, stop].
///
/// Both bounds must be finite and strictly positive.
pub fn logspace(start: Scalar, stop: Scalar, n: usize) -> Result<Vec<Scalar>, MemsError> {
    for (name, v) in [("logspace_start", start), ("logspace_stop", stop)] {
        if !(v.is_finite() && v > 0.0) {
            return Err(MemsError::input(name, v, "log grid bounds must be finite and > 0"));
        }
    }
    let mut out: Vec<Scalar> = linspace(start.log10(), stop.log10(), n)
        .into_iter()
        .map(|e| 10f64.powf(e))
        .collect();
    // pin the endpoints against powf rounding
    if let Some(first) = out.first_mut() {
        *first = start;
    }
    if n > 1 {
        if let Some(last) = out.last_mut() {
            *last = stop;
        }
    }
    Ok(out)
}

/// Angular frequencies (rad/s) for `n` points linearly spanning
/// `[f0·(1 − half_span), f0·(1 + half_span)]` Hz around a resonance `f0`.
#[must_use]
pub fn resonance_window(f0_hz: Scalar, half_span: Scalar, n: usize) -> Vec<Scalar> {
    linspace(f0_hz * (1.0 - half_span), f0_hz * (1.0 + half_span), n)
        .into_iter()
        .map(angular_frequency)
        .collect()
}

/// Angular frequencies (rad/s) log-spaced between `f_start_hz` and `f_stop_hz`.
pub fn angular_logspace(
    f_start_hz: Scalar,
    f_stop_hz: Scalar,
    n: usize,
) -> Result<Vec<Scalar>, MemsError> {
    Ok(logspace(f_start_hz, f_stop_hz, n)?
        .into_iter()
        .map(angular_frequency)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linspace_spans_gap_grid() {
        let gaps = linspace(1.0e-6, 3.0e-6, 5);
        assert_eq!(gaps.len(), 5);
        assert_eq!(gaps[0], 1.0e-6);
        assert_relative_eq!(gaps[2], 2.0e-6, max_relative = 1.0e-12);
        assert_relative_eq!(gaps[4], 3.0e-6, max_relative = 1.0e-12);
    }

    #[test]
    fn degenerate_counts() {
        assert!(linspace(1.0e-6, 3.0e-6, 0).is_empty());
        assert_eq!(linspace(1.0e-6, 3.0e-6, 1), vec![1.0e-6]);
        let single = logspace(10.0, 1.0e3, 1).expect("grid");
        assert_eq!(single, vec![10.0]);
    }

    #[test]
    fn logspace_hits_decades() {
        let v = logspace(1.0, 1.0e4, 5).expect("grid");
        assert_eq!(v.len(), 5);
        assert_eq!(v[0], 1.0);
        assert_relative_eq!(v[2], 100.0, max_relative = 1.0e-12);
        assert_eq!(v[4], 1.0e4);
    }

    #[test]
    fn logspace_rejects_non_positive_bounds() {
        assert!(logspace(0.0, 10.0, 3).is_err());
    }

    #[test]
    fn angular_logspace_converts_hertz() {
        let w = angular_logspace(10.0, 1.0e3, 3).expect("grid");
        assert_relative_eq!(w[1], angular_frequency(100.0), max_relative = 1.0e-12);
    }

    #[test]
    fn resonance_window_is_centered() {
        let w = resonance_window(1.0e4, 0.5, 3);
        assert_relative_eq!(w[1], angular_frequency(1.0e4), max_relative = 1.0e-12);
        assert_relative_eq!(w[0], angular_frequency(5.0e3), max_relative = 1.0e-12);
    }
}
