//! Linear second-order dynamics: transfer function, step and forced responses.
//!
//! The plant is `m·ẍ + b·ẋ + k·x = m·a(t)`, i.e. a proof mass driven by base
//! acceleration `a(t)`. Responses are displacement per unit acceleration, so the
//! transfer function is
//!
//! ```text
//! H(ω) = 1 / (ω_n² − ω² + j·2ζω_nω)
//! ```
//!
//! whose magnitude is `1/√((ω_n² − ω²)² + (2ζω_nω)²)`.

use std::f64::consts::PI;

use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::constants::linear_frequency;
use crate::errors::MemsError;
use crate::math::{CScalar, R2, R2x2, Scalar};
use crate::resolver::MechanicalModel;

const CRITICAL_DAMPING_TOLERANCE: Scalar = 1.0e-6;
/// RK4 substeps per undamped period.
const STEPS_PER_PERIOD: Scalar = 64.0;
/// Upper bound on RK4 substeps across one output interval.
const MAX_SUBSTEPS: usize = 1_000_000;

/// Mass-spring-damper system with validated, finite damping ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SecondOrderSystem {
    mass: Scalar,
    stiffness: Scalar,
    damping: Scalar,
    natural_frequency: Scalar,
    damping_ratio: Scalar,
}

impl SecondOrderSystem {
    /// Creates the system from mass (kg), stiffness (N/m) and damping (N·s/m).
    ///
    /// Fails with [`MemsError::Validation`] for negative damping and with
    /// [`MemsError::Diverge`] when ω_n or ζ is not finite.
    pub fn new(mass: Scalar, stiffness: Scalar, damping: Scalar) -> Result<Self, MemsError> {
        if damping < 0.0 {
            return Err(MemsError::validation("damping", damping, "negative"));
        }
        let natural_frequency = (stiffness / mass).sqrt();
        let damping_ratio = damping / (2.0 * (mass * stiffness).sqrt());
        if !natural_frequency.is_finite() || !damping_ratio.is_finite() {
            return Err(MemsError::Diverge {
                mass,
                stiffness,
                damping,
            });
        }
        Ok(Self {
            mass,
            stiffness,
            damping,
            natural_frequency,
            damping_ratio,
        })
    }

    /// Creates the system from a resolved model and a damping coefficient.
    pub fn from_model(model: &MechanicalModel, damping: Scalar) -> Result<Self, MemsError> {
        Self::new(model.mass, model.stiffness, damping)
    }

    /// Mass in kg.
    #[must_use]
    pub const fn mass(&self) -> Scalar {
        self.mass
    }

    /// Stiffness in N/m.
    #[must_use]
    pub const fn stiffness(&self) -> Scalar {
        self.stiffness
    }

    /// Damping coefficient in N·s/m.
    #[must_use]
    pub const fn damping(&self) -> Scalar {
        self.damping
    }

    /// ζ = b / (2√(mk)).
    #[must_use]
    pub const fn damping_ratio(&self) -> Scalar {
        self.damping_ratio
    }

    /// ω_n in rad/s.
    #[must_use]
    pub const fn natural_frequency(&self) -> Scalar {
        self.natural_frequency
    }

    /// f₀ in Hz.
    #[must_use]
    pub fn natural_frequency_hz(&self) -> Scalar {
        linear_frequency(self.natural_frequency)
    }

    /// Q = 1/(2ζ); infinite when undamped.
    #[must_use]
    pub fn quality_factor(&self) -> Scalar {
        1.0 / (2.0 * self.damping_ratio)
    }

    /// Resonator −3 dB bandwidth f₀/Q in Hz.
    #[must_use]
    pub fn bandwidth_hz(&self) -> Scalar {
        2.0 * self.damping_ratio * self.natural_frequency_hz()
    }

    /// Damped natural frequency ω_d = ω_n√(1 − ζ²) in rad/s, if underdamped.
    #[must_use]
    pub fn damped_natural_frequency(&self) -> Option<Scalar> {
        (self.damping_ratio < 1.0)
            .then(|| self.natural_frequency * (1.0 - self.damping_ratio.powi(2)).sqrt())
    }

    /// Frequency of the displacement-response peak ω_n√(1 − 2ζ²) in rad/s,
    /// if the response peaks at all (ζ < 1/√2).
    #[must_use]
    pub fn peak_frequency(&self) -> Option<Scalar> {
        let radicand = 1.0 - 2.0 * self.damping_ratio.powi(2);
        (radicand > 0.0).then(|| self.natural_frequency * radicand.sqrt())
    }

    /// Sensor bandwidth: the frequency in Hz at which |H| first drops 3 dB
    /// below its DC value.
    #[must_use]
    pub fn cutoff_frequency_hz(&self) -> Scalar {
        let c = 1.0 - 2.0 * self.damping_ratio.powi(2);
        linear_frequency(self.natural_frequency * (c + (c * c + 1.0).sqrt()).sqrt())
    }

    /// Complex displacement response per unit acceleration at `omega` (rad/s).
    #[must_use]
    pub fn transfer(&self, omega: Scalar) -> CScalar {
        let wn = self.natural_frequency;
        let denom = Complex::new(wn * wn - omega * omega, 2.0 * self.damping_ratio * wn * omega);
        denom.inv()
    }

    /// Evaluates [`Self::transfer`] over `omegas`.
    #[must_use]
    pub fn frequency_response<I>(&self, omegas: I) -> FrequencyResponse
    where
        I: IntoIterator<Item = Scalar>,
    {
        let omegas: Vec<Scalar> = omegas.into_iter().collect();
        let response: Vec<CScalar> = omegas.iter().map(|&w| self.transfer(w)).collect();
        let magnitude = response.iter().map(|h| h.norm()).collect();
        let phase_deg = response.iter().map(|h| h.arg().to_degrees()).collect();
        FrequencyResponse {
            omegas,
            response,
            magnitude,
            phase_deg,
        }
    }

    /// Closed-form displacement after a step of `acceleration` (m/s²) at t = 0,
    /// starting from rest. Samples at negative times are zero.
    #[must_use]
    pub fn step_response(&self, times: &[Scalar], acceleration: Scalar) -> Vec<Scalar> {
        let wn = self.natural_frequency;
        let zeta = self.damping_ratio;
        let x_ss = acceleration / (wn * wn);

        times
            .iter()
            .map(|&t| {
                if t <= 0.0 {
                    return 0.0;
                }
                let shape = if (zeta - 1.0).abs() < CRITICAL_DAMPING_TOLERANCE {
                    1.0 - (-wn * t).exp() * (1.0 + wn * t)
                } else if zeta < 1.0 {
                    let root = (1.0 - zeta * zeta).sqrt();
                    let wd = wn * root;
                    1.0 - (-zeta * wn * t).exp()
                        * ((wd * t).cos() + zeta / root * (wd * t).sin())
                } else {
                    let root = (zeta * zeta - 1.0).sqrt();
                    let s1 = -wn * (zeta - root);
                    let s2 = -wn * (zeta + root);
                    1.0 + (s2 * (s1 * t).exp() - s1 * (s2 * t).exp()) / (s1 - s2)
                };
                x_ss * shape
            })
            .collect()
    }

    /// Integrates the response to an arbitrary acceleration input `input(t)`
    /// (m/s²) with classical RK4, starting from rest at `times[0]`.
    ///
    /// `times` must be finite and non-decreasing. Each output interval is
    /// subdivided so that no substep exceeds 1/64 of the natural period or the
    /// inverse of the fastest pole.
    pub fn forced_response<F>(&self, times: &[Scalar], input: F) -> Result<TimeResponse, MemsError>
    where
        F: Fn(Scalar) -> Scalar,
    {
        if let Some(bad) = times.iter().find(|t| !t.is_finite()) {
            return Err(MemsError::input("times", *bad, "must be finite"));
        }
        if let Some(w) = times.windows(2).find(|w| w[1] < w[0]) {
            return Err(MemsError::input("times", w[1], "must be non-decreasing"));
        }

        let wn = self.natural_frequency;
        let zeta = self.damping_ratio;
        let fastest_pole = wn * (zeta + (zeta * zeta - 1.0).max(0.0).sqrt());
        let period_step = 2.0 * PI / wn / STEPS_PER_PERIOD;
        let h_max = period_step.min(1.0 / fastest_pole.max(Scalar::MIN_POSITIVE));

        let a = R2x2::new(
            0.0,
            1.0,
            -self.stiffness / self.mass,
            -self.damping / self.mass,
        );
        let derivative = |t: Scalar, x: &R2| -> R2 { a * x + R2::new(0.0, input(t)) };

        let mut out = TimeResponse::with_capacity(times.len());
        let Some(&t0) = times.first() else {
            return Ok(out);
        };
        let mut state = R2::zeros();
        let mut t = t0;
        out.push(t, &state);

        for &t_next in &times[1..] {
            let span = t_next - t;
            if span > 0.0 {
                let substeps = (span / h_max).ceil();
                if substeps > MAX_SUBSTEPS as Scalar {
                    return Err(MemsError::Convergence {
                        iterations: MAX_SUBSTEPS,
                        reason: format!(
                            "output interval {span:e} s needs {substeps:e} RK4 substeps"
                        ),
                    });
                }
                let n = substeps as usize;
                let h = span / n as Scalar;
                for _ in 0..n {
                    let k1 = derivative(t, &state);
                    let k2 = derivative(t + 0.5 * h, &(state + k1 * (0.5 * h)));
                    let k3 = derivative(t + 0.5 * h, &(state + k2 * (0.5 * h)));
                    let k4 = derivative(t + h, &(state + k3 * h));
                    state += (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (h / 6.0);
                    t += h;
                }
            }
            t = t_next;
            out.push(t, &state);
        }
        Ok(out)
    }
}

/// Half-sine shock pulse of `peak` (m/s²) lasting `duration` seconds from t = 0.
pub fn half_sine_pulse(peak: Scalar, duration: Scalar) -> impl Fn(Scalar) -> Scalar {
    move |t| {
        if (0.0..duration).contains(&t) {
            peak * (PI * t / duration).sin()
        } else {
            0.0
        }
    }
}

/// Frequency-domain response over a supplied vector of angular frequencies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequencyResponse {
    /// Angular frequencies in rad/s.
    pub omegas: Vec<Scalar>,
    /// Complex displacement per unit acceleration (s²).
    #[serde(skip)]
    pub response: Vec<CScalar>,
    /// |H(ω)| in s².
    pub magnitude: Vec<Scalar>,
    /// arg H(ω) in degrees, in [−180, 0].
    pub phase_deg: Vec<Scalar>,
}

impl FrequencyResponse {
    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.omegas.len()
    }

    /// True if no samples were evaluated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.omegas.is_empty()
    }

    /// Magnitude in dB (20·log10|H|), clamping very small values.
    #[must_use]
    pub fn magnitude_db(&self) -> Vec<Scalar> {
        const MIN: Scalar = 1e-300;
        self.magnitude
            .iter()
            .map(|m| 20.0 * m.max(MIN).log10())
            .collect()
    }

    /// Largest sampled magnitude as `(omega, magnitude)`.
    #[must_use]
    pub fn peak(&self) -> Option<(Scalar, Scalar)> {
        self.omegas
            .iter()
            .copied()
            .zip(self.magnitude.iter().copied())
            .filter(|(_, m)| m.is_finite())
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }
}

/// Time-domain trajectory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeResponse {
    /// Sample times in s.
    pub times: Vec<Scalar>,
    /// Displacement in m.
    pub displacement: Vec<Scalar>,
    /// Velocity in m/s.
    pub velocity: Vec<Scalar>,
}

impl TimeResponse {
    fn with_capacity(n: usize) -> Self {
        Self {
            times: Vec::with_capacity(n),
            displacement: Vec::with_capacity(n),
            velocity: Vec::with_capacity(n),
        }
    }

    fn push(&mut self, t: Scalar, state: &R2) {
        self.times.push(t);
        self.displacement.push(state[0]);
        self.velocity.push(state[1]);
    }

    /// Largest absolute displacement in m.
    #[must_use]
    pub fn peak_displacement(&self) -> Scalar {
        self.displacement.iter().fold(0.0, |acc, x| acc.max(x.abs()))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::constants::{angular_frequency, STANDARD_GRAVITY};
    use crate::sweep::{linspace, resonance_window};

    fn lightly_damped() -> SecondOrderSystem {
        // m = 1 ng, f0 = 10 kHz, Q = 50
        let m = 1.0e-12;
        let wn = angular_frequency(1.0e4);
        let k = m * wn * wn;
        let b = m * wn / 50.0;
        SecondOrderSystem::new(m, k, b).expect("valid system")
    }

    fn with_zeta(zeta: Scalar) -> SecondOrderSystem {
        let m = 1.0e-12;
        let wn = angular_frequency(1.0e4);
        SecondOrderSystem::new(m, m * wn * wn, 2.0 * zeta * m * wn).expect("valid system")
    }

    #[test]
    fn quality_factor_and_bandwidth_follow_damping_ratio() {
        let sys = lightly_damped();
        assert_relative_eq!(sys.damping_ratio(), 0.01, max_relative = 1.0e-12);
        assert_relative_eq!(sys.quality_factor(), 50.0, max_relative = 1.0e-12);
        assert_relative_eq!(sys.bandwidth_hz(), 200.0, max_relative = 1.0e-9);
    }

    #[test]
    fn magnitude_matches_closed_form() {
        let sys = lightly_damped();
        let wn = sys.natural_frequency();
        let zeta = sys.damping_ratio();
        let omegas = resonance_window(sys.natural_frequency_hz(), 0.5, 41);
        let fr = sys.frequency_response(omegas.iter().copied());
        for (w, m) in fr.omegas.iter().zip(&fr.magnitude) {
            let expected =
                1.0 / ((wn * wn - w * w).powi(2) + (2.0 * zeta * wn * w).powi(2)).sqrt();
            assert_relative_eq!(*m, expected, max_relative = 1.0e-10);
        }
    }

    #[test]
    fn phase_is_minus_ninety_at_resonance() {
        let sys = lightly_damped();
        let fr = sys.frequency_response([sys.natural_frequency()]);
        assert_relative_eq!(fr.phase_deg[0], -90.0, epsilon = 1.0e-9);
        let dc = sys.frequency_response([0.0]);
        assert_relative_eq!(
            dc.magnitude[0],
            1.0 / sys.natural_frequency().powi(2),
            max_relative = 1.0e-12
        );
    }

    #[test]
    fn sampled_peak_sits_near_natural_frequency() {
        let sys = lightly_damped();
        let fr = sys.frequency_response(resonance_window(sys.natural_frequency_hz(), 0.2, 2001));
        let (w_peak, _) = fr.peak().expect("non-empty");
        let expected = sys.peak_frequency().expect("underdamped");
        assert_relative_eq!(w_peak, expected, max_relative = 1.0e-3);
        assert_eq!(fr.magnitude_db().len(), fr.len());
    }

    #[test]
    fn zero_mass_diverges() {
        let err = SecondOrderSystem::new(0.0, 1.0, 1.0e-6).unwrap_err();
        assert!(matches!(err, MemsError::Diverge { .. }));
    }

    #[test]
    fn negative_damping_is_invalid() {
        let err = SecondOrderSystem::new(1.0e-9, 1.0, -1.0e-6).unwrap_err();
        assert!(matches!(err, MemsError::Validation { quantity: "damping", .. }));
    }

    #[test]
    fn undamped_system_has_infinite_q() {
        let sys = SecondOrderSystem::new(1.0e-9, 1.0, 0.0).expect("undamped ok");
        assert!(sys.quality_factor().is_infinite());
        assert_eq!(sys.bandwidth_hz(), 0.0);
    }

    #[test]
    fn step_response_settles_to_static_deflection() {
        let a = STANDARD_GRAVITY;
        for zeta in [0.05, 1.0, 3.0] {
            let sys = with_zeta(zeta);
            let x_ss = a / sys.natural_frequency().powi(2);
            let t_end = 400.0 / sys.natural_frequency_hz();
            let x = sys.step_response(&[0.0, t_end], a);
            assert_eq!(x[0], 0.0);
            assert_relative_eq!(x[1], x_ss, max_relative = 1.0e-6);
        }
    }

    #[test]
    fn underdamped_step_overshoots_and_overdamped_does_not() {
        let times = linspace(0.0, 1.0e-3, 2000);
        let under = with_zeta(0.1);
        let over = with_zeta(2.0);
        let x_ss_under = 1.0 / under.natural_frequency().powi(2);
        let x_ss_over = 1.0 / over.natural_frequency().powi(2);
        let peak_under = under.step_response(&times, 1.0).into_iter().fold(0.0, Scalar::max);
        let peak_over = over.step_response(&times, 1.0).into_iter().fold(0.0, Scalar::max);
        assert!(peak_under > 1.5 * x_ss_under);
        assert!(peak_over <= x_ss_over * (1.0 + 1.0e-12));
    }

    #[test]
    fn rk4_matches_closed_form_step() {
        let sys = with_zeta(0.2);
        let times = linspace(0.0, 5.0e-4, 101);
        let exact = sys.step_response(&times, 1.0);
        let numeric = sys
            .forced_response(&times, |t| if t >= 0.0 { 1.0 } else { 0.0 })
            .expect("integrates");
        let scale = 1.0 / sys.natural_frequency().powi(2);
        for (e, n) in exact.iter().zip(&numeric.displacement) {
            assert!((e - n).abs() < 1.0e-4 * scale, "exact {e}, rk4 {n}");
        }
    }

    #[test]
    fn half_sine_shock_response_is_bounded() {
        let sys = lightly_damped();
        let peak_accel = 100.0 * STANDARD_GRAVITY;
        let times = linspace(0.0, 1.0e-3, 500);
        let shock = half_sine_pulse(peak_accel, 0.5e-3);
        let resp = sys.forced_response(&times, shock).expect("integrates");
        let x_static = peak_accel / sys.natural_frequency().powi(2);
        let peak = resp.peak_displacement();
        assert!(peak > 0.5 * x_static && peak < 2.0 * x_static, "peak {peak}, static {x_static}");
    }

    #[test]
    fn forced_response_rejects_unsorted_times() {
        let sys = lightly_damped();
        assert!(sys.forced_response(&[0.0, 2.0e-4, 1.0e-4], |_| 1.0).is_err());
    }

    #[test]
    fn cutoff_of_butterworth_section_is_natural_frequency() {
        let sys = with_zeta(Scalar::sqrt(0.5));
        assert_relative_eq!(
            sys.cutoff_frequency_hz(),
            sys.natural_frequency_hz(),
            max_relative = 1.0e-12
        );
        assert!(sys.peak_frequency().is_none());
    }
}
