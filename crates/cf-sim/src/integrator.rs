//! Embedded Dormand-Prince 5(4) stepper with adaptive step-size control.

use cf_core::Tolerances;
use nalgebra::SVector;

use crate::model::OdeSystem;
use crate::tableau::{A, B, B_ERR, C, ORDER, STAGES};

/// Integration statistics for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Total number of right-hand-side evaluations
    pub rhs_evals: u64,
    /// Number of accepted steps
    pub accepted_steps: u64,
    /// Number of rejected steps
    pub rejected_steps: u64,
}

/// Step-size controller using an I-controller
///
/// h_new = h * clamp(safety * error^(-1/p), min_factor, max_factor)
/// with p = 5 for the Dormand-Prince pair.
#[derive(Clone, Debug)]
pub struct StepController {
    /// Safety factor (0.8-0.9 typical)
    pub safety: f64,
    /// Maximum growth factor per step
    pub max_factor: f64,
    /// Minimum reduction factor per step
    pub min_factor: f64,
    exponent: f64,
}

impl Default for StepController {
    fn default() -> Self {
        Self {
            safety: 0.9,
            max_factor: 10.0,
            min_factor: 0.2,
            exponent: 1.0 / ORDER as f64,
        }
    }
}

impl StepController {
    /// Compute the step size adjustment factor for a normalized error.
    pub fn compute_factor(&self, error: f64) -> f64 {
        if error == 0.0 {
            return self.max_factor;
        }
        if !error.is_finite() {
            return self.min_factor;
        }

        let factor = self.safety * error.powf(-self.exponent);
        factor.clamp(self.min_factor, self.max_factor)
    }

    /// Factor to apply after a step attempt. Growth is suppressed right
    /// after a rejection.
    pub fn next_factor(&self, error: f64, after_rejection: bool) -> f64 {
        let factor = self.compute_factor(error);
        if after_rejection || error > 1.0 {
            factor.min(1.0)
        } else {
            factor
        }
    }
}

/// Result of one step attempt.
#[derive(Debug, Clone)]
pub struct StepOutcome<const N: usize> {
    /// 5th-order solution at `t + h`.
    pub y: SVector<f64, N>,
    /// RMS of the scaled local error; the step is acceptable when `<= 1`.
    pub error: f64,
}

impl<const N: usize> StepOutcome<N> {
    pub fn accepted(&self) -> bool {
        self.error <= 1.0
    }
}

/// Dormand-Prince 5(4) stepper.
///
/// Holds the stage workspace of the most recent attempt so that an accepted
/// step can be turned into a dense-output segment without re-evaluating the
/// right-hand side.
#[derive(Clone, Debug)]
pub struct DormandPrince<const N: usize> {
    tol: Tolerances,
    controller: StepController,
    k: [SVector<f64, N>; STAGES],
    /// Integration statistics
    pub stats: Stats,
}

impl<const N: usize> DormandPrince<N> {
    pub fn new(tol: Tolerances) -> Self {
        Self {
            tol,
            controller: StepController::default(),
            k: [SVector::<f64, N>::zeros(); STAGES],
            stats: Stats::default(),
        }
    }

    pub fn with_controller(mut self, controller: StepController) -> Self {
        self.controller = controller;
        self
    }

    pub fn tolerances(&self) -> Tolerances {
        self.tol
    }

    pub fn controller(&self) -> &StepController {
        &self.controller
    }

    /// Stage derivatives of the last attempt. `stages()[6]` is the FSAL
    /// derivative at the new point.
    pub fn stages(&self) -> &[SVector<f64, N>; STAGES] {
        &self.k
    }

    /// Attempt one step of size `h` from `(t, y)`, where `k1 = f(t, y)`.
    ///
    /// Six new right-hand-side evaluations are made; the first stage is
    /// supplied by the caller (first same as last).
    pub fn attempt<S>(
        &mut self,
        sys: &S,
        t: f64,
        y: &SVector<f64, N>,
        k1: &SVector<f64, N>,
        h: f64,
    ) -> StepOutcome<N>
    where
        S: OdeSystem<N> + ?Sized,
    {
        self.k[0] = *k1;

        for i in 1..STAGES - 1 {
            let mut y_stage = *y;
            for j in 0..i {
                if A[i][j] != 0.0 {
                    y_stage += self.k[j] * (h * A[i][j]);
                }
            }
            self.k[i] = sys.rhs(t + C[i] * h, &y_stage);
        }

        let mut y_new = *y;
        for (i, k) in self.k.iter().enumerate().take(STAGES - 1) {
            if B[i] != 0.0 {
                y_new += k * (h * B[i]);
            }
        }
        self.k[STAGES - 1] = sys.rhs(t + h, &y_new);
        self.stats.rhs_evals += (STAGES - 1) as u64;

        let error = self.error_norm(y, &y_new, h);
        StepOutcome { y: y_new, error }
    }

    /// RMS norm of the embedded error estimate, each component scaled by
    /// `atol + rtol * max(|y|, |y_new|)`.
    fn error_norm(&self, y: &SVector<f64, N>, y_new: &SVector<f64, N>, h: f64) -> f64 {
        if N == 0 {
            return 0.0;
        }
        let mut sum = 0.0;
        for n in 0..N {
            let mut err_n = 0.0;
            for (i, k) in self.k.iter().enumerate() {
                err_n += B_ERR[i] * k[n];
            }
            err_n *= h;

            let scale = self.tol.scale(y[n].abs().max(y_new[n].abs()));
            let scaled = err_n / scale;
            sum += scaled * scaled;
        }
        (sum / N as f64).sqrt()
    }

    /// Starting step size (Hairer, Nørsett & Wanner, section II.4).
    ///
    /// `f0` is `f(t0, y0)`. One extra right-hand-side evaluation is made.
    pub fn initial_step<S>(
        &mut self,
        sys: &S,
        t0: f64,
        y0: &SVector<f64, N>,
        f0: &SVector<f64, N>,
        h_max: f64,
    ) -> f64
    where
        S: OdeSystem<N> + ?Sized,
    {
        if N == 0 {
            return h_max;
        }
        let scale: Vec<f64> = y0.iter().map(|v| self.tol.scale(*v)).collect();
        let rms = |v: &SVector<f64, N>| -> f64 {
            let sum: f64 = v
                .iter()
                .zip(&scale)
                .map(|(x, s)| (x / s) * (x / s))
                .sum();
            (sum / N as f64).sqrt()
        };

        let d0 = rms(y0);
        let d1 = rms(f0);
        let h0 = if d0 < 1e-5 || d1 < 1e-5 {
            1e-6
        } else {
            0.01 * d0 / d1
        }
        .min(h_max);

        let y1 = y0 + f0 * h0;
        let f1 = sys.rhs(t0 + h0, &y1);
        self.stats.rhs_evals += 1;
        let d2 = rms(&(f1 - f0)) / h0;

        let d_max = d1.max(d2);
        let h1 = if d_max <= 1e-15 {
            (h0 * 1e-3).max(1e-6)
        } else {
            (0.01 / d_max).powf(1.0 / ORDER as f64)
        };

        (100.0 * h0).min(h1).min(h_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ExpDecay;

    impl OdeSystem<1> for ExpDecay {
        fn rhs(&self, _t: f64, y: &SVector<f64, 1>) -> SVector<f64, 1> {
            -y
        }
    }

    #[test]
    fn controller_limits() {
        let c = StepController::default();
        assert_eq!(c.compute_factor(0.0), c.max_factor);
        assert_eq!(c.compute_factor(f64::NAN), c.min_factor);
        assert_eq!(c.compute_factor(1e12), c.min_factor);
        assert!(c.compute_factor(1.0) < 1.0);
        assert!(c.next_factor(1e-6, true) <= 1.0);
        assert!(c.next_factor(1e-6, false) > 1.0);
    }

    #[test]
    fn single_step_matches_exponential() {
        let mut dp = DormandPrince::<1>::new(Tolerances::new(1e-12, 1e-10));
        let y0 = SVector::<f64, 1>::new(1.0);
        let k1 = ExpDecay.rhs(0.0, &y0);
        let h = 0.01;
        let out = dp.attempt(&ExpDecay, 0.0, &y0, &k1, h);
        assert!((out.y[0] - (-h).exp()).abs() < 1e-13);
        assert_eq!(dp.stats.rhs_evals, 6);
        // FSAL stage is the derivative at the new point.
        assert_eq!(dp.stages()[STAGES - 1][0], -out.y[0]);
    }

    #[test]
    fn error_estimate_grows_with_step() {
        let mut dp = DormandPrince::<1>::new(Tolerances::new(1e-12, 1e-10));
        let y0 = SVector::<f64, 1>::new(1.0);
        let k1 = ExpDecay.rhs(0.0, &y0);
        let small = dp.attempt(&ExpDecay, 0.0, &y0, &k1, 0.01).error;
        let large = dp.attempt(&ExpDecay, 0.0, &y0, &k1, 0.5).error;
        assert!(large > small);
        assert!(large > 1.0);
    }

    #[test]
    fn initial_step_is_positive_and_bounded() {
        let mut dp = DormandPrince::<1>::new(Tolerances::default());
        let y0 = SVector::<f64, 1>::new(1.0);
        let f0 = ExpDecay.rhs(0.0, &y0);
        let h = dp.initial_step(&ExpDecay, 0.0, &y0, &f0, 0.25);
        assert!(h > 0.0 && h <= 0.25);
    }
}
