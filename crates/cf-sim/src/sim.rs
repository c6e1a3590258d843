//! Simulation runner and result recording.

use cf_core::Tolerances;
use nalgebra::SVector;

use crate::dense::{DenseSegment, DenseSolution};
use crate::error::{SimError, SimResult};
use crate::integrator::{DormandPrince, Stats};
use crate::model::OdeSystem;
use crate::tableau::STAGES;

/// Options for simulation runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Initial time (seconds)
    pub t_start: f64,
    /// Final simulation time (seconds)
    pub t_end: f64,
    /// Component-wise absolute/relative error tolerance
    pub tol: Tolerances,
    /// Initial step size; chosen automatically when `None`
    pub h0: Option<f64>,
    /// Smallest step the controller may take before giving up. Raised to
    /// ten ulps of the current time where that is larger.
    pub h_min: f64,
    /// Largest step the controller may take
    pub h_max: f64,
    /// Maximum number of step attempts (safety limit)
    pub max_steps: usize,
    /// Strictly increasing output times inside `[t_start, t_end]`.
    /// When `None`, every accepted step is recorded.
    pub t_eval: Option<Vec<f64>>,
    /// Keep the piecewise interpolant for later queries
    pub dense_output: bool,
    /// Emit a progress callback every N accepted steps
    pub progress_every: usize,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            t_start: 0.0,
            t_end: 1.0,
            tol: Tolerances::default(),
            h0: None,
            h_min: 1e-14,
            h_max: f64::INFINITY,
            max_steps: 5_000_000,
            t_eval: None,
            dense_output: true,
            progress_every: 1_000,
        }
    }
}

impl SimOptions {
    pub fn span(t_start: f64, t_end: f64) -> Self {
        Self {
            t_start,
            t_end,
            ..Self::default()
        }
    }

    pub fn with_t_eval(mut self, t_eval: Vec<f64>) -> Self {
        self.t_eval = Some(t_eval);
        self
    }

    pub fn with_tolerances(mut self, tol: Tolerances) -> Self {
        self.tol = tol;
        self
    }

    fn validate<const N: usize>(&self, y0: &SVector<f64, N>) -> SimResult<()> {
        if !self.t_start.is_finite() || !self.t_end.is_finite() {
            return Err(SimError::InvalidArg {
                what: "t_start and t_end must be finite",
            });
        }
        if self.t_end < self.t_start {
            return Err(SimError::InvalidArg {
                what: "t_end must not precede t_start",
            });
        }
        if !y0.iter().all(|v| v.is_finite()) {
            return Err(SimError::InvalidArg {
                what: "initial state must be finite",
            });
        }
        self.tol.validate()?;
        if self.max_steps == 0 {
            return Err(SimError::InvalidArg {
                what: "max_steps must be positive",
            });
        }
        if !self.h_min.is_finite() || self.h_min < 0.0 {
            return Err(SimError::InvalidArg {
                what: "h_min must be finite and non-negative",
            });
        }
        if !(self.h_max > 0.0) || self.h_max < self.h_min {
            return Err(SimError::InvalidArg {
                what: "h_max must be positive and at least h_min",
            });
        }
        if let Some(h0) = self.h0 {
            if !h0.is_finite() || h0 <= 0.0 {
                return Err(SimError::InvalidArg {
                    what: "h0 must be finite and positive",
                });
            }
        }
        if let Some(times) = &self.t_eval {
            validate_eval_times(times, self.t_start, self.t_end)?;
        }
        Ok(())
    }
}

/// Reject non-finite, out-of-span or non-increasing output times.
pub fn validate_eval_times(times: &[f64], t_start: f64, t_end: f64) -> SimResult<()> {
    for (index, &t) in times.iter().enumerate() {
        if !t.is_finite() {
            return Err(SimError::InvalidEvalTimes {
                index,
                t,
                reason: "not finite",
            });
        }
        if t < t_start || t > t_end {
            return Err(SimError::InvalidEvalTimes {
                index,
                t,
                reason: "outside the integration span",
            });
        }
        if index > 0 && t <= times[index - 1] {
            return Err(SimError::InvalidEvalTimes {
                index,
                t,
                reason: "not strictly increasing",
            });
        }
    }
    Ok(())
}

/// `samples` evenly spaced times from `t_start` to `t_end`, both included.
pub fn uniform_grid(t_start: f64, t_end: f64, samples: usize) -> SimResult<Vec<f64>> {
    if samples == 0 {
        return Err(SimError::InvalidArg {
            what: "sample count must be positive",
        });
    }
    if !(t_end >= t_start) {
        return Err(SimError::InvalidArg {
            what: "t_end must not precede t_start",
        });
    }
    if samples == 1 {
        return Ok(vec![t_start]);
    }
    if t_end == t_start {
        return Err(SimError::InvalidArg {
            what: "more than one sample needs a non-empty span",
        });
    }
    let dt = (t_end - t_start) / (samples - 1) as f64;
    let mut grid: Vec<f64> = (0..samples).map(|i| t_start + dt * i as f64).collect();
    // Pin the last point to avoid accumulated rounding past t_end.
    grid[samples - 1] = t_end;
    Ok(grid)
}

/// Time-ordered samples of the state.
#[derive(Clone, Debug, Default)]
pub struct Trajectory<const N: usize> {
    /// Time points (seconds)
    pub t: Vec<f64>,
    /// State snapshots
    pub x: Vec<SVector<f64, N>>,
}

impl<const N: usize> Trajectory<N> {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    fn push(&mut self, t: f64, x: SVector<f64, N>) {
        self.t.push(t);
        self.x.push(x);
    }

    /// Values of one state component over time.
    pub fn component(&self, index: usize) -> Vec<f64> {
        self.x.iter().map(|x| x[index]).collect()
    }

    /// `(t, value)` pairs of one state component.
    pub fn series(&self, index: usize) -> Vec<(f64, f64)> {
        self.t
            .iter()
            .zip(&self.x)
            .map(|(&t, x)| (t, x[index]))
            .collect()
    }

    /// Samples with `t_from <= t <= t_to`.
    pub fn window(&self, t_from: f64, t_to: f64) -> Trajectory<N> {
        let mut out = Trajectory::default();
        for (&t, x) in self.t.iter().zip(&self.x) {
            if t >= t_from && t <= t_to {
                out.push(t, *x);
            }
        }
        out
    }

    pub fn first(&self) -> Option<(f64, &SVector<f64, N>)> {
        Some((*self.t.first()?, self.x.first()?))
    }

    pub fn last(&self) -> Option<(f64, &SVector<f64, N>)> {
        Some((*self.t.last()?, self.x.last()?))
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, &SVector<f64, N>)> {
        self.t.iter().copied().zip(self.x.iter())
    }
}

/// Record of simulation results.
#[derive(Clone, Debug)]
pub struct SimRecord<const N: usize> {
    pub trajectory: Trajectory<N>,
    /// Continuous solution, present when `SimOptions::dense_output` is set
    pub dense: Option<DenseSolution<N>>,
    pub stats: Stats,
}

/// Progress snapshot passed to the callback of [`run_sim_with_progress`].
#[derive(Clone, Copy, Debug)]
pub struct SimProgress {
    pub t: f64,
    pub t_end: f64,
    pub fraction_complete: f64,
    pub stats: Stats,
}

/// Integrate `sys` from `opts.t_start` to `opts.t_end` starting at `y0`.
pub fn run_sim<S, const N: usize>(
    sys: &S,
    y0: &SVector<f64, N>,
    opts: &SimOptions,
) -> SimResult<SimRecord<N>>
where
    S: OdeSystem<N> + ?Sized,
{
    run_sim_with_progress(sys, y0, opts, None)
}

/// [`run_sim`] with an optional progress callback.
pub fn run_sim_with_progress<S, const N: usize>(
    sys: &S,
    y0: &SVector<f64, N>,
    opts: &SimOptions,
    mut progress: Option<&mut dyn FnMut(SimProgress)>,
) -> SimResult<SimRecord<N>>
where
    S: OdeSystem<N> + ?Sized,
{
    opts.validate(y0)?;

    let t_end = opts.t_end;
    let mut t = opts.t_start;
    let mut y = *y0;

    let eval_times: &[f64] = opts.t_eval.as_deref().unwrap_or(&[]);
    let sample_every_step = opts.t_eval.is_none();
    let mut next_eval = 0usize;

    let mut trajectory = Trajectory::default();
    let mut dense = DenseSolution::new(t, y);

    if sample_every_step {
        trajectory.push(t, y);
    }
    while next_eval < eval_times.len() && eval_times[next_eval] == t {
        trajectory.push(t, y);
        next_eval += 1;
    }

    let mut stepper = DormandPrince::<N>::new(opts.tol);

    tracing::debug!(
        t_start = opts.t_start,
        t_end,
        atol = opts.tol.abs,
        rtol = opts.tol.rel,
        "starting integration"
    );

    if t == t_end {
        return Ok(SimRecord {
            trajectory,
            dense: opts.dense_output.then_some(dense),
            stats: stepper.stats,
        });
    }

    let mut k1 = sys.rhs(t, &y);
    stepper.stats.rhs_evals += 1;

    let span = t_end - t;
    let h_max = opts.h_max.min(span);
    let mut h = match opts.h0 {
        Some(h0) => h0.min(h_max),
        None => stepper.initial_step(sys, t, &y, &k1, h_max),
    };
    let controller = stepper.controller().clone();
    let mut after_rejection = false;
    let mut attempts = 0usize;

    while t < t_end {
        if attempts >= opts.max_steps {
            tracing::warn!(t, max_steps = opts.max_steps, "step budget exhausted");
            return Err(SimError::MaxStepsExceeded {
                max_steps: opts.max_steps,
                t,
                state: y.iter().copied().collect(),
            });
        }
        attempts += 1;

        let mut h_try = h.min(h_max);
        let last = t + h_try >= t_end;
        // A step must also be resolvable in `t`, or time stalls while the state moves.
        let h_floor = opts.h_min.max(10.0 * (t.next_up() - t));
        if last {
            h_try = t_end - t;
        } else if h_try < h_floor {
            tracing::warn!(t, h = h_try, h_min = h_floor, "step size underflow");
            return Err(SimError::StepSizeTooSmall {
                t,
                h: h_try,
                h_min: h_floor,
                state: y.iter().copied().collect(),
            });
        }

        let outcome = stepper.attempt(sys, t, &y, &k1, h_try);

        if outcome.accepted() {
            let t_new = if last { t_end } else { t + h_try };
            if !outcome.y.iter().all(|v| v.is_finite()) {
                tracing::warn!(t = t_new, "non-finite state");
                return Err(SimError::NonFinite {
                    t,
                    state: y.iter().copied().collect(),
                });
            }
            stepper.stats.accepted_steps += 1;

            let segment = DenseSegment::new(t, t_new, y, outcome.y, stepper.stages());
            while next_eval < eval_times.len() && eval_times[next_eval] <= t_new {
                let te = eval_times[next_eval];
                trajectory.push(te, segment.eval(te));
                next_eval += 1;
            }
            if sample_every_step {
                trajectory.push(t_new, outcome.y);
            }
            if opts.dense_output {
                dense.push(segment);
            }

            t = t_new;
            y = outcome.y;
            k1 = stepper.stages()[STAGES - 1];

            h = h_try * controller.next_factor(outcome.error, after_rejection);
            after_rejection = false;

            if let Some(cb) = progress.as_deref_mut() {
                let accepted = stepper.stats.accepted_steps;
                if opts.progress_every > 0 && accepted % opts.progress_every as u64 == 0 {
                    cb(SimProgress {
                        t,
                        t_end,
                        fraction_complete: (t - opts.t_start) / span,
                        stats: stepper.stats,
                    });
                }
            }
        } else {
            stepper.stats.rejected_steps += 1;
            h = h_try * controller.next_factor(outcome.error, true);
            after_rejection = true;
            tracing::trace!(t, h_try, error = outcome.error, "step rejected");
        }
    }

    if let Some(cb) = progress.as_deref_mut() {
        cb(SimProgress {
            t,
            t_end,
            fraction_complete: 1.0,
            stats: stepper.stats,
        });
    }

    tracing::debug!(
        accepted = stepper.stats.accepted_steps,
        rejected = stepper.stats.rejected_steps,
        rhs_evals = stepper.stats.rhs_evals,
        samples = trajectory.len(),
        "integration finished"
    );

    Ok(SimRecord {
        trajectory,
        dense: opts.dense_output.then_some(dense),
        stats: stepper.stats,
    })
}
