//! Failure modes of the integration driver.

use std::cell::Cell;

use cf_core::Tolerances;
use cf_sim::{OdeSystem, SimError, SimOptions, run_sim};
use nalgebra::SVector;

/// y' = y², y(0) = 1 blows up at t = 1.
struct BlowUp;

impl OdeSystem<1> for BlowUp {
    fn rhs(&self, _t: f64, y: &SVector<f64, 1>) -> SVector<f64, 1> {
        SVector::<f64, 1>::new(y[0] * y[0])
    }
}

/// Counts evaluations so tests can check that bad inputs never reach the rhs.
struct Counting {
    calls: Cell<usize>,
}

impl OdeSystem<1> for Counting {
    fn rhs(&self, _t: f64, _y: &SVector<f64, 1>) -> SVector<f64, 1> {
        self.calls.set(self.calls.get() + 1);
        SVector::<f64, 1>::new(1.0)
    }
}

#[test]
fn finite_time_blow_up_reports_step_underflow() {
    let y0 = SVector::<f64, 1>::new(1.0);
    let err = run_sim(&BlowUp, &y0, &SimOptions::span(0.0, 2.0)).unwrap_err();

    assert!(err.is_divergence());
    match &err {
        SimError::StepSizeTooSmall { t, h, h_min, state } => {
            assert!(*t > 0.99 && *t < 1.0, "stopped at t = {t}");
            assert!(h < h_min);
            assert_eq!(state.len(), 1);
            assert!(state[0] > 1e3);
        }
        other => panic!("expected StepSizeTooSmall, got {other:?}"),
    }
    let (t, state) = err.last_state().unwrap();
    assert!(t < 1.0 && state[0].is_finite());
}

#[test]
fn step_budget_is_enforced() {
    let sys = |_t: f64, y: &SVector<f64, 2>| SVector::<f64, 2>::new(y[1], -y[0]);
    let opts = SimOptions {
        max_steps: 5,
        ..SimOptions::span(0.0, 100.0)
    };
    let err = run_sim(&sys, &SVector::<f64, 2>::new(1.0, 0.0), &opts).unwrap_err();
    assert!(matches!(err, SimError::MaxStepsExceeded { max_steps: 5, .. }));
    assert!(err.is_divergence());
}

#[test]
fn invalid_eval_times_rejected_before_integration() {
    let sys = Counting {
        calls: Cell::new(0),
    };
    let y0 = SVector::<f64, 1>::new(0.0);

    let decreasing = SimOptions::span(0.0, 1.0).with_t_eval(vec![0.0, 0.6, 0.4]);
    let err = run_sim(&sys, &y0, &decreasing).unwrap_err();
    assert!(matches!(err, SimError::InvalidEvalTimes { index: 2, .. }));

    let outside = SimOptions::span(0.0, 1.0).with_t_eval(vec![0.5, 1.5]);
    let err = run_sim(&sys, &y0, &outside).unwrap_err();
    assert!(matches!(err, SimError::InvalidEvalTimes { index: 1, .. }));
    assert!(!err.is_divergence());

    assert_eq!(sys.calls.get(), 0);
}

#[test]
fn invalid_options_rejected() {
    let sys = Counting {
        calls: Cell::new(0),
    };
    let y0 = SVector::<f64, 1>::new(0.0);

    let backwards = SimOptions::span(1.0, 0.0);
    assert!(matches!(
        run_sim(&sys, &y0, &backwards),
        Err(SimError::InvalidArg { .. })
    ));

    let bad_tol = SimOptions::span(0.0, 1.0).with_tolerances(Tolerances::new(0.0, 1e-6));
    assert!(matches!(run_sim(&sys, &y0, &bad_tol), Err(SimError::Core(_))));

    let nan_state = SVector::<f64, 1>::new(f64::NAN);
    assert!(run_sim(&sys, &nan_state, &SimOptions::span(0.0, 1.0)).is_err());

    assert_eq!(sys.calls.get(), 0);
}

#[test]
fn non_finite_derivative_does_not_yield_a_trajectory() {
    let sys = |t: f64, _y: &SVector<f64, 1>| {
        SVector::<f64, 1>::new(if t > 0.5 { f64::NAN } else { 1.0 })
    };
    let y0 = SVector::<f64, 1>::new(0.0);
    let err = run_sim(&sys, &y0, &SimOptions::span(0.0, 1.0)).unwrap_err();
    assert!(err.is_divergence(), "got {err:?}");
    let (t, _) = err.last_state().unwrap();
    assert!(t <= 0.5);
}

#[test]
fn step_below_time_resolution_reports_underflow() {
    // Near t = 150 one ulp is about 2.8e-14, above the absolute h_min.
    let sys = |_t: f64, _y: &SVector<f64, 1>| SVector::<f64, 1>::new(1.0);
    let y0 = SVector::<f64, 1>::new(0.0);
    let opts = SimOptions {
        h0: Some(1.2e-14),
        ..SimOptions::span(150.0, 150.5)
    };
    assert!(opts.h0.unwrap() > opts.h_min);

    let err = run_sim(&sys, &y0, &opts).unwrap_err();
    match &err {
        SimError::StepSizeTooSmall { t, h, h_min, state } => {
            assert_eq!(*t, 150.0);
            assert!(h < h_min);
            assert!(*h_min >= 10.0 * (150.0f64.next_up() - 150.0));
            assert_eq!(state, &vec![0.0]);
        }
        other => panic!("expected StepSizeTooSmall, got {other:?}"),
    }
}

#[test]
fn late_span_times_strictly_increase() {
    let sys = |_t: f64, _y: &SVector<f64, 1>| SVector::<f64, 1>::new(1.0);
    let y0 = SVector::<f64, 1>::new(0.0);
    let record = run_sim(&sys, &y0, &SimOptions::span(150.0, 150.5)).unwrap();

    assert!(record.trajectory.t.windows(2).all(|w| w[1] > w[0]));
    let (t, y) = record.trajectory.last().unwrap();
    assert_eq!(t, 150.5);
    assert!((y[0] - 0.5).abs() < 1e-12);
}
