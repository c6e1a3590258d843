//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered during integration.
///
/// Divergence variants carry the last accepted time and state so callers
/// can report where the run stopped.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invalid evaluation time t_eval[{index}] = {t}: {reason}")]
    InvalidEvalTimes {
        index: usize,
        t: f64,
        reason: &'static str,
    },

    #[error("Step size {h:e} fell below the minimum {h_min:e} at t = {t}")]
    StepSizeTooSmall {
        t: f64,
        h: f64,
        h_min: f64,
        state: Vec<f64>,
    },

    #[error("Exceeded {max_steps} integration steps at t = {t}")]
    MaxStepsExceeded {
        max_steps: usize,
        t: f64,
        state: Vec<f64>,
    },

    #[error("Non-finite state in step starting at t = {t}")]
    NonFinite { t: f64, state: Vec<f64> },

    #[error("Time {t} is outside the integrated span [{t_min}, {t_max}]")]
    OutOfRange { t: f64, t_min: f64, t_max: f64 },

    #[error(transparent)]
    Core(#[from] cf_core::CoreError),
}

impl SimError {
    /// True for the failures that mean the integrator could not meet its
    /// tolerance (as opposed to bad inputs).
    pub fn is_divergence(&self) -> bool {
        matches!(
            self,
            SimError::StepSizeTooSmall { .. }
                | SimError::MaxStepsExceeded { .. }
                | SimError::NonFinite { .. }
        )
    }

    /// Last accepted time and state, for divergence failures.
    pub fn last_state(&self) -> Option<(f64, &[f64])> {
        match self {
            SimError::StepSizeTooSmall { t, state, .. }
            | SimError::MaxStepsExceeded { t, state, .. }
            | SimError::NonFinite { t, state } => Some((*t, state.as_slice())),
            _ => None,
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
