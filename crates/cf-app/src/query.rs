//! Query helpers for extracting data from finished runs.

use cf_model::{FLOWS, InitialState, PRESSURES, STATE_DIM, StateVar};
use cf_sim::{Stats, Trajectory};

use crate::error::{AppError, AppResult};
use crate::run_service::RunResponse;

/// Time series of one state variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub key: &'static str,
    pub title: &'static str,
    pub unit: &'static str,
    pub points: Vec<(f64, f64)>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Smallest and largest value, `None` when empty.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.points.iter().map(|&(_, v)| v).fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// Summary of a run's time range and data.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub time_range: (f64, f64),
    pub sample_count: usize,
    pub stats: Stats,
    pub final_state: InitialState,
    /// Total blood volume at the first and last sample (cm³).
    pub volume_range: (f64, f64),
}

pub fn get_run_summary(run: &RunResponse) -> AppResult<RunSummary> {
    let traj = run.trajectory();
    let (Some((t0, x0)), Some((t1, x1))) = (traj.first(), traj.last()) else {
        return Err(AppError::InvalidInput("No samples in run".to_string()));
    };

    Ok(RunSummary {
        time_range: (t0, t1),
        sample_count: traj.len(),
        stats: run.stats(),
        final_state: InitialState::from_vector(x1),
        volume_range: (run.model.total_volume(x0), run.model.total_volume(x1)),
    })
}

/// Every state variable as `(key, unit)`.
pub fn list_variables() -> Vec<(&'static str, &'static str)> {
    StateVar::ALL
        .iter()
        .map(|v| (v.key(), v.unit_label()))
        .collect()
}

pub fn resolve_variable(name: &str) -> AppResult<StateVar> {
    StateVar::parse(name).ok_or_else(|| AppError::UnknownVariable(name.to_string()))
}

pub fn extract_series(traj: &Trajectory<STATE_DIM>, var: StateVar) -> Series {
    Series {
        key: var.key(),
        title: var.title(),
        unit: var.unit_label(),
        points: traj.series(var.index()),
    }
}

pub fn extract_series_by_name(traj: &Trajectory<STATE_DIM>, name: &str) -> AppResult<Series> {
    Ok(extract_series(traj, resolve_variable(name)?))
}

/// The five compartment pressures.
pub fn pressure_series(traj: &Trajectory<STATE_DIM>) -> Vec<Series> {
    PRESSURES.iter().map(|&v| extract_series(traj, v)).collect()
}

/// The four vascular flows.
pub fn flow_series(traj: &Trajectory<STATE_DIM>) -> Vec<Series> {
    FLOWS.iter().map(|&v| extract_series(traj, v)).collect()
}

/// Re-sample a run at arbitrary times through its dense output.
pub fn resample(run: &RunResponse, times: &[f64]) -> AppResult<Trajectory<STATE_DIM>> {
    let dense = run.record.dense.as_ref().ok_or_else(|| {
        AppError::InvalidInput("run was made without dense output".to_string())
    })?;
    let x = dense.eval_many(times)?;
    Ok(Trajectory {
        t: times.to_vec(),
        x,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_model::StateVector;

    fn toy() -> Trajectory<STATE_DIM> {
        let mut a = StateVector::zeros();
        a[0] = 80.0;
        a[1] = 5.0;
        let mut b = a;
        b[0] = 120.0;
        b[1] = -2.0;
        Trajectory {
            t: vec![0.0, 0.5],
            x: vec![a, b],
        }
    }

    #[test]
    fn series_by_name() {
        let s = extract_series_by_name(&toy(), "aortic_pressure").unwrap();
        assert_eq!(s.unit, "mmHg");
        assert_eq!(s.points, vec![(0.0, 80.0), (0.5, 120.0)]);
        assert_eq!(s.range(), Some((80.0, 120.0)));
        assert!(matches!(
            extract_series_by_name(&toy(), "stroke_volume"),
            Err(AppError::UnknownVariable(_))
        ));
    }

    #[test]
    fn grouped_series() {
        let p = pressure_series(&toy());
        let f = flow_series(&toy());
        assert_eq!(p.len(), 5);
        assert_eq!(f.len(), 4);
        assert_eq!(f[0].key, "arterial_systemic_flow");
        assert_eq!(f[0].points[1], (0.5, -2.0));
        assert_eq!(list_variables().len(), STATE_DIM);
    }
}
