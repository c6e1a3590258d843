//! Ventricular pressure-volume loops and auxiliary series.
//!
//! Samples are independent once the trajectory exists, so these are
//! evaluated in parallel with rayon.

use cf_model::{CirculationModel, STATE_DIM, StateVar};
use cf_sim::Trajectory;
use rayon::prelude::*;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ventricle {
    Left,
    Right,
}

impl Ventricle {
    pub fn volume_var(self) -> StateVar {
        match self {
            Ventricle::Left => StateVar::LeftVentricleVolume,
            Ventricle::Right => StateVar::RightVentricleVolume,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Ventricle::Left => "left",
            Ventricle::Right => "right",
        }
    }

    pub fn parse(s: &str) -> AppResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" | "lv" => Ok(Ventricle::Left),
            "right" | "r" | "rv" => Ok(Ventricle::Right),
            other => Err(AppError::InvalidInput(format!(
                "Unknown ventricle: {other} (expected left or right)"
            ))),
        }
    }

    pub fn source_pressure(self, model: &CirculationModel, t: f64) -> f64 {
        match self {
            Ventricle::Left => model.pressure_left_ventricle(t),
            Ventricle::Right => model.pressure_right_ventricle(t),
        }
    }

    pub fn elastance(self, model: &CirculationModel, t: f64) -> f64 {
        match self {
            Ventricle::Left => model.elastance_left_ventricle(t),
            Ventricle::Right => model.elastance_right_ventricle(t),
        }
    }

    pub fn chamber_pressure(self, model: &CirculationModel, t: f64, volume: f64) -> f64 {
        match self {
            Ventricle::Left => model.chamber_pressure_left(t, volume),
            Ventricle::Right => model.chamber_pressure_right(t, volume),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PvPoint {
    pub t: f64,
    /// cm³
    pub volume: f64,
    /// Isovolumic source pressure `p0 * a(t)` (mmHg).
    pub source_pressure: f64,
    /// Full chamber pressure `p0 * a(t) + e(t) * V` (mmHg).
    pub chamber_pressure: f64,
}

#[derive(Debug, Clone)]
pub struct PvLoop {
    pub ventricle: Ventricle,
    pub points: Vec<PvPoint>,
}

impl PvLoop {
    /// Shoelace area of the chamber-pressure loop (mmHg·cm³), the stroke work
    /// when the samples cover exactly one beat.
    pub fn enclosed_area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let twice: f64 = (0..n)
            .map(|i| {
                let a = &self.points[i];
                let b = &self.points[(i + 1) % n];
                a.volume * b.chamber_pressure - b.volume * a.chamber_pressure
            })
            .sum();
        0.5 * twice.abs()
    }
}

pub fn compute_pv_loop(
    model: &CirculationModel,
    traj: &Trajectory<STATE_DIM>,
    ventricle: Ventricle,
) -> PvLoop {
    let idx = ventricle.volume_var().index();
    let points = traj
        .t
        .par_iter()
        .zip(traj.x.par_iter())
        .map(|(&t, x)| {
            let volume = x[idx];
            PvPoint {
                t,
                volume,
                source_pressure: ventricle.source_pressure(model, t),
                chamber_pressure: ventricle.chamber_pressure(model, t, volume),
            }
        })
        .collect();
    PvLoop { ventricle, points }
}

/// `(t, p0 * a(t))` at each time.
pub fn source_pressure_series(
    model: &CirculationModel,
    times: &[f64],
    ventricle: Ventricle,
) -> Vec<(f64, f64)> {
    times
        .par_iter()
        .map(|&t| (t, ventricle.source_pressure(model, t)))
        .collect()
}

/// `(t, ed + es * a(t))` at each time.
pub fn elastance_series(
    model: &CirculationModel,
    times: &[f64],
    ventricle: Ventricle,
) -> Vec<(f64, f64)> {
    times
        .par_iter()
        .map(|&t| (t, ventricle.elastance(model, t)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_model::{CirculationParams, StateVector, idx};

    fn model() -> CirculationModel {
        CirculationModel::new(CirculationParams::reference()).unwrap()
    }

    #[test]
    fn parse_ventricle() {
        assert_eq!(Ventricle::parse("LV").unwrap(), Ventricle::Left);
        assert_eq!(Ventricle::parse("right").unwrap(), Ventricle::Right);
        assert!(Ventricle::parse("atrium").is_err());
    }

    #[test]
    fn loop_points_follow_samples() {
        let m = model();
        let mut x = StateVector::zeros();
        x[idx::LEFT_VENTRICLE_VOLUME] = 100.0;
        let traj = Trajectory {
            t: vec![0.0, 0.215, 0.6],
            x: vec![x; 3],
        };
        let pv = compute_pv_loop(&m, &traj, Ventricle::Left);
        assert_eq!(pv.points.len(), 3);
        assert_eq!(pv.points[0].source_pressure, 0.0);
        assert!((pv.points[0].chamber_pressure - 10.0).abs() < 1e-12);
        assert!((pv.points[1].source_pressure - 20.0).abs() < 1e-9);
        assert_eq!(pv.points[2].source_pressure, 0.0);
        // Constant volume encloses nothing.
        assert!(pv.enclosed_area().abs() < 1e-9);
    }

    #[test]
    fn square_loop_area() {
        let corners = [(50.0, 10.0), (120.0, 10.0), (120.0, 110.0), (50.0, 110.0)];
        let pv = PvLoop {
            ventricle: Ventricle::Left,
            points: corners
                .iter()
                .enumerate()
                .map(|(i, &(v, p))| PvPoint {
                    t: i as f64,
                    volume: v,
                    source_pressure: 0.0,
                    chamber_pressure: p,
                })
                .collect(),
        };
        assert!((pv.enclosed_area() - 7000.0).abs() < 1e-9);
    }

    #[test]
    fn auxiliary_series_in_order() {
        let m = model();
        let times: Vec<f64> = (0..100).map(|i| i as f64 * 0.009).collect();
        let p = source_pressure_series(&m, &times, Ventricle::Right);
        let e = elastance_series(&m, &times, Ventricle::Right);
        assert_eq!(p.len(), times.len());
        for (i, &t) in times.iter().enumerate() {
            assert_eq!(p[i].0, t);
            assert_eq!(e[i].1, m.elastance_right_ventricle(t));
        }
    }
}
