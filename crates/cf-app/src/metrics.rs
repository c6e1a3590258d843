//! Per-beat ventricular metrics.
//!
//! Groups trajectory samples by cardiac cycle and reports the classic
//! volume indices. Comparing consecutive beats shows whether the run has
//! reached its periodic regime.

use cf_core::{FlowRate, Pressure, Ratio, Volume, cm3, cm3ps, mmhg, to_l_per_min, unitless};
use cf_model::{CirculationModel, STATE_DIM, StateVar};
use cf_sim::Trajectory;
use serde::{Deserialize, Serialize};

use crate::pv_loop::Ventricle;

/// Fraction of a period a beat may miss at either end and still count.
const COVERAGE_SLACK: f64 = 0.05;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BeatMetrics {
    /// Zero-based cycle number
    pub beat: i64,
    pub t_start_s: f64,
    pub t_end_s: f64,
    /// Largest ventricular volume in the beat (cm³)
    pub end_diastolic_volume: f64,
    /// Smallest ventricular volume in the beat (cm³)
    pub end_systolic_volume: f64,
    pub stroke_volume: f64,
    pub ejection_fraction: f64,
    /// Peak of `p0 * a(t)` over the beat's samples (mmHg)
    pub peak_source_pressure: f64,
    /// Peak chamber pressure (mmHg)
    pub peak_chamber_pressure: f64,
    /// Systolic / diastolic pressure of the outflow artery (mmHg)
    pub outflow_pressure_max: f64,
    pub outflow_pressure_min: f64,
}

impl BeatMetrics {
    pub fn stroke_volume_q(&self) -> Volume {
        cm3(self.stroke_volume)
    }

    pub fn ejection_fraction_q(&self) -> Ratio {
        unitless(self.ejection_fraction)
    }

    pub fn peak_chamber_pressure_q(&self) -> Pressure {
        mmhg(self.peak_chamber_pressure)
    }

    /// Stroke volume delivered once per period.
    pub fn cardiac_output(&self) -> FlowRate {
        cm3ps(self.stroke_volume / (self.t_end_s - self.t_start_s))
    }

    pub fn cardiac_output_l_per_min(&self) -> f64 {
        to_l_per_min(self.cardiac_output())
    }
}

fn outflow_var(ventricle: Ventricle) -> StateVar {
    match ventricle {
        Ventricle::Left => StateVar::AorticPressure,
        Ventricle::Right => StateVar::PulmonaryArteryPressure,
    }
}

/// Metrics of every beat the trajectory covers completely.
pub fn compute_beat_metrics(
    model: &CirculationModel,
    traj: &Trajectory<STATE_DIM>,
    ventricle: Ventricle,
) -> Vec<BeatMetrics> {
    let cycle = model.cycle();
    let period = cycle.period();
    let vol_idx = ventricle.volume_var().index();
    let out_idx = outflow_var(ventricle).index();

    let mut out = Vec::new();
    let mut i = 0;
    while i < traj.len() {
        let beat = cycle.beat_index(traj.t[i]);
        let mut j = i;
        while j < traj.len() && cycle.beat_index(traj.t[j]) == beat {
            j += 1;
        }

        let t_start = beat as f64 * period;
        let t_end = t_start + period;
        let first = traj.t[i];
        let last = traj.t[j - 1];
        let covered = first - t_start <= COVERAGE_SLACK * period
            && t_end - last <= COVERAGE_SLACK * period
            && j - i >= 3;

        if covered {
            let mut m = BeatMetrics {
                beat,
                t_start_s: t_start,
                t_end_s: t_end,
                end_diastolic_volume: f64::NEG_INFINITY,
                end_systolic_volume: f64::INFINITY,
                peak_source_pressure: f64::NEG_INFINITY,
                peak_chamber_pressure: f64::NEG_INFINITY,
                outflow_pressure_max: f64::NEG_INFINITY,
                outflow_pressure_min: f64::INFINITY,
                ..BeatMetrics::default()
            };
            for k in i..j {
                let t = traj.t[k];
                let x = &traj.x[k];
                let v = x[vol_idx];
                m.end_diastolic_volume = m.end_diastolic_volume.max(v);
                m.end_systolic_volume = m.end_systolic_volume.min(v);
                m.peak_source_pressure = m
                    .peak_source_pressure
                    .max(ventricle.source_pressure(model, t));
                m.peak_chamber_pressure = m
                    .peak_chamber_pressure
                    .max(ventricle.chamber_pressure(model, t, v));
                m.outflow_pressure_max = m.outflow_pressure_max.max(x[out_idx]);
                m.outflow_pressure_min = m.outflow_pressure_min.min(x[out_idx]);
            }
            m.stroke_volume = m.end_diastolic_volume - m.end_systolic_volume;
            m.ejection_fraction = if m.end_diastolic_volume > 0.0 {
                m.stroke_volume / m.end_diastolic_volume
            } else {
                0.0
            };
            out.push(m);
        } else {
            tracing::debug!(beat, samples = j - i, "skipping partially covered beat");
        }

        i = j;
    }
    out
}

/// Relative change of end-diastolic volume between the last two beats.
pub fn periodic_drift(metrics: &[BeatMetrics]) -> Option<f64> {
    let [.., prev, last] = metrics else {
        return None;
    };
    let scale = last.end_diastolic_volume.abs().max(f64::MIN_POSITIVE);
    Some((last.end_diastolic_volume - prev.end_diastolic_volume).abs() / scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_model::{CirculationParams, StateVector, idx};

    fn synthetic(beats: usize, per_beat: usize, tc: f64) -> Trajectory<STATE_DIM> {
        let mut traj = Trajectory::default();
        let n = beats * per_beat;
        for k in 0..=n {
            let t = k as f64 * tc / per_beat as f64;
            let phase = 2.0 * std::f64::consts::PI * t / tc;
            let mut x = StateVector::zeros();
            x[idx::LEFT_VENTRICLE_VOLUME] = 85.0 + 35.0 * phase.cos();
            x[idx::AORTIC_PRESSURE] = 90.0 - 25.0 * phase.cos();
            traj.t.push(t);
            traj.x.push(x);
        }
        traj
    }

    #[test]
    fn volumes_from_synthetic_beats() {
        let model = CirculationModel::new(CirculationParams::reference()).unwrap();
        let traj = synthetic(3, 90, 0.9);
        let beats = compute_beat_metrics(&model, &traj, Ventricle::Left);

        // A lone sample at t = 2.7 cannot form a fourth beat.
        assert_eq!(beats.len(), 3);
        for (k, b) in beats.iter().enumerate() {
            assert_eq!(b.beat, k as i64);
            assert!((b.end_diastolic_volume - 120.0).abs() < 1e-9);
            assert!((b.end_systolic_volume - 50.0).abs() < 1e-9);
            assert!((b.stroke_volume - 70.0).abs() < 1e-9);
            assert!((b.ejection_fraction - 70.0 / 120.0).abs() < 1e-9);
            assert!((b.outflow_pressure_max - 115.0).abs() < 1e-9);
            assert!((b.peak_source_pressure - 20.0).abs() < 0.1);
        }
        // 70 cm³ every 0.9 s.
        assert!((beats[0].cardiac_output_l_per_min() - 4.666_666).abs() < 1e-3);
        assert!(periodic_drift(&beats).unwrap() < 1e-12);
    }

    #[test]
    fn partial_beats_are_skipped() {
        let model = CirculationModel::new(CirculationParams::reference()).unwrap();
        let full = synthetic(2, 90, 0.9);
        let half = full.window(0.45, 1.8);
        let beats = compute_beat_metrics(&model, &half, Ventricle::Left);
        assert_eq!(beats.len(), 1);
        assert_eq!(beats[0].beat, 1);
        assert_eq!(periodic_drift(&beats), None);
    }
}
