//! Closed-loop circulation right-hand side.

use cf_sim::OdeSystem;

use crate::activation::CardiacCycle;
use crate::error::ModelResult;
use crate::params::CirculationParams;
use crate::state::{STATE_DIM, StateVector, idx};
use crate::valve::{Valve, ValveSet, ValveState};

/// Twelve-state lumped model of the heart and both circulations.
///
/// Ventricles are time-varying elastance chambers, the vascular beds are
/// compliance / inertance / resistance ladders and the valves are ideal
/// diodes in series with a resistance. The model holds no mutable state, so
/// `derivative` may be called with repeated or non-monotonic times.
#[derive(Clone, Debug)]
pub struct CirculationModel {
    params: CirculationParams,
    cycle: CardiacCycle,
}

impl CirculationModel {
    pub fn new(params: CirculationParams) -> ModelResult<Self> {
        params.validate()?;
        let cycle = CardiacCycle::new(params.tc)?;
        Ok(Self { params, cycle })
    }

    pub fn params(&self) -> &CirculationParams {
        &self.params
    }

    pub fn cycle(&self) -> &CardiacCycle {
        &self.cycle
    }

    pub fn activation(&self, t: f64) -> f64 {
        self.cycle.activation(t)
    }

    /// Isovolumic pressure source of the left ventricle, `p0_l * a(t)`.
    pub fn pressure_left_ventricle(&self, t: f64) -> f64 {
        self.params.p0_l * self.activation(t)
    }

    pub fn pressure_right_ventricle(&self, t: f64) -> f64 {
        self.params.p0_r * self.activation(t)
    }

    /// `ed_l + es_l * a(t)`.
    pub fn elastance_left_ventricle(&self, t: f64) -> f64 {
        self.params.ed_l + self.params.es_l * self.activation(t)
    }

    pub fn elastance_right_ventricle(&self, t: f64) -> f64 {
        self.params.ed_r + self.params.es_r * self.activation(t)
    }

    /// Left chamber pressure for a given ventricular volume.
    pub fn chamber_pressure_left(&self, t: f64, volume: f64) -> f64 {
        let a = self.activation(t);
        left_pressure(&self.params, a, volume)
    }

    pub fn chamber_pressure_right(&self, t: f64, volume: f64) -> f64 {
        let a = self.activation(t);
        right_pressure(&self.params, a, volume)
    }

    pub fn valve_states(&self, t: f64, x: &StateVector) -> ValveSet {
        self.valves_at(self.activation(t), x)
    }

    fn valves_at(&self, a: f64, x: &StateVector) -> ValveSet {
        let p = &self.params;
        let p_lv = left_pressure(p, a, x[idx::LEFT_VENTRICLE_VOLUME]);
        let p_rv = right_pressure(p, a, x[idx::RIGHT_VENTRICLE_VOLUME]);

        ValveSet {
            aortic: ValveState::new(
                Valve::Aortic,
                p_lv - x[idx::AORTIC_PRESSURE],
                p.reflux,
                p.r_l + p.r1,
            ),
            tricuspid: ValveState::new(
                Valve::Tricuspid,
                x[idx::RIGHT_ATRIAL_PRESSURE] - p_rv,
                0.0,
                p.r4,
            ),
            pulmonary: ValveState::new(
                Valve::Pulmonary,
                p_rv - x[idx::PULMONARY_ARTERY_PRESSURE],
                0.0,
                p.r_r + p.r5,
            ),
            mitral: ValveState::new(
                Valve::Mitral,
                x[idx::LEFT_ATRIAL_PRESSURE] - p_lv,
                0.0,
                p.r8,
            ),
        }
    }

    /// Time derivative of the state.
    pub fn derivative(&self, t: f64, x: &StateVector) -> StateVector {
        let p = &self.params;
        let valves = self.valves_at(self.activation(t), x);
        let q1 = valves.aortic.flow;
        let q2 = valves.tricuspid.flow;
        let q3 = valves.pulmonary.flow;
        let q4 = valves.mitral.flow;

        let mut dx = StateVector::zeros();
        dx[idx::AORTIC_PRESSURE] = (q1 - x[idx::ARTERIAL_SYSTEMIC_FLOW]) / p.c1;
        dx[idx::ARTERIAL_SYSTEMIC_FLOW] = (x[idx::AORTIC_PRESSURE]
            - p.r2 * x[idx::ARTERIAL_SYSTEMIC_FLOW]
            - x[idx::SYSTEMIC_PRESSURE])
            / p.l1;
        dx[idx::SYSTEMIC_PRESSURE] =
            (x[idx::ARTERIAL_SYSTEMIC_FLOW] - x[idx::VENOUS_SYSTEMIC_FLOW]) / p.c2;
        dx[idx::VENOUS_SYSTEMIC_FLOW] = (x[idx::SYSTEMIC_PRESSURE]
            - p.r3 * x[idx::VENOUS_SYSTEMIC_FLOW]
            - x[idx::RIGHT_ATRIAL_PRESSURE])
            / p.l2;
        dx[idx::RIGHT_ATRIAL_PRESSURE] = (x[idx::VENOUS_SYSTEMIC_FLOW] - q2) / p.c3;
        dx[idx::RIGHT_VENTRICLE_VOLUME] = q2 - q3;
        dx[idx::PULMONARY_ARTERY_PRESSURE] = (q3 - x[idx::ARTERIAL_PULMONARY_FLOW]) / p.c4;
        dx[idx::ARTERIAL_PULMONARY_FLOW] = (x[idx::PULMONARY_ARTERY_PRESSURE]
            - p.r6 * x[idx::ARTERIAL_PULMONARY_FLOW]
            - x[idx::PULMONARY_PRESSURE])
            / p.l3;
        dx[idx::PULMONARY_PRESSURE] =
            (x[idx::ARTERIAL_PULMONARY_FLOW] - x[idx::VENOUS_PULMONARY_FLOW]) / p.c5;
        dx[idx::VENOUS_PULMONARY_FLOW] = (x[idx::PULMONARY_PRESSURE]
            - p.r7 * x[idx::VENOUS_PULMONARY_FLOW]
            - x[idx::LEFT_ATRIAL_PRESSURE])
            / p.l4;
        dx[idx::LEFT_ATRIAL_PRESSURE] = (x[idx::VENOUS_PULMONARY_FLOW] - q4) / p.c6;
        dx[idx::LEFT_VENTRICLE_VOLUME] = q4 - q1;
        dx
    }

    /// Blood volume held by all compartments (cm³).
    pub fn total_volume(&self, x: &StateVector) -> f64 {
        let p = &self.params;
        p.c1 * x[idx::AORTIC_PRESSURE]
            + p.c2 * x[idx::SYSTEMIC_PRESSURE]
            + p.c3 * x[idx::RIGHT_ATRIAL_PRESSURE]
            + x[idx::RIGHT_VENTRICLE_VOLUME]
            + p.c4 * x[idx::PULMONARY_ARTERY_PRESSURE]
            + p.c5 * x[idx::PULMONARY_PRESSURE]
            + p.c6 * x[idx::LEFT_ATRIAL_PRESSURE]
            + x[idx::LEFT_VENTRICLE_VOLUME]
    }
}

impl OdeSystem<STATE_DIM> for CirculationModel {
    fn rhs(&self, t: f64, x: &StateVector) -> StateVector {
        self.derivative(t, x)
    }
}

#[inline]
fn left_pressure(p: &CirculationParams, a: f64, volume: f64) -> f64 {
    p.p0_l * a + (p.ed_l + p.es_l * a) * volume
}

#[inline]
fn right_pressure(p: &CirculationParams, a: f64, volume: f64) -> f64 {
    p.p0_r * a + (p.ed_r + p.es_r * a) * volume
}
