//! State vector layout.

use cf_core::ensure_finite;
use nalgebra::SVector;

use crate::error::{ModelError, ModelResult};

pub const STATE_DIM: usize = 12;

/// Positional state of the circuit.
pub type StateVector = SVector<f64, STATE_DIM>;

/// Named positions within [`StateVector`].
pub mod idx {
    pub const AORTIC_PRESSURE: usize = 0;
    pub const ARTERIAL_SYSTEMIC_FLOW: usize = 1;
    pub const SYSTEMIC_PRESSURE: usize = 2;
    pub const VENOUS_SYSTEMIC_FLOW: usize = 3;
    pub const RIGHT_ATRIAL_PRESSURE: usize = 4;
    pub const RIGHT_VENTRICLE_VOLUME: usize = 5;
    pub const PULMONARY_ARTERY_PRESSURE: usize = 6;
    pub const ARTERIAL_PULMONARY_FLOW: usize = 7;
    pub const PULMONARY_PRESSURE: usize = 8;
    pub const VENOUS_PULMONARY_FLOW: usize = 9;
    pub const LEFT_ATRIAL_PRESSURE: usize = 10;
    pub const LEFT_VENTRICLE_VOLUME: usize = 11;
}

/// Physical kind of a state variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quantity {
    Pressure,
    Flow,
    Volume,
}

impl Quantity {
    pub fn unit_label(self) -> &'static str {
        match self {
            Quantity::Pressure => "mmHg",
            Quantity::Flow => "cm³/s",
            Quantity::Volume => "cm³",
        }
    }
}

/// One component of the state vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateVar {
    AorticPressure,
    ArterialSystemicFlow,
    SystemicPressure,
    VenousSystemicFlow,
    RightAtrialPressure,
    RightVentricleVolume,
    PulmonaryArteryPressure,
    ArterialPulmonaryFlow,
    PulmonaryPressure,
    VenousPulmonaryFlow,
    LeftAtrialPressure,
    LeftVentricleVolume,
}

/// Compartment pressures, in state order.
pub const PRESSURES: [StateVar; 5] = [
    StateVar::AorticPressure,
    StateVar::SystemicPressure,
    StateVar::RightAtrialPressure,
    StateVar::PulmonaryArteryPressure,
    StateVar::PulmonaryPressure,
];

/// Inductor flows, in state order.
pub const FLOWS: [StateVar; 4] = [
    StateVar::ArterialSystemicFlow,
    StateVar::VenousSystemicFlow,
    StateVar::ArterialPulmonaryFlow,
    StateVar::VenousPulmonaryFlow,
];

impl StateVar {
    pub const ALL: [StateVar; STATE_DIM] = [
        StateVar::AorticPressure,
        StateVar::ArterialSystemicFlow,
        StateVar::SystemicPressure,
        StateVar::VenousSystemicFlow,
        StateVar::RightAtrialPressure,
        StateVar::RightVentricleVolume,
        StateVar::PulmonaryArteryPressure,
        StateVar::ArterialPulmonaryFlow,
        StateVar::PulmonaryPressure,
        StateVar::VenousPulmonaryFlow,
        StateVar::LeftAtrialPressure,
        StateVar::LeftVentricleVolume,
    ];

    pub const fn index(self) -> usize {
        match self {
            StateVar::AorticPressure => idx::AORTIC_PRESSURE,
            StateVar::ArterialSystemicFlow => idx::ARTERIAL_SYSTEMIC_FLOW,
            StateVar::SystemicPressure => idx::SYSTEMIC_PRESSURE,
            StateVar::VenousSystemicFlow => idx::VENOUS_SYSTEMIC_FLOW,
            StateVar::RightAtrialPressure => idx::RIGHT_ATRIAL_PRESSURE,
            StateVar::RightVentricleVolume => idx::RIGHT_VENTRICLE_VOLUME,
            StateVar::PulmonaryArteryPressure => idx::PULMONARY_ARTERY_PRESSURE,
            StateVar::ArterialPulmonaryFlow => idx::ARTERIAL_PULMONARY_FLOW,
            StateVar::PulmonaryPressure => idx::PULMONARY_PRESSURE,
            StateVar::VenousPulmonaryFlow => idx::VENOUS_PULMONARY_FLOW,
            StateVar::LeftAtrialPressure => idx::LEFT_ATRIAL_PRESSURE,
            StateVar::LeftVentricleVolume => idx::LEFT_VENTRICLE_VOLUME,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Snake-case key used in project files and on the command line.
    pub const fn key(self) -> &'static str {
        match self {
            StateVar::AorticPressure => "aortic_pressure",
            StateVar::ArterialSystemicFlow => "arterial_systemic_flow",
            StateVar::SystemicPressure => "systemic_pressure",
            StateVar::VenousSystemicFlow => "venous_systemic_flow",
            StateVar::RightAtrialPressure => "right_atrial_pressure",
            StateVar::RightVentricleVolume => "right_ventricle_volume",
            StateVar::PulmonaryArteryPressure => "pulmonary_artery_pressure",
            StateVar::ArterialPulmonaryFlow => "arterial_pulmonary_flow",
            StateVar::PulmonaryPressure => "pulmonary_pressure",
            StateVar::VenousPulmonaryFlow => "venous_pulmonary_flow",
            StateVar::LeftAtrialPressure => "left_atrial_pressure",
            StateVar::LeftVentricleVolume => "left_ventricle_volume",
        }
    }

    /// Human readable title.
    pub const fn title(self) -> &'static str {
        match self {
            StateVar::AorticPressure => "Aortic Pressure",
            StateVar::ArterialSystemicFlow => "Arterial Systemic Flow",
            StateVar::SystemicPressure => "Systemic Pressure",
            StateVar::VenousSystemicFlow => "Venous Systemic Flow",
            StateVar::RightAtrialPressure => "Right Atrial Pressure",
            StateVar::RightVentricleVolume => "Right Ventricle Volume",
            StateVar::PulmonaryArteryPressure => "Pulmonary Artery Pressure",
            StateVar::ArterialPulmonaryFlow => "Arterial Pulmonary Flow",
            StateVar::PulmonaryPressure => "Pulmonary Pressure",
            StateVar::VenousPulmonaryFlow => "Venous Pulmonary Flow",
            StateVar::LeftAtrialPressure => "Left Atrial Pressure",
            StateVar::LeftVentricleVolume => "Left Ventricle Volume",
        }
    }

    pub const fn quantity(self) -> Quantity {
        match self {
            StateVar::ArterialSystemicFlow
            | StateVar::VenousSystemicFlow
            | StateVar::ArterialPulmonaryFlow
            | StateVar::VenousPulmonaryFlow => Quantity::Flow,
            StateVar::RightVentricleVolume | StateVar::LeftVentricleVolume => Quantity::Volume,
            _ => Quantity::Pressure,
        }
    }

    pub fn unit_label(self) -> &'static str {
        self.quantity().unit_label()
    }

    /// Look up a variable by key, ignoring case and accepting `-` for `_`.
    pub fn parse(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|v| v.key() == normalized)
    }
}

/// Initial conditions with one named field per state component.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InitialState {
    pub aortic_pressure: f64,
    pub arterial_systemic_flow: f64,
    pub systemic_pressure: f64,
    pub venous_systemic_flow: f64,
    pub right_atrial_pressure: f64,
    pub right_ventricle_volume: f64,
    pub pulmonary_artery_pressure: f64,
    pub arterial_pulmonary_flow: f64,
    pub pulmonary_pressure: f64,
    pub venous_pulmonary_flow: f64,
    pub left_atrial_pressure: f64,
    pub left_ventricle_volume: f64,
}

impl Default for InitialState {
    fn default() -> Self {
        Self::reference()
    }
}

impl InitialState {
    /// Start of a beat close to the periodic regime of the reference parameters.
    pub fn reference() -> Self {
        Self {
            aortic_pressure: 71.112,
            arterial_systemic_flow: 8.880,
            systemic_pressure: 70.516,
            venous_systemic_flow: 67.337,
            right_atrial_pressure: 3.328,
            right_ventricle_volume: 105.520,
            pulmonary_artery_pressure: 13.417,
            arterial_pulmonary_flow: 0.786,
            pulmonary_pressure: 13.393,
            venous_pulmonary_flow: 23.836,
            left_atrial_pressure: 11.294,
            left_ventricle_volume: 112.760,
        }
    }

    pub fn to_vector(&self) -> StateVector {
        StateVector::from([
            self.aortic_pressure,
            self.arterial_systemic_flow,
            self.systemic_pressure,
            self.venous_systemic_flow,
            self.right_atrial_pressure,
            self.right_ventricle_volume,
            self.pulmonary_artery_pressure,
            self.arterial_pulmonary_flow,
            self.pulmonary_pressure,
            self.venous_pulmonary_flow,
            self.left_atrial_pressure,
            self.left_ventricle_volume,
        ])
    }

    pub fn from_vector(x: &StateVector) -> Self {
        Self {
            aortic_pressure: x[idx::AORTIC_PRESSURE],
            arterial_systemic_flow: x[idx::ARTERIAL_SYSTEMIC_FLOW],
            systemic_pressure: x[idx::SYSTEMIC_PRESSURE],
            venous_systemic_flow: x[idx::VENOUS_SYSTEMIC_FLOW],
            right_atrial_pressure: x[idx::RIGHT_ATRIAL_PRESSURE],
            right_ventricle_volume: x[idx::RIGHT_VENTRICLE_VOLUME],
            pulmonary_artery_pressure: x[idx::PULMONARY_ARTERY_PRESSURE],
            arterial_pulmonary_flow: x[idx::ARTERIAL_PULMONARY_FLOW],
            pulmonary_pressure: x[idx::PULMONARY_PRESSURE],
            venous_pulmonary_flow: x[idx::VENOUS_PULMONARY_FLOW],
            left_atrial_pressure: x[idx::LEFT_ATRIAL_PRESSURE],
            left_ventricle_volume: x[idx::LEFT_VENTRICLE_VOLUME],
        }
    }

    /// All components finite. Signs are not checked.
    pub fn validate(&self) -> ModelResult<()> {
        let x = self.to_vector();
        for var in StateVar::ALL {
            let value = x[var.index()];
            ensure_finite(value, var.key()).map_err(|_| ModelError::InvalidInitialState {
                name: var.key(),
                value,
                reason: "must be finite",
            })?;
        }
        Ok(())
    }
}
