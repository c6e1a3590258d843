//! Project schema definitions.

use cf_core::Tolerances;
use cf_model::{CirculationParams, InitialState};
use serde::{Deserialize, Serialize};

/// The only project file version this build reads and writes.
pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    pub parameters: CirculationParams,
    pub initial_state: InitialState,
    pub simulation: SimulationDef,
    #[serde(default)]
    pub solver: SolverDef,
}

/// Time span and output sampling of a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationDef {
    #[serde(default)]
    pub t_start: f64,
    pub t_end: f64,
    /// Uniform grid including both ends. Exclusive with `t_eval`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<usize>,
    /// Explicit increasing output times. Exclusive with `samples`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t_eval: Option<Vec<f64>>,
    /// Span shown from `t_start` when plotting or exporting a window.
    #[serde(default = "default_graph_window_s")]
    pub graph_window_s: f64,
}

/// Output sampling resolved from a [`SimulationDef`].
#[derive(Debug, Clone, PartialEq)]
pub enum Sampling {
    /// Every accepted integrator step.
    Steps,
    Uniform(usize),
    Explicit(Vec<f64>),
}

impl SimulationDef {
    pub fn sampling(&self) -> Sampling {
        match (&self.samples, &self.t_eval) {
            (_, Some(times)) => Sampling::Explicit(times.clone()),
            (Some(n), None) => Sampling::Uniform(*n),
            (None, None) => Sampling::Steps,
        }
    }

    pub fn graph_window(&self) -> (f64, f64) {
        (self.t_start, self.t_start + self.graph_window_s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolverDef {
    #[serde(default = "default_atol")]
    pub atol: f64,
    #[serde(default = "default_rtol")]
    pub rtol: f64,
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    #[serde(default = "default_h_min")]
    pub h_min: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h0: Option<f64>,
}

impl Default for SolverDef {
    fn default() -> Self {
        Self {
            atol: default_atol(),
            rtol: default_rtol(),
            max_steps: default_max_steps(),
            h_min: default_h_min(),
            h_max: None,
            h0: None,
        }
    }
}

impl SolverDef {
    pub fn tolerances(&self) -> Tolerances {
        Tolerances::new(self.atol, self.rtol)
    }
}

fn default_graph_window_s() -> f64 {
    1.8
}

fn default_atol() -> f64 {
    1e-12
}

fn default_rtol() -> f64 {
    1e-10
}

fn default_max_steps() -> usize {
    5_000_000
}

fn default_h_min() -> f64 {
    1e-14
}
