//! Project validation logic.

use cf_model::ModelError;

use crate::schema::{LATEST_VERSION, Project, SimulationDef, SolverDef};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Conflicting settings: {what}")]
    Conflict { what: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

impl From<ModelError> for ValidationError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::InvalidParameter {
                name,
                value,
                reason,
            } => ValidationError::InvalidValue {
                field: format!("parameters.{name}"),
                value: value.to_string(),
                reason: reason.to_string(),
            },
            ModelError::InvalidInitialState {
                name,
                value,
                reason,
            } => ValidationError::InvalidValue {
                field: format!("initial_state.{name}"),
                value: value.to_string(),
                reason: reason.to_string(),
            },
        }
    }
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version != LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    project.parameters.validate()?;
    project.initial_state.validate()?;
    validate_simulation(&project.simulation)?;
    validate_solver(&project.solver)?;
    Ok(())
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_simulation(sim: &SimulationDef) -> Result<(), ValidationError> {
    if !sim.t_start.is_finite() {
        return Err(invalid("simulation.t_start", sim.t_start, "must be finite"));
    }
    if !sim.t_end.is_finite() || sim.t_end <= sim.t_start {
        return Err(invalid(
            "simulation.t_end",
            sim.t_end,
            "must be finite and after t_start",
        ));
    }
    if !sim.graph_window_s.is_finite() || sim.graph_window_s <= 0.0 {
        return Err(invalid(
            "simulation.graph_window_s",
            sim.graph_window_s,
            "must be positive and finite",
        ));
    }

    if sim.samples.is_some() && sim.t_eval.is_some() {
        return Err(ValidationError::Conflict {
            what: "simulation.samples and simulation.t_eval are mutually exclusive".to_string(),
        });
    }
    if let Some(n) = sim.samples
        && n < 2
    {
        return Err(invalid(
            "simulation.samples",
            n,
            "need at least 2 samples to cover the span",
        ));
    }
    if let Some(times) = &sim.t_eval {
        if times.is_empty() {
            return Err(invalid("simulation.t_eval", "[]", "must not be empty"));
        }
        if let Err(e) = cf_sim::validate_eval_times(times, sim.t_start, sim.t_end) {
            return Err(invalid("simulation.t_eval", "[..]", &e.to_string()));
        }
    }
    Ok(())
}

fn validate_solver(solver: &SolverDef) -> Result<(), ValidationError> {
    if !solver.atol.is_finite() || solver.atol <= 0.0 {
        return Err(invalid("solver.atol", solver.atol, "must be positive and finite"));
    }
    if !solver.rtol.is_finite() || solver.rtol < 0.0 {
        return Err(invalid("solver.rtol", solver.rtol, "must be non-negative and finite"));
    }
    if solver.max_steps == 0 {
        return Err(invalid("solver.max_steps", solver.max_steps, "must be positive"));
    }
    if !solver.h_min.is_finite() || solver.h_min < 0.0 {
        return Err(invalid("solver.h_min", solver.h_min, "must be non-negative and finite"));
    }
    if let Some(h_max) = solver.h_max
        && (h_max.is_nan() || h_max <= 0.0 || h_max < solver.h_min)
    {
        return Err(invalid("solver.h_max", h_max, "must be positive and at least h_min"));
    }
    if let Some(h0) = solver.h0
        && (!h0.is_finite() || h0 <= 0.0)
    {
        return Err(invalid("solver.h0", h0, "must be positive and finite"));
    }
    Ok(())
}
