//! Built-in reference project.

use cf_model::{CirculationParams, InitialState};

use crate::schema::{LATEST_VERSION, Project, SimulationDef, SolverDef};

/// Three minutes of the reference adult circulation, every step recorded.
pub fn default_project() -> Project {
    Project {
        version: LATEST_VERSION,
        name: "Reference circulation".to_string(),
        parameters: CirculationParams::reference(),
        initial_state: InitialState::reference(),
        simulation: SimulationDef {
            t_start: 0.0,
            t_end: 180.0,
            samples: None,
            t_eval: None,
            graph_window_s: 1.8,
        },
        solver: SolverDef::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate_project;

    #[test]
    fn default_project_is_valid() {
        let p = default_project();
        validate_project(&p).unwrap();
        assert_eq!(p.simulation.graph_window(), (0.0, 1.8));
        assert_eq!(p.initial_state.aortic_pressure, 71.112);
        assert_eq!(p.solver.atol, 1e-12);
        assert_eq!(p.solver.rtol, 1e-10);
    }
}
